//! Recursion state threaded through one stripping operation.

use std::path::Path;

use crate::EngineConfig;
use crate::FormatRegistry;
use crate::Result;
use crate::StripError;
use crate::UnsupportedMemberPolicy;
use crate::engine::scratch::ScratchSpace;
use crate::formats::detect::detect_mime;
use crate::formats::traits::HandlerSpec;
use crate::formats::traits::Stripper;

/// Registry, limits and nesting depth for one operation.
///
/// The top-level handler runs at depth 0. Each archive member is handled
/// one level deeper than its container. Contexts are cheap to copy and hold
/// no mutable state.
#[derive(Debug, Clone, Copy)]
pub struct StripContext<'a> {
    registry: &'a FormatRegistry,
    config: &'a EngineConfig,
    depth: usize,
}

impl<'a> StripContext<'a> {
    /// Creates a top-level context.
    #[must_use]
    pub const fn new(registry: &'a FormatRegistry, config: &'a EngineConfig) -> Self {
        Self {
            registry,
            config,
            depth: 0,
        }
    }

    /// Current nesting depth.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// The registry members are resolved against.
    #[must_use]
    pub const fn registry(&self) -> &'a FormatRegistry {
        self.registry
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &'a EngineConfig {
        self.config
    }

    /// Returns the context for members of the current container.
    ///
    /// # Errors
    ///
    /// Returns [`StripError::NestingTooDeep`] when the new depth exceeds
    /// `max_depth`.
    pub fn nested(&self) -> Result<Self> {
        let depth = self.depth + 1;
        if depth > self.config.max_depth {
            return Err(StripError::NestingTooDeep {
                depth,
                max: self.config.max_depth,
            });
        }
        Ok(Self { depth, ..*self })
    }

    /// Creates a scratch space under the configured root.
    pub fn scratch(&self) -> Result<ScratchSpace> {
        ScratchSpace::new(self.config.scratch_root.as_deref())
    }

    /// Detects the format of an extracted member and constructs its handler.
    ///
    /// Nested handlers never keep backups.
    pub fn open_member(&self, display_name: &str, file: &Path) -> Result<Box<dyn Stripper>> {
        let mime = detect_mime(file)?;
        tracing::debug!(member = display_name, %mime, depth = self.depth, "resolving member");
        let spec = HandlerSpec::new(file, mime, false).with_display_name(display_name);
        self.registry.open(spec)
    }

    /// Applies the unsupported-member policy to `result`.
    ///
    /// Returns `Ok(None)` when the member should pass through unmodified.
    pub fn tolerate_unsupported<T>(&self, member: &str, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err)
                if err.is_unsupported_member()
                    && self.config.unsupported_members == UnsupportedMemberPolicy::PassThrough =>
            {
                tracing::warn!(member, error = %err, "passing member through unmodified");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_nested_increments_depth() {
        let registry = FormatRegistry::builder().build();
        let config = EngineConfig::default().with_max_depth(2);
        let cx = StripContext::new(&registry, &config);
        assert_eq!(cx.depth(), 0);

        let one = cx.nested().unwrap();
        let two = one.nested().unwrap();
        assert_eq!(two.depth(), 2);

        match two.nested() {
            Err(StripError::NestingTooDeep { depth, max }) => {
                assert_eq!(depth, 3);
                assert_eq!(max, 2);
            }
            other => panic!("expected NestingTooDeep, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_depth_forbids_members() {
        let registry = FormatRegistry::builder().build();
        let config = EngineConfig::default().with_max_depth(0);
        let cx = StripContext::new(&registry, &config);
        assert!(cx.nested().is_err());
    }

    #[test]
    fn test_tolerate_unsupported_abort() {
        let registry = FormatRegistry::builder().build();
        let config = EngineConfig::default();
        let cx = StripContext::new(&registry, &config);

        let result: Result<()> = Err(StripError::FormatUnsupported {
            mime: "application/octet-stream".into(),
            path: PathBuf::from("blob"),
        });
        assert!(cx.tolerate_unsupported("blob", result).is_err());
    }

    #[test]
    fn test_tolerate_unsupported_pass_through() {
        let registry = FormatRegistry::builder().build();
        let config = EngineConfig::permissive();
        let cx = StripContext::new(&registry, &config);

        let result: Result<()> = Err(StripError::OperationUnsupported {
            format: "zip",
            operation: "remove_all",
        });
        assert!(cx.tolerate_unsupported("a.zip", result).unwrap().is_none());

        let fatal: Result<()> = Err(StripError::NestingTooDeep { depth: 3, max: 2 });
        assert!(cx.tolerate_unsupported("deep.tar", fatal).is_err());

        assert_eq!(cx.tolerate_unsupported("ok", Ok(7)).unwrap(), Some(7));
    }

    #[test]
    fn test_open_member_detects_text() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("notes");
        std::fs::write(&file, "plain words").unwrap();

        let registry = FormatRegistry::builder().with_builtin_leaves().build();
        let config = EngineConfig::default();
        let cx = StripContext::new(&registry, &config);

        let handler = cx.open_member("notes", &file).unwrap();
        assert_eq!(handler.format_name(), "text");
    }
}

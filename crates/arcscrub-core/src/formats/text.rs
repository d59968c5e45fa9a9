//! Plain text leaf handler.

use crate::MetadataReport;
use crate::Result;
use crate::engine::StripContext;
use crate::formats::traits::HandlerSpec;
use crate::formats::traits::Stripper;

/// Handler for plain text, which carries no embedded metadata.
///
/// `remove_all` leaves the file in place; with `backup` set it copies the
/// content to the `.cleaned` sibling so callers always find a sanitized
/// file where they expect one.
pub struct PlainTextStripper {
    spec: HandlerSpec,
}

impl PlainTextStripper {
    /// Creates a handler for the text file described by `spec`.
    #[must_use]
    pub const fn new(spec: HandlerSpec) -> Self {
        Self { spec }
    }
}

impl Stripper for PlainTextStripper {
    fn is_clean(&self, _cx: &StripContext<'_>) -> Result<bool> {
        Ok(true)
    }

    fn get_metadata(&self, _cx: &StripContext<'_>) -> Result<MetadataReport> {
        Ok(MetadataReport::new())
    }

    fn remove_all(&self, _cx: &StripContext<'_>) -> Result<()> {
        let config = self.spec.stripper_config();
        if config.backup {
            std::fs::copy(&config.path, config.cleaned_path())?;
        }
        Ok(())
    }

    fn format_name(&self) -> &str {
        "text"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::EngineConfig;
    use crate::FormatRegistry;
    use tempfile::TempDir;

    #[test]
    fn test_text_is_always_clean() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        std::fs::write(&path, "nothing to hide").unwrap();

        let registry = FormatRegistry::builder().build();
        let config = EngineConfig::default();
        let cx = StripContext::new(&registry, &config);
        let handler = PlainTextStripper::new(HandlerSpec::new(&path, "text/plain", false));

        assert!(handler.is_clean(&cx).unwrap());
        assert!(handler.get_metadata(&cx).unwrap().is_empty());
        handler.remove_all(&cx).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "nothing to hide");
        assert!(!temp.path().join("notes.txt.cleaned").exists());
    }

    #[test]
    fn test_backup_copies_to_cleaned() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        std::fs::write(&path, "copy me").unwrap();

        let registry = FormatRegistry::builder().build();
        let config = EngineConfig::default();
        let cx = StripContext::new(&registry, &config);
        PlainTextStripper::new(HandlerSpec::new(&path, "text/plain", true))
            .remove_all(&cx)
            .unwrap();

        let cleaned = temp.path().join("notes.txt.cleaned");
        assert_eq!(std::fs::read_to_string(cleaned).unwrap(), "copy me");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "copy me");
    }
}

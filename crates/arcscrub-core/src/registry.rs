//! MIME type to handler resolution.
//!
//! Container formats form a closed set ([`ContainerKind`]) that is always
//! available. Leaf formats are registered into an open map once, at startup,
//! either directly or through a [`LeafCapability`] whose probe decides
//! whether its backing support is present. After [`RegistryBuilder::build`]
//! the registry is immutable.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::OnceLock;

use crate::Result;
use crate::StripError;
use crate::formats::CompressionVariant;
use crate::formats::PlainTextStripper;
use crate::formats::TarStripper;
use crate::formats::ZipInspector;
use crate::formats::traits::HandlerSpec;
use crate::formats::traits::Stripper;

/// Builds a handler from its spec.
pub type Constructor = Arc<dyn Fn(HandlerSpec) -> Box<dyn Stripper> + Send + Sync>;

/// Container formats handled by the archive engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Uncompressed tar.
    Tar,
    /// Gzip-compressed tar.
    TarGz,
    /// Bzip2-compressed tar.
    TarBz2,
    /// Zip (inspection only).
    Zip,
}

impl ContainerKind {
    /// Every container kind.
    pub const ALL: [Self; 4] = [Self::Tar, Self::TarGz, Self::TarBz2, Self::Zip];

    /// Maps a MIME type to a container kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcscrub_core::ContainerKind;
    ///
    /// assert_eq!(ContainerKind::from_mime("application/gzip"), Some(ContainerKind::TarGz));
    /// assert_eq!(ContainerKind::from_mime("text/plain"), None);
    /// ```
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = normalize_mime(mime);
        Self::ALL
            .into_iter()
            .find(|kind| kind.mime_types().contains(&mime.as_str()))
    }

    /// MIME types resolved to this kind.
    #[must_use]
    pub const fn mime_types(self) -> &'static [&'static str] {
        match self {
            Self::Tar => &["application/x-tar"],
            Self::TarGz => &["application/gzip", "application/x-gzip"],
            Self::TarBz2 => &["application/x-bzip2"],
            Self::Zip => &["application/zip"],
        }
    }

    /// Constructs the handler for this kind.
    #[must_use]
    pub fn construct(self, spec: HandlerSpec) -> Box<dyn Stripper> {
        match self {
            Self::Tar => Box::new(TarStripper::new(spec, CompressionVariant::None)),
            Self::TarGz => Box::new(TarStripper::new(spec, CompressionVariant::Gzip)),
            Self::TarBz2 => Box::new(TarStripper::new(spec, CompressionVariant::Bzip2)),
            Self::Zip => Box::new(ZipInspector::new(spec)),
        }
    }
}

/// A leaf handler whose availability is decided once at startup.
pub trait LeafCapability {
    /// Human-readable capability name used in logs.
    fn name(&self) -> &str;

    /// MIME types the handler covers.
    fn mime_types(&self) -> &[&str];

    /// Checks that the backing support is present.
    ///
    /// # Errors
    ///
    /// Returns the reason the capability cannot be used.
    fn probe(&self) -> std::result::Result<(), String>;

    /// Returns the constructor registered when the probe succeeds.
    fn constructor(&self) -> Constructor;
}

/// A successful resolution.
pub enum Resolved<'r> {
    /// Built-in container handler.
    Container(ContainerKind),
    /// Registered leaf handler.
    Leaf(&'r Constructor),
}

impl Resolved<'_> {
    /// Constructs the resolved handler.
    #[must_use]
    pub fn construct(&self, spec: HandlerSpec) -> Box<dyn Stripper> {
        match self {
            Self::Container(kind) => kind.construct(spec),
            Self::Leaf(constructor) => constructor(spec),
        }
    }
}

/// Why a MIME type did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Nothing is registered for the type.
    NotFound,
    /// A capability covering the type failed its probe.
    Unavailable {
        /// Reason reported by the probe.
        reason: String,
    },
}

impl ResolveError {
    /// Converts into a [`StripError`] naming the file that needed a handler.
    #[must_use]
    pub fn into_strip_error(self, mime: &str, path: &Path) -> StripError {
        match self {
            Self::NotFound => StripError::FormatUnsupported {
                mime: mime.to_string(),
                path: path.to_path_buf(),
            },
            Self::Unavailable { reason } => StripError::CapabilityUnavailable {
                mime: mime.to_string(),
                reason,
            },
        }
    }
}

/// Immutable MIME type to handler map.
pub struct FormatRegistry {
    leaves: BTreeMap<String, Constructor>,
    unavailable: BTreeMap<String, String>,
}

impl FormatRegistry {
    /// Starts a registry holding only the container kinds.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Returns the process-wide registry with every built-in handler.
    ///
    /// Built on first use and never modified afterwards.
    pub fn builtin() -> &'static Self {
        static BUILTIN: OnceLock<FormatRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| Self::builder().with_builtin_leaves().build())
    }

    /// Resolves `mime` to a handler.
    ///
    /// Containers take precedence over leaf registrations for the same type.
    pub fn resolve(&self, mime: &str) -> std::result::Result<Resolved<'_>, ResolveError> {
        if let Some(kind) = ContainerKind::from_mime(mime) {
            return Ok(Resolved::Container(kind));
        }
        let mime = normalize_mime(mime);
        if let Some(constructor) = self.leaves.get(&mime) {
            return Ok(Resolved::Leaf(constructor));
        }
        match self.unavailable.get(&mime) {
            Some(reason) => Err(ResolveError::Unavailable {
                reason: reason.clone(),
            }),
            None => Err(ResolveError::NotFound),
        }
    }

    /// Resolves `spec.mime` and constructs the handler.
    pub fn open(&self, spec: HandlerSpec) -> Result<Box<dyn Stripper>> {
        match self.resolve(&spec.mime) {
            Ok(resolved) => Ok(resolved.construct(spec)),
            Err(err) => Err(err.into_strip_error(&spec.mime, &spec.path)),
        }
    }

    /// Returns every MIME type that resolves, sorted.
    #[must_use]
    pub fn supported_mime_types(&self) -> Vec<String> {
        let mut types: Vec<String> = ContainerKind::ALL
            .into_iter()
            .flat_map(|kind| kind.mime_types().iter().map(ToString::to_string))
            .chain(self.leaves.keys().cloned())
            .collect();
        types.sort();
        types.dedup();
        types
    }

    /// Iterates MIME types whose capability probe failed, with the reason.
    pub fn unavailable(&self) -> impl Iterator<Item = (&str, &str)> {
        self.unavailable
            .iter()
            .map(|(mime, reason)| (mime.as_str(), reason.as_str()))
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("leaves", &self.leaves.keys().collect::<Vec<_>>())
            .field("unavailable", &self.unavailable)
            .finish()
    }
}

/// Collects leaf registrations before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    leaves: BTreeMap<String, Constructor>,
    unavailable: BTreeMap<String, String>,
}

impl RegistryBuilder {
    /// Registers a leaf handler for `mime`.
    #[must_use]
    pub fn register<F>(mut self, mime: &str, constructor: F) -> Self
    where
        F: Fn(HandlerSpec) -> Box<dyn Stripper> + Send + Sync + 'static,
    {
        let mime = normalize_mime(mime);
        self.unavailable.remove(&mime);
        self.leaves.insert(mime, Arc::new(constructor));
        self
    }

    /// Registers the handlers shipped with this crate.
    #[must_use]
    pub fn with_builtin_leaves(self) -> Self {
        self.register("text/plain", |spec| Box::new(PlainTextStripper::new(spec)))
    }

    /// Probes `capability` once and registers it if the probe succeeds.
    ///
    /// A failed probe marks the capability's MIME types unavailable so that
    /// resolving them reports why instead of just "unsupported".
    #[must_use]
    pub fn probe(mut self, capability: &dyn LeafCapability) -> Self {
        match capability.probe() {
            Ok(()) => {
                tracing::debug!(capability = capability.name(), "capability available");
                let constructor = capability.constructor();
                for mime in capability.mime_types() {
                    let mime = normalize_mime(mime);
                    self.unavailable.remove(&mime);
                    self.leaves.insert(mime, Arc::clone(&constructor));
                }
            }
            Err(reason) => {
                tracing::info!(
                    capability = capability.name(),
                    %reason,
                    "capability unavailable, formats disabled"
                );
                for mime in capability.mime_types() {
                    let mime = normalize_mime(mime);
                    if !self.leaves.contains_key(&mime) {
                        self.unavailable.insert(mime, reason.clone());
                    }
                }
            }
        }
        self
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> FormatRegistry {
        FormatRegistry {
            leaves: self.leaves,
            unavailable: self.unavailable,
        }
    }
}

/// Lowercases a MIME type and drops any parameters.
fn normalize_mime(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

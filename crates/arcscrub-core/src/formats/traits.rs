//! The handler contract shared by leaf and container formats.

use std::path::PathBuf;

use crate::MetadataReport;
use crate::Result;
use crate::StripperConfig;
use crate::engine::StripContext;

/// Everything a handler is constructed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSpec {
    /// Name shown to the user (the original file or member name).
    pub display_name: String,
    /// File the handler reads and, for `remove_all`, rewrites.
    pub path: PathBuf,
    /// Detected MIME type the handler was resolved from.
    pub mime: String,
    /// Field-editor hook. Reserved; no handler reads it yet.
    pub editor: Option<String>,
    /// Keep the original and write the sanitized copy next to it.
    pub backup: bool,
}

impl HandlerSpec {
    /// Creates a spec for `path` with no editor hook.
    pub fn new(path: impl Into<PathBuf>, mime: impl Into<String>, backup: bool) -> Self {
        let path = path.into();
        Self {
            display_name: path.display().to_string(),
            path,
            mime: mime.into(),
            editor: None,
            backup,
        }
    }

    /// Overrides the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Returns the per-file configuration this spec describes.
    #[must_use]
    pub fn stripper_config(&self) -> StripperConfig {
        StripperConfig::new(&self.path, self.backup)
    }
}

/// A metadata handler for one file format.
///
/// Every handler, leaf or container, exposes the same three operations.
/// `cx` carries the registry and nesting depth so container handlers can
/// dispatch their members; leaf handlers may ignore it.
pub trait Stripper {
    /// Returns `true` iff the file carries no extraneous metadata.
    ///
    /// Must not modify the file. Any scratch state is reclaimed before
    /// returning.
    fn is_clean(&self, cx: &StripContext<'_>) -> Result<bool>;

    /// Reports the metadata embedded in the file without modifying it.
    fn get_metadata(&self, cx: &StripContext<'_>) -> Result<MetadataReport>;

    /// Writes a sanitized file, honouring the backup flag.
    fn remove_all(&self, cx: &StripContext<'_>) -> Result<()>;

    /// Returns a short format label.
    fn format_name(&self) -> &str;
}

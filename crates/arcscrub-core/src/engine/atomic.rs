//! Atomic publication of sanitized output.
//!
//! The sanitized container is built in full inside an anonymous temporary
//! file next to the source. Only after every member has been written does a
//! single rename publish it, either over the original path or at the
//! `.cleaned` sibling path. Dropping a [`PendingOutput`] without persisting
//! it deletes the temporary file, so a failed operation never leaves partial
//! output behind and never touches the original.

use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::Result;
use crate::StripperConfig;

/// Sanitized output under construction.
#[derive(Debug)]
pub struct PendingOutput {
    file: NamedTempFile,
}

impl PendingOutput {
    /// Creates a temporary output file in the same directory as `source`, so
    /// the final rename stays on one filesystem.
    pub fn beside(source: &Path) -> Result<Self> {
        let dir = source
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file = tempfile::Builder::new()
            .prefix(".arcscrub-out-")
            .tempfile_in(dir)?;
        Ok(Self { file })
    }

    /// Returns the temporary file handle.
    #[must_use]
    pub fn as_file(&self) -> &File {
        self.file.as_file()
    }

    /// Returns the temporary file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Publishes the output according to `config` and returns the path now
    /// holding the sanitized bytes.
    ///
    /// With `backup` unset the output atomically replaces `config.path`.
    /// With `backup` set the original is left untouched and the output is
    /// renamed to `config.path + ".cleaned"`.
    pub fn persist(self, config: &StripperConfig) -> Result<PathBuf> {
        self.file.as_file().sync_all()?;
        let permissions = std::fs::metadata(&config.path)?.permissions();
        std::fs::set_permissions(self.file.path(), permissions)?;

        let target = if config.backup {
            config.cleaned_path()
        } else {
            config.path.clone()
        };
        self.file.persist(&target).map_err(|err| err.error)?;
        Ok(target)
    }
}

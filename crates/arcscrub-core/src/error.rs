//! Error types for metadata stripping operations.

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `StripError`.
pub type Result<T> = std::result::Result<T, StripError>;

/// Errors that can occur while inspecting or sanitizing a file.
///
/// Every error is terminal for the operation that raised it. When an error
/// escapes `remove_all`, the file at the original path still holds its
/// pre-operation content.
#[derive(Error, Debug)]
pub enum StripError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No handler is registered for the detected format.
    #[error("no handler for format {mime}: {path}")]
    FormatUnsupported {
        /// Detected MIME type.
        mime: String,
        /// File (or archive member) that could not be handled.
        path: PathBuf,
    },

    /// A handler exists for the format but its backing capability failed to
    /// probe at startup.
    #[error("handler for {mime} is unavailable: {reason}")]
    CapabilityUnavailable {
        /// MIME type whose handler is unavailable.
        mime: String,
        /// Reason reported by the capability probe.
        reason: String,
    },

    /// The source container is corrupt or truncated.
    #[error("cannot read container {path}: {reason}")]
    ExtractionFailure {
        /// Container being read.
        path: PathBuf,
        /// Underlying failure.
        reason: String,
    },

    /// Scratch space could not be removed after the operation.
    #[error("failed to reclaim scratch space {path}: {source}")]
    ScratchReclaimFailure {
        /// Scratch location that could not be removed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Writing the sanitized output container failed.
    #[error("failed to rebuild container {path}: {reason}")]
    RebuildFailure {
        /// Container being rebuilt.
        path: PathBuf,
        /// Underlying failure.
        reason: String,
    },

    /// Containers are nested deeper than the configured limit.
    #[error("containers nested too deep: depth {depth} exceeds limit {max}")]
    NestingTooDeep {
        /// Depth that was reached.
        depth: usize,
        /// Configured maximum depth.
        max: usize,
    },

    /// The handler does not implement the requested operation.
    #[error("{format} handler does not support {operation}")]
    OperationUnsupported {
        /// Format label of the handler.
        format: &'static str,
        /// Name of the operation.
        operation: &'static str,
    },

    /// An archive member path is absolute or escapes the scratch space.
    #[error("unsafe member path in archive: {path}")]
    UnsafeMemberPath {
        /// The offending member path.
        path: PathBuf,
    },
}

impl StripError {
    /// Returns `true` if this error means a member's format cannot be
    /// sanitized by any available handler.
    ///
    /// Container handlers consult the unsupported-member policy for exactly
    /// these errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcscrub_core::StripError;
    ///
    /// let err = StripError::OperationUnsupported {
    ///     format: "zip",
    ///     operation: "remove_all",
    /// };
    /// assert!(err.is_unsupported_member());
    ///
    /// let err = StripError::NestingTooDeep { depth: 17, max: 16 };
    /// assert!(!err.is_unsupported_member());
    /// ```
    #[must_use]
    pub const fn is_unsupported_member(&self) -> bool {
        matches!(
            self,
            Self::FormatUnsupported { .. }
                | Self::CapabilityUnavailable { .. }
                | Self::OperationUnsupported { .. }
        )
    }

    /// Returns the file or member path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::FormatUnsupported { path, .. }
            | Self::ExtractionFailure { path, .. }
            | Self::ScratchReclaimFailure { path, .. }
            | Self::RebuildFailure { path, .. }
            | Self::UnsafeMemberPath { path } => Some(path),
            _ => None,
        }
    }

    pub(crate) fn extraction(path: &Path, reason: impl std::fmt::Display) -> Self {
        Self::ExtractionFailure {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn rebuild(path: &Path, reason: impl std::fmt::Display) -> Self {
        Self::RebuildFailure {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StripError::FormatUnsupported {
            mime: "application/octet-stream".into(),
            path: PathBuf::from("blob.bin"),
        };
        let display = err.to_string();
        assert!(display.contains("application/octet-stream"));
        assert!(display.contains("blob.bin"));
    }

    #[test]
    fn test_nesting_too_deep_display() {
        let err = StripError::NestingTooDeep { depth: 5, max: 4 };
        assert_eq!(
            err.to_string(),
            "containers nested too deep: depth 5 exceeds limit 4"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: StripError = io_err.into();
        assert!(matches!(err, StripError::Io(_)));
        assert!(err.path().is_none());
    }

    #[test]
    fn test_is_unsupported_member() {
        let err = StripError::FormatUnsupported {
            mime: "image/webp".into(),
            path: PathBuf::from("a.webp"),
        };
        assert!(err.is_unsupported_member());

        let err = StripError::CapabilityUnavailable {
            mime: "application/pdf".into(),
            reason: "renderer missing".into(),
        };
        assert!(err.is_unsupported_member());

        let err = StripError::extraction(Path::new("a.tar"), "truncated");
        assert!(!err.is_unsupported_member());

        let err = StripError::UnsafeMemberPath {
            path: PathBuf::from("../etc/passwd"),
        };
        assert!(!err.is_unsupported_member());
    }

    #[test]
    fn test_path_accessor() {
        let err = StripError::rebuild(Path::new("out.tar"), "disk full");
        assert_eq!(err.path(), Some(Path::new("out.tar")));
        assert!(err.to_string().contains("disk full"));

        let err = StripError::OperationUnsupported {
            format: "zip",
            operation: "remove_all",
        };
        assert_eq!(err.path(), None);
        assert_eq!(err.to_string(), "zip handler does not support remove_all");
    }

    #[test]
    fn test_scratch_reclaim_source_chain() {
        use std::error::Error;

        let err = StripError::ScratchReclaimFailure {
            path: PathBuf::from("/tmp/scratch"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/tmp/scratch"));
    }
}

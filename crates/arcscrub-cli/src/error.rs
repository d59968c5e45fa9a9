//! Error conversion utilities for CLI.
//!
//! Turns the core's typed `StripError` into `anyhow` errors that name the
//! file being processed and, where one exists, a flag or action that helps.

use anyhow::anyhow;
use arcscrub_core::StripError;
use std::path::Path;

/// Converts `StripError` to a user-facing error with context
pub fn convert_strip_error(err: StripError, file: &Path) -> anyhow::Error {
    match err {
        StripError::FormatUnsupported { mime, path } => {
            anyhow!(
                "Cannot clean '{}': no handler for {mime} ({})\n\
                 HINT: Use --pass-through to copy unsupported archive members unchanged, \
                 or run 'arcscrub formats' to list supported formats.",
                file.display(),
                path.display()
            )
        }
        StripError::CapabilityUnavailable { mime, reason } => {
            anyhow!(
                "Cannot clean '{}': the {mime} handler is unavailable: {reason}\n\
                 HINT: Run 'arcscrub formats' to see which handlers are available.",
                file.display()
            )
        }
        StripError::OperationUnsupported { format, operation } => {
            anyhow!(
                "Cannot {operation} '{}': {format} files can only be inspected\n\
                 HINT: Use --pass-through to keep {format} members unchanged inside other archives.",
                file.display()
            )
        }
        StripError::NestingTooDeep { depth, max } => {
            anyhow!(
                "Archives in '{}' are nested too deep (depth {depth}, limit {max})\n\
                 HINT: Use --max-depth to allow deeper nesting.",
                file.display()
            )
        }
        StripError::ExtractionFailure { path, reason } => {
            anyhow!(
                "Cannot read '{}': {reason} ({})\n\
                 HINT: The archive may be corrupted or truncated.",
                file.display(),
                path.display()
            )
        }
        StripError::UnsafeMemberPath { path } => {
            anyhow!(
                "Security violation: '{}' contains unsafe member path '{}'\n\
                 HINT: This archive may be malicious. It was left unchanged.",
                file.display(),
                path.display()
            )
        }
        StripError::ScratchReclaimFailure { path, source } => {
            anyhow!(
                "Failed to remove scratch space '{}' after processing '{}': {source}\n\
                 HINT: Delete the directory manually, or choose another location with --scratch-dir.",
                path.display(),
                file.display()
            )
        }
        StripError::RebuildFailure { path, reason } => {
            anyhow!(
                "Failed to write cleaned copy of '{}': {reason} ({})\n\
                 HINT: Check available disk space and write permissions. The original is unchanged.",
                file.display(),
                path.display()
            )
        }
        StripError::Io(io_err) => {
            anyhow!("I/O error while processing '{}': {io_err}", file.display())
        }
    }
}

/// Adds file context to a core result
pub fn add_file_context<T>(result: arcscrub_core::Result<T>, file: &Path) -> anyhow::Result<T> {
    result.map_err(|e| convert_strip_error(e, file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_format_unsupported() {
        let err = StripError::FormatUnsupported {
            mime: "image/png".into(),
            path: PathBuf::from("photo.png"),
        };
        let msg = format!("{:?}", convert_strip_error(err, Path::new("bundle.tar")));
        assert!(msg.contains("bundle.tar"));
        assert!(msg.contains("image/png"));
        assert!(msg.contains("--pass-through"));
    }

    #[test]
    fn test_convert_nesting_too_deep() {
        let err = StripError::NestingTooDeep { depth: 3, max: 2 };
        let msg = format!("{:?}", convert_strip_error(err, Path::new("deep.tar")));
        assert!(msg.contains("depth 3"));
        assert!(msg.contains("limit 2"));
        assert!(msg.contains("--max-depth"));
    }

    #[test]
    fn test_convert_operation_unsupported() {
        let err = StripError::OperationUnsupported {
            format: "zip",
            operation: "remove_all",
        };
        let msg = format!("{:?}", convert_strip_error(err, Path::new("a.zip")));
        assert!(msg.contains("only be inspected"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_unsafe_member_path() {
        let err = StripError::UnsafeMemberPath {
            path: PathBuf::from("../../etc/passwd"),
        };
        let msg = format!("{:?}", convert_strip_error(err, Path::new("evil.tar")));
        assert!(msg.contains("Security violation"));
        assert!(msg.contains("../../etc/passwd"));
    }

    #[test]
    fn test_convert_io_error() {
        let err = StripError::Io(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let msg = format!("{:?}", convert_strip_error(err, Path::new("gone.tar")));
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone.tar"));
    }

    #[test]
    fn test_add_file_context_passes_ok_through() {
        let result: arcscrub_core::Result<u8> = Ok(7);
        assert_eq!(add_file_context(result, Path::new("x")).ok(), Some(7));
    }
}

//! Content-based MIME type detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::Result;

/// MIME type reported for content with no recognizable signature.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// MIME type reported for signature-less UTF-8 text.
pub const TEXT_PLAIN: &str = "text/plain";

/// Number of leading bytes inspected by the text fallback.
const SNIFF_LEN: u64 = 8 * 1024;

/// Detects the MIME type of a file from its content.
///
/// Magic-byte signatures are tried first. Content without a known signature
/// is reported as `text/plain` when its leading bytes are UTF-8 without NUL
/// bytes (an empty file counts as text), and as
/// `application/octet-stream` otherwise.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
///
/// # Examples
///
/// ```no_run
/// use arcscrub_core::detect_mime;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mime = detect_mime("archive.tar.gz")?;
/// assert_eq!(mime, "application/gzip");
/// # Ok(())
/// # }
/// ```
pub fn detect_mime<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    if let Some(kind) = infer::get_from_path(path)? {
        return Ok(kind.mime_type().to_string());
    }

    let mut head = Vec::new();
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut head)?;
    Ok(sniff_text(&head).to_string())
}

fn sniff_text(head: &[u8]) -> &'static str {
    if head.contains(&0) {
        return OCTET_STREAM;
    }
    match std::str::from_utf8(head) {
        Ok(_) => TEXT_PLAIN,
        // A multi-byte sequence cut off by the sniff window is still text.
        Err(err) if err.error_len().is_none() => TEXT_PLAIN,
        Err(_) => OCTET_STREAM,
    }
}

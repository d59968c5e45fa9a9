//! High-level public API for inspecting and sanitizing files.
//!
//! These functions detect the file's format from its content, resolve a
//! handler from [`FormatRegistry::builtin`] and run it at nesting depth 0.
//! Callers with a custom registry use [`open_stripper`] and a
//! [`StripContext`] directly.

use std::path::Path;

use crate::CleanOutcome;
use crate::EngineConfig;
use crate::FormatRegistry;
use crate::MetadataReport;
use crate::Result;
use crate::engine::StripContext;
use crate::formats::detect::detect_mime;
use crate::formats::traits::HandlerSpec;
use crate::formats::traits::Stripper;

/// Constructs the handler `registry` resolves for `mime`.
///
/// # Errors
///
/// Returns [`StripError::FormatUnsupported`](crate::StripError::FormatUnsupported)
/// when nothing is registered for `mime`, and
/// [`StripError::CapabilityUnavailable`](crate::StripError::CapabilityUnavailable)
/// when the covering capability failed its probe.
///
/// # Examples
///
/// ```no_run
/// use arcscrub_core::EngineConfig;
/// use arcscrub_core::FormatRegistry;
/// use arcscrub_core::StripContext;
/// use arcscrub_core::detect_mime;
/// use arcscrub_core::open_stripper;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = FormatRegistry::builtin();
/// let mime = detect_mime("photos.tar")?;
/// let stripper = open_stripper(registry, "photos.tar", &mime, true)?;
///
/// let config = EngineConfig::default();
/// stripper.remove_all(&StripContext::new(registry, &config))?;
/// # Ok(())
/// # }
/// ```
pub fn open_stripper<P: AsRef<Path>>(
    registry: &FormatRegistry,
    path: P,
    mime: &str,
    backup: bool,
) -> Result<Box<dyn Stripper>> {
    registry.open(HandlerSpec::new(path.as_ref(), mime, backup))
}

fn open_builtin(path: &Path, backup: bool) -> Result<Box<dyn Stripper>> {
    let mime = detect_mime(path)?;
    tracing::debug!(path = %path.display(), %mime, "detected format");
    open_stripper(FormatRegistry::builtin(), path, &mime, backup)
}

/// Returns `true` if the file carries no metadata the handlers can remove.
///
/// # Errors
///
/// Returns an error if the format is unsupported, the file cannot be read,
/// or a nested member fails under [`EngineConfig::unsupported_members`].
///
/// # Examples
///
/// ```no_run
/// use arcscrub_core::EngineConfig;
/// use arcscrub_core::is_clean;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// if !is_clean("release.tar.gz", &EngineConfig::default())? {
///     println!("release.tar.gz leaks build-host metadata");
/// }
/// # Ok(())
/// # }
/// ```
pub fn is_clean<P: AsRef<Path>>(path: P, config: &EngineConfig) -> Result<bool> {
    let handler = open_builtin(path.as_ref(), false)?;
    handler.is_clean(&StripContext::new(FormatRegistry::builtin(), config))
}

/// Reports the metadata a file carries.
///
/// # Errors
///
/// Returns an error if the format is unsupported or the file cannot be read.
pub fn get_metadata<P: AsRef<Path>>(path: P, config: &EngineConfig) -> Result<MetadataReport> {
    let handler = open_builtin(path.as_ref(), false)?;
    handler.get_metadata(&StripContext::new(FormatRegistry::builtin(), config))
}

/// Sanitizes a file.
///
/// With `backup` unset the sanitized content replaces the file at `path`.
/// With `backup` set the original stays untouched and the sanitized content
/// is written to `path + ".cleaned"`. Either way the file at `path` is never
/// left partially written.
///
/// # Errors
///
/// Returns an error if the format is unsupported, the file cannot be read,
/// a member cannot be handled, or the output cannot be written.
///
/// # Examples
///
/// ```no_run
/// use arcscrub_core::EngineConfig;
/// use arcscrub_core::remove_all;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let outcome = remove_all("bundle.tar", true, &EngineConfig::default())?;
/// println!("sanitized copy at {}", outcome.cleaned.display());
/// # Ok(())
/// # }
/// ```
pub fn remove_all<P: AsRef<Path>>(
    path: P,
    backup: bool,
    config: &EngineConfig,
) -> Result<CleanOutcome> {
    let path = path.as_ref();
    let handler = open_builtin(path, backup)?;
    handler.remove_all(&StripContext::new(FormatRegistry::builtin(), config))?;

    let cleaned = if backup {
        crate::config::cleaned_path(path)
    } else {
        path.to_path_buf()
    };
    tracing::info!(
        path = %path.display(),
        format = handler.format_name(),
        cleaned = %cleaned.display(),
        "file sanitized"
    );
    Ok(CleanOutcome {
        source: path.to_path_buf(),
        cleaned,
        backup,
    })
}

//! Subcommand implementations.

pub mod check;
pub mod clean;
pub mod completion;
pub mod formats;
pub mod show;

use crate::error::add_file_context;
use arcscrub_core::FormatRegistry;
use arcscrub_core::Stripper;
use arcscrub_core::detect_mime;
use arcscrub_core::open_stripper;
use std::path::Path;

/// Detects the file's format and opens a read-only handler for it.
fn open_for_inspection(path: &Path) -> anyhow::Result<Box<dyn Stripper>> {
    let mime = add_file_context(detect_mime(path), path)?;
    add_file_context(
        open_stripper(FormatRegistry::builtin(), path, &mime, false),
        path,
    )
}

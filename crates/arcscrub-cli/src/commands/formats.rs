//! Formats command implementation

use crate::output::FormatListing;
use crate::output::OutputFormatter;
use anyhow::Result;
use arcscrub_core::FormatRegistry;

pub fn execute(formatter: &dyn OutputFormatter) -> Result<()> {
    let registry = FormatRegistry::builtin();
    let listing = FormatListing {
        supported: registry.supported_mime_types(),
        unavailable: registry
            .unavailable()
            .map(|(mime, reason)| (mime.to_string(), reason.to_string()))
            .collect(),
    };
    formatter.format_formats(&listing)
}

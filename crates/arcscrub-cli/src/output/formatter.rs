//! Output formatter trait for CLI results.

use anyhow::Result;
use arcscrub_core::CleanOutcome;
use arcscrub_core::MetadataReport;
use serde::Serialize;
use std::path::PathBuf;

/// Verdict for one checked file.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub path: PathBuf,
    pub format: String,
    pub clean: bool,
}

/// Metadata found in one file.
#[derive(Debug, Clone)]
pub struct ShowResult {
    pub path: PathBuf,
    pub format: String,
    pub report: MetadataReport,
}

/// Registry contents listed by `formats`.
#[derive(Debug, Clone, Default)]
pub struct FormatListing {
    pub supported: Vec<String>,
    pub unavailable: Vec<(String, String)>,
}

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format `check` verdicts
    fn format_check_results(&self, results: &[CheckResult]) -> Result<()>;

    /// Format `show` reports
    fn format_show_results(&self, results: &[ShowResult]) -> Result<()>;

    /// Format `clean` outcomes
    fn format_clean_results(&self, outcomes: &[CleanOutcome]) -> Result<()>;

    /// Format the supported format listing
    fn format_formats(&self, listing: &FormatListing) -> Result<()>;

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data,
        }
    }
}

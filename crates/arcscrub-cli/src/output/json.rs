//! JSON output formatter for machine-readable results.

use super::formatter::CheckResult;
use super::formatter::FormatListing;
use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::ShowResult;
use anyhow::Result;
use arcscrub_core::CleanOutcome;
use arcscrub_core::MetadataRecord;
use arcscrub_core::MetadataReport;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum RecordOutput {
    Tar {
        mtime: u64,
        uid: u64,
        gid: u64,
        uname: String,
        gname: String,
    },
    Zip {
        comment: String,
        modified: String,
        create_system: u8,
        create_version: u8,
    },
    Field {
        value: String,
    },
}

impl From<&MetadataRecord> for RecordOutput {
    fn from(record: &MetadataRecord) -> Self {
        match record {
            MetadataRecord::Tar(meta) => Self::Tar {
                mtime: meta.mtime,
                uid: meta.uid,
                gid: meta.gid,
                uname: meta.uname.clone(),
                gname: meta.gname.clone(),
            },
            MetadataRecord::Zip(meta) => Self::Zip {
                comment: meta.comment.clone(),
                modified: meta.modified.clone(),
                create_system: meta.create_system,
                create_version: meta.create_version,
            },
            MetadataRecord::Field(value) => Self::Field {
                value: value.clone(),
            },
        }
    }
}

fn report_output(report: &MetadataReport) -> BTreeMap<String, RecordOutput> {
    report
        .iter()
        .map(|(key, record)| (key.clone(), RecordOutput::from(record)))
        .collect()
}

impl OutputFormatter for JsonFormatter {
    fn format_check_results(&self, results: &[CheckResult]) -> Result<()> {
        #[derive(Serialize)]
        struct CheckOutput {
            path: String,
            format: String,
            clean: bool,
        }

        let data: Vec<CheckOutput> = results
            .iter()
            .map(|r| CheckOutput {
                path: r.path.display().to_string(),
                format: r.format.clone(),
                clean: r.clean,
            })
            .collect();

        Self::output(&JsonOutput::success("check", data))
    }

    fn format_show_results(&self, results: &[ShowResult]) -> Result<()> {
        #[derive(Serialize)]
        struct ShowOutput {
            path: String,
            format: String,
            metadata: BTreeMap<String, RecordOutput>,
        }

        let data: Vec<ShowOutput> = results
            .iter()
            .map(|r| ShowOutput {
                path: r.path.display().to_string(),
                format: r.format.clone(),
                metadata: report_output(&r.report),
            })
            .collect();

        Self::output(&JsonOutput::success("show", data))
    }

    fn format_clean_results(&self, outcomes: &[CleanOutcome]) -> Result<()> {
        #[derive(Serialize)]
        struct CleanOutput {
            source: String,
            cleaned: String,
            backup: bool,
        }

        let data: Vec<CleanOutput> = outcomes
            .iter()
            .map(|o| CleanOutput {
                source: o.source.display().to_string(),
                cleaned: o.cleaned.display().to_string(),
                backup: o.backup,
            })
            .collect();

        Self::output(&JsonOutput::success("clean", data))
    }

    fn format_formats(&self, listing: &FormatListing) -> Result<()> {
        #[derive(Serialize)]
        struct FormatsOutput<'a> {
            supported: &'a [String],
            unavailable: BTreeMap<&'a str, &'a str>,
        }

        let data = FormatsOutput {
            supported: &listing.supported,
            unavailable: listing
                .unavailable
                .iter()
                .map(|(mime, reason)| (mime.as_str(), reason.as_str()))
                .collect(),
        };

        Self::output(&JsonOutput::success("formats", data))
    }

    fn format_warning(&self, message: &str) {
        // Warnings go to stderr so stdout stays a single JSON document.
        let _ = writeln!(io::stderr(), "WARNING: {message}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use arcscrub_core::TarBookkeeping;

    #[test]
    fn test_tar_record_is_tagged() {
        let record = MetadataRecord::Tar(TarBookkeeping {
            uid: 1000,
            ..TarBookkeeping::default()
        });
        let json = serde_json::to_value(RecordOutput::from(&record)).unwrap();
        assert_eq!(json["kind"], "tar");
        assert_eq!(json["uid"], 1000);
        assert_eq!(json["uname"], "");
    }

    #[test]
    fn test_report_output_keeps_keys() {
        let mut report = MetadataReport::new();
        report.insert("inner.tar/f.txt", MetadataRecord::Field("x".into()));
        let output = report_output(&report);
        assert_eq!(
            output.get("inner.tar/f.txt"),
            Some(&RecordOutput::Field { value: "x".into() })
        );
    }

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(JsonOutput::success("check", vec![1, 2])).unwrap();
        assert_eq!(json["operation"], "check");
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"][1], 2);
    }
}

//! Human-readable output formatter with colors and styling.

use super::formatter::CheckResult;
use super::formatter::FormatListing;
use super::formatter::OutputFormatter;
use super::formatter::ShowResult;
use anyhow::Result;
use arcscrub_core::CleanOutcome;
use arcscrub_core::MetadataRecord;
use console::Term;
use console::style;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    fn verdict(&self, clean: bool) -> String {
        match (clean, self.use_colors) {
            (true, true) => format!("{}", style("clean").green().bold()),
            (false, true) => format!("{}", style("dirty").red().bold()),
            (true, false) => "clean".to_string(),
            (false, false) => "dirty".to_string(),
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.use_colors {
            format!("{}", style(text).bold())
        } else {
            text.to_string()
        }
    }
}

/// One-line rendering of a record, without the fields that hold defaults.
fn describe(record: &MetadataRecord) -> String {
    match record {
        MetadataRecord::Tar(meta) => {
            let mut parts = Vec::new();
            if meta.mtime != 0 {
                parts.push(format!("mtime={}", meta.mtime));
            }
            if meta.uid != 0 {
                parts.push(format!("uid={}", meta.uid));
            }
            if meta.gid != 0 {
                parts.push(format!("gid={}", meta.gid));
            }
            if !meta.uname.is_empty() {
                parts.push(format!("uname={}", meta.uname));
            }
            if !meta.gname.is_empty() {
                parts.push(format!("gname={}", meta.gname));
            }
            parts.join(" ")
        }
        MetadataRecord::Zip(_) | MetadataRecord::Field(_) => record.to_string(),
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_check_results(&self, results: &[CheckResult]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for result in results {
            if self.verbose {
                self.line(&format!(
                    "{}: {} ({})",
                    result.path.display(),
                    self.verdict(result.clean),
                    result.format
                ));
            } else {
                self.line(&format!(
                    "{}: {}",
                    result.path.display(),
                    self.verdict(result.clean)
                ));
            }
        }

        Ok(())
    }

    fn format_show_results(&self, results: &[ShowResult]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for (i, result) in results.iter().enumerate() {
            if i > 0 {
                self.line("");
            }
            self.line(&self.heading(&format!(
                "[{}] {}",
                result.format,
                result.path.display()
            )));

            if result.report.is_empty() {
                self.line("  No metadata found");
                continue;
            }

            let width = result.report.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
            for (key, record) in &result.report {
                let text = if self.verbose {
                    record.to_string()
                } else {
                    describe(record)
                };
                self.line(&format!("  {key:<width$}  {text}"));
            }
        }

        Ok(())
    }

    fn format_clean_results(&self, outcomes: &[CleanOutcome]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for outcome in outcomes {
            let message = if outcome.backup {
                format!(
                    "Cleaned {} -> {}",
                    outcome.source.display(),
                    outcome.cleaned.display()
                )
            } else {
                format!("Cleaned {}", outcome.source.display())
            };
            if self.use_colors {
                self.line(&format!("{} {message}", style("✓").green().bold()));
            } else {
                self.line(&message);
            }
        }

        Ok(())
    }

    fn format_formats(&self, listing: &FormatListing) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.line(&self.heading("Supported formats:"));
        for mime in &listing.supported {
            self.line(&format!("  {mime}"));
        }

        if !listing.unavailable.is_empty() {
            self.line("");
            self.line(&self.heading("Unavailable formats:"));
            for (mime, reason) in &listing.unavailable {
                self.line(&format!("  {mime}: {reason}"));
            }
        }

        Ok(())
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = Term::stderr().write_line(&format!(
                "{} {message}",
                style("WARNING:").yellow().bold()
            ));
        } else {
            let _ = Term::stderr().write_line(&format!("WARNING: {message}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcscrub_core::TarBookkeeping;
    use arcscrub_core::ZipEntryMetadata;

    #[test]
    fn test_describe_tar_skips_defaults() {
        let record = MetadataRecord::Tar(TarBookkeeping {
            mtime: 1_234_567,
            uname: "alice".into(),
            ..TarBookkeeping::default()
        });
        assert_eq!(describe(&record), "mtime=1234567 uname=alice");
    }

    #[test]
    fn test_describe_zip_shows_every_field() {
        let record = MetadataRecord::Zip(ZipEntryMetadata {
            comment: "secret".into(),
            modified: "2021-06-15 12:30:44".into(),
            create_system: 3,
            create_version: 30,
        });
        let text = describe(&record);
        assert!(text.contains("secret"));
        assert!(text.contains("2021-06-15 12:30:44"));
    }
}

//! Clean command implementation.

use crate::cli::CleanArgs;
use crate::error::add_file_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use arcscrub_core::EngineConfig;
use arcscrub_core::config::cleaned_path;
use arcscrub_core::remove_all;

pub fn execute(
    args: &CleanArgs,
    config: &EngineConfig,
    formatter: &dyn OutputFormatter,
    interactive: bool,
) -> Result<()> {
    if args.backup {
        for path in &args.files {
            let target = cleaned_path(path);
            if target.exists() {
                formatter.format_warning(&format!("overwriting {}", target.display()));
            }
        }
    }

    // Only worth a bar when several files are processed on a terminal
    let progress = (interactive && args.files.len() > 1 && CliProgress::should_show())
        .then(|| CliProgress::new(args.files.len(), "Cleaning"));

    let mut outcomes = Vec::with_capacity(args.files.len());
    for path in &args.files {
        if let Some(progress) = &progress {
            progress.set_file(path);
        }
        outcomes.push(add_file_context(
            remove_all(path, args.backup, config),
            path,
        )?);
        if let Some(progress) = &progress {
            progress.inc();
        }
    }
    drop(progress);

    formatter.format_clean_results(&outcomes)
}

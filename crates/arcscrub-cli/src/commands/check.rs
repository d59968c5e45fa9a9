//! Check command implementation

use super::open_for_inspection;
use crate::cli::FilesArgs;
use crate::error::add_file_context;
use crate::output::CheckResult;
use crate::output::OutputFormatter;
use anyhow::Result;
use anyhow::bail;
use arcscrub_core::EngineConfig;
use arcscrub_core::FormatRegistry;
use arcscrub_core::StripContext;

pub fn execute(
    args: &FilesArgs,
    config: &EngineConfig,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let cx = StripContext::new(FormatRegistry::builtin(), config);

    let mut results = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let handler = open_for_inspection(path)?;
        let clean = add_file_context(handler.is_clean(&cx), path)?;
        results.push(CheckResult {
            path: path.clone(),
            format: handler.format_name().to_string(),
            clean,
        });
    }

    formatter.format_check_results(&results)?;

    let dirty = results.iter().filter(|r| !r.clean).count();
    if dirty > 0 {
        bail!("{dirty} of {} file(s) carry metadata", results.len());
    }
    Ok(())
}

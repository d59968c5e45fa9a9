//! Show command implementation

use super::open_for_inspection;
use crate::cli::FilesArgs;
use crate::error::add_file_context;
use crate::output::OutputFormatter;
use crate::output::ShowResult;
use anyhow::Result;
use arcscrub_core::EngineConfig;
use arcscrub_core::FormatRegistry;
use arcscrub_core::StripContext;

pub fn execute(
    args: &FilesArgs,
    config: &EngineConfig,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let cx = StripContext::new(FormatRegistry::builtin(), config);

    let results = args
        .files
        .iter()
        .map(|path| {
            let handler = open_for_inspection(path)?;
            let report = add_file_context(handler.get_metadata(&cx), path)?;
            Ok(ShowResult {
                path: path.clone(),
                format: handler.format_name().to_string(),
                report,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    formatter.format_show_results(&results)
}

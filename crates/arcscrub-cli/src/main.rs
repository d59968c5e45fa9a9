//! arcscrub CLI - inspect and strip identifying metadata from archives.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);
    let config = cli.engine_config();

    match &cli.command {
        cli::Commands::Check(args) => commands::check::execute(args, &config, &*formatter),
        cli::Commands::Show(args) => commands::show::execute(args, &config, &*formatter),
        cli::Commands::Clean(args) => {
            let interactive = !cli.quiet && !cli.json;
            commands::clean::execute(args, &config, &*formatter, interactive)
        }
        cli::Commands::Formats => commands::formats::execute(&*formatter),
        cli::Commands::Completion { shell } => {
            commands::completion::execute(*shell);
            Ok(())
        }
    }
}

//! CLI argument parsing using clap.

use arcscrub_core::EngineConfig;
use arcscrub_core::UnsupportedMemberPolicy;
use arcscrub_core::config::DEFAULT_MAX_DEPTH;
use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arcscrub")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Maximum container nesting depth below the top-level file
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Copy archive members with unsupported formats unmodified instead of
    /// failing
    #[arg(long, global = true)]
    pub pass_through: bool,

    /// Directory for temporary extraction (default: system temp directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,
}

impl Cli {
    /// Builds the engine configuration from the global flags.
    pub fn engine_config(&self) -> EngineConfig {
        let policy = if self.pass_through {
            UnsupportedMemberPolicy::PassThrough
        } else {
            UnsupportedMemberPolicy::Abort
        };
        let config = EngineConfig::default()
            .with_max_depth(self.max_depth)
            .with_unsupported_members(policy);
        match &self.scratch_dir {
            Some(dir) => config.with_scratch_root(dir),
            None => config,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report whether files carry metadata
    Check(FilesArgs),
    /// Show the metadata files carry
    Show(FilesArgs),
    /// Remove metadata from files
    Clean(CleanArgs),
    /// List supported formats
    Formats,
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct FilesArgs {
    /// Files to inspect
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(clap::Args)]
pub struct CleanArgs {
    /// Files to clean
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Keep originals and write cleaned copies to FILE.cleaned
    #[arg(short, long)]
    pub backup: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_engine_flags_map_to_config() {
        let cli = Cli::try_parse_from([
            "arcscrub",
            "check",
            "a.tar",
            "--max-depth",
            "3",
            "--pass-through",
            "--scratch-dir",
            "/var/tmp",
        ])
        .unwrap();
        let config = cli.engine_config();
        assert_eq!(config.max_depth, 3);
        assert_eq!(
            config.unsupported_members,
            UnsupportedMemberPolicy::PassThrough
        );
        assert_eq!(config.scratch_root, Some(PathBuf::from("/var/tmp")));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["arcscrub", "clean", "a.tar"]).unwrap();
        let config = cli.engine_config();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.unsupported_members, UnsupportedMemberPolicy::Abort);
        assert!(config.scratch_root.is_none());
        match cli.command {
            Commands::Clean(args) => assert!(!args.backup),
            _ => panic!("expected clean"),
        }
    }

    #[test]
    fn test_files_required() {
        assert!(Cli::try_parse_from(["arcscrub", "check"]).is_err());
    }
}

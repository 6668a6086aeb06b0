// Command routing and dispatch

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use constgen_storage::DEFAULT_SETTINGS_FILE;

use crate::commands::*;
use crate::error::CliResult;
use crate::logging;

/// constgen - generate constants source files from data and templates
#[derive(Parser, Debug)]
#[command(name = "constgen")]
#[command(bin_name = "constgen")]
#[command(about = "Generate constants source files from data files and marked templates")]
#[command(
    long_about = "constgen expands a marked line of a template once per data entry and writes a runtime constants file plus optional editor-only list and lookup files for every configured generator.\n\nQuick start:\n  • constgen init       Write a starter settings file and templates\n  • constgen generate   Generate all configured files\n  • constgen watch      Regenerate when the data file changes"
)]
#[command(version)]
#[command(author = "constgen Contributors")]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log level for diagnostics on stderr (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Settings file (YAML, TOML or JSON)
    #[arg(short, long, global = true, value_name = "PATH", default_value = DEFAULT_SETTINGS_FILE)]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate constants files once
    #[command(about = "Run every active generator, or the ones selected with --only")]
    Generate {
        /// Only run generators with this logic ID (repeatable)
        #[arg(long, value_name = "LOGIC_ID")]
        only: Vec<String>,

        /// Compute the files without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Regenerate whenever the watched data file changes
    #[command(about = "Watch the configured data file and regenerate on change")]
    Watch,

    /// Show template markers and generator status
    #[command(about = "Parse the configured templates and report their markers")]
    Inspect,

    /// List registered data-source adapters
    #[command(about = "List the logic IDs generators can use")]
    Adapters,

    /// Write a starter settings file
    #[command(about = "Create a settings file, starter templates and sample data")]
    Init {
        /// Settings file to create (default: --config)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
}

/// Route commands to their handlers
pub struct CommandRouter;

impl CommandRouter {
    /// Parse arguments and execute the selected command
    pub async fn route() -> CliResult<()> {
        let cli = Cli::parse();
        logging::init_logging(cli.verbose, cli.quiet);
        logging::init_tracing(cli.verbose, cli.quiet, cli.log_level.as_deref())?;
        Self::execute(&cli).await
    }

    /// Execute a parsed command line
    pub async fn execute(cli: &Cli) -> CliResult<()> {
        match &cli.command {
            Commands::Generate { only, dry_run } => {
                let cmd = GenerateCommand::new(&cli.config)
                    .with_only(only.clone())
                    .with_dry_run(*dry_run);
                cmd.execute().await
            }
            Commands::Watch => {
                let cmd = WatchCommand::new(&cli.config);
                cmd.execute().await
            }
            Commands::Inspect => {
                let cmd = InspectCommand::new(&cli.config);
                cmd.execute().await
            }
            Commands::Adapters => {
                let cmd = AdaptersCommand::new();
                cmd.execute().await
            }
            Commands::Init { path, force } => {
                let path = path.clone().unwrap_or_else(|| cli.config.clone());
                let cmd = InitCommand::new(path).with_force(*force);
                cmd.execute().await
            }
        }
    }
}

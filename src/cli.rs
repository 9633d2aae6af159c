//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::commands;
use airone::output::OutputConfig;

/// airone - Sync declared modules and wire them into the iOS Podfile
#[derive(Parser, Debug)]
#[command(name = "airone")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync modules and inject them into the Podfile
    Install(commands::install::InstallArgs),

    /// Declare a new module in airone.json
    Add(commands::add::AddArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level)?;
        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Install(args) => commands::install::execute(args, &output),
            Commands::Add(args) => commands::add::execute(args, &output),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Initialize `env_logger` at `level`. `RUST_LOG`, when set, wins.
fn init_logging(level: &str) -> Result<()> {
    let filter: LevelFilter = level
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid log level '{}'", level))?;

    let mut builder = env_logger::Builder::new();
    builder.filter_level(filter).format_timestamp(None);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    // A second init (tests driving execute twice) keeps the first logger.
    let _ = builder.try_init();
    Ok(())
}

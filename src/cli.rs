//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Image Mirror - Maintain a registry of mirrored container images
#[derive(Parser, Debug)]
#[command(name = "image-mirror")]
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
    /// Discover new upstream tags and propose registry updates
    Autoupdate(commands::autoupdate::AutoupdateArgs),

    /// Validate the registry and autoupdate configuration files
    Validate(commands::validate::ValidateArgs),

    /// Rewrite the configuration files in canonical sorted form
    Format(commands::format::FormatArgs),

    /// Regenerate the regsync configuration from the registry
    Regsync(commands::regsync::RegsyncArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .init();

        match self.command {
            Commands::Autoupdate(args) => commands::autoupdate::execute(args, &self.color),
            Commands::Validate(args) => commands::validate::execute(args, &self.color),
            Commands::Format(args) => commands::format::execute(args, &self.color),
            Commands::Regsync(args) => commands::regsync::execute(args, &self.color),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which parses both
//! configuration files and reports any problems without applying anything.
//!
//! ## Functionality
//!
//! - **Registry Validation**: Parses the registry and verifies every image
//!   reference is well-formed (the derived target name requires at least
//!   two path segments).
//! - **Autoupdate Validation**: Parses the autoupdate file with its strict
//!   schema and validates every entry (non-empty name, exactly one
//!   strategy).
//! - **Summary**: Prints counts of images, repository targets, and entries.
//!
//! This command is a safe, read-only operation that does not modify any
//! files.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use image_mirror::autoupdate;
use image_mirror::config;
use image_mirror::output::{emoji, OutputConfig};
use image_mirror::paths;

/// Validate the registry and autoupdate configuration files
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Root of the registry checkout.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    let config_path = args.root.join(paths::CONFIG_YAML);
    println!(
        "{} Validating registry: {}",
        emoji(&out, "🔍", "[SCAN]"),
        config_path.display()
    );
    let registry = match config::parse(&config_path) {
        Ok(registry) => {
            println!("{} Registry parsed successfully", emoji(&out, "✅", "[OK]"));
            registry
        }
        Err(e) => {
            println!("{} Registry parsing failed: {}", emoji(&out, "❌", "[ERR]"), e);
            return Err(anyhow::anyhow!("registry parsing failed: {}", e));
        }
    };

    let autoupdate_path = args.root.join(paths::AUTOUPDATE_YAML);
    println!(
        "{} Validating autoupdate entries: {}",
        emoji(&out, "🔍", "[SCAN]"),
        autoupdate_path.display()
    );
    let entries = match autoupdate::parse(&autoupdate_path) {
        Ok(entries) => {
            println!(
                "{} Autoupdate entries parsed successfully",
                emoji(&out, "✅", "[OK]")
            );
            entries
        }
        Err(e) => {
            println!(
                "{} Autoupdate parsing failed: {}",
                emoji(&out, "❌", "[ERR]"),
                e
            );
            return Err(anyhow::anyhow!("autoupdate parsing failed: {}", e));
        }
    };

    println!("\n{} Configuration Summary:", emoji(&out, "📊", "[INFO]"));
    println!("   Images: {}", registry.images.len());
    println!(
        "   Mirror targets: {}",
        registry.repositories.iter().filter(|r| r.target).count()
    );
    println!("   Autoupdate entries: {}", entries.len());

    Ok(())
}

//! # Format Command Implementation
//!
//! This module implements the `format` subcommand, which rewrites the
//! registry and autoupdate files in their canonical form: images sorted by
//! `(SourceImage, TargetImageName)` with sorted tag lists, repositories
//! sorted by `(BaseUrl, EnvVarPrefix)`, and autoupdate entries sorted by
//! name. Running it on already-canonical files is a no-op.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use image_mirror::autoupdate;
use image_mirror::config;
use image_mirror::output::{emoji, OutputConfig};
use image_mirror::paths;

/// Rewrite the configuration files in canonical sorted form
#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Root of the registry checkout.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,
}

/// Execute the `format` command.
pub fn execute(args: FormatArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    let config_path = args.root.join(paths::CONFIG_YAML);
    let registry = config::parse(&config_path)?;
    config::write(&config_path, &registry)?;
    println!(
        "{} Formatted {}",
        emoji(&out, "✅", "[OK]"),
        config_path.display()
    );

    let autoupdate_path = args.root.join(paths::AUTOUPDATE_YAML);
    let entries = autoupdate::parse(&autoupdate_path)?;
    autoupdate::write(&autoupdate_path, &entries)?;
    println!(
        "{} Formatted {}",
        emoji(&out, "✅", "[OK]"),
        autoupdate_path.display()
    );

    Ok(())
}

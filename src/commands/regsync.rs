//! # Regsync Command Implementation
//!
//! This module implements the `regsync` subcommand, which regenerates the
//! regsync configuration from the registry. The autoupdate workflow does
//! this automatically before each commit; the standalone command covers
//! hand-edited registries.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use image_mirror::config;
use image_mirror::output::{emoji, OutputConfig};
use image_mirror::paths;
use image_mirror::regsync;

/// Regenerate the regsync configuration from the registry
#[derive(Args, Debug)]
pub struct RegsyncArgs {
    /// Root of the registry checkout.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,
}

/// Execute the `regsync` command.
pub fn execute(args: RegsyncArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    let registry = config::parse(&args.root.join(paths::CONFIG_YAML))?;
    let regsync_config = regsync::from_config(&registry);

    let regsync_path = args.root.join(paths::REGSYNC_YAML);
    regsync::write(&regsync_path, &regsync_config)?;

    println!(
        "{} Wrote {} ({} sync entries)",
        emoji(&out, "✅", "[OK]"),
        regsync_path.display(),
        regsync_config.sync.len()
    );

    Ok(())
}

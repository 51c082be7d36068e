//! # Autoupdate Command Implementation
//!
//! This module implements the `autoupdate` subcommand, which discovers new
//! upstream release tags and proposes registry updates as pull requests.
//!
//! ## Functionality
//!
//! - **Discovery**: Each autoupdate entry resolves the latest upstream tag
//!   via its configured strategy.
//!
//! - **Diffing**: Discovered images are compared against the registry; only
//!   genuinely new `(image, tag)` pairs proceed.
//!
//! - **Duplicate Guard**: If a proposal for the computed branch already
//!   exists, the entry terminates without touching anything.
//!
//! - **Proposal**: New tags are committed one image at a time on a dedicated
//!   branch, which is pushed and opened as a single pull request.
//!
//! - **Dry Run**: With `--dry-run`, the command reports the branch that
//!   would be created and makes no changes at all.
//!
//! A failing entry does not stop the remaining entries; the command exits
//! non-zero at the end if any entry failed.
//!
//! ## Environment
//!
//! Requires `GITHUB_REPOSITORY` (`<owner>/<repo>`), and `GITHUB_TOKEN`
//! unless running with `--dry-run`.

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;

use image_mirror::autoupdate;
use image_mirror::autoupdate::run::{run_entry, AutoupdateEnv, Outcome, RunContext};
use image_mirror::config;
use image_mirror::git::Git;
use image_mirror::github::GithubClient;
use image_mirror::output::{emoji, OutputConfig};
use image_mirror::paths;

/// Discover new upstream tags and propose registry updates
#[derive(Args, Debug)]
pub struct AutoupdateArgs {
    /// Root of the registry checkout. The registry and autoupdate files are
    /// expected directly under it, and git runs against it.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Only process the autoupdate entry with this name.
    #[arg(long, value_name = "NAME")]
    pub entry: Option<String>,

    /// If set, report what would be proposed without creating branches,
    /// commits, or pull requests.
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the `autoupdate` command.
pub fn execute(args: AutoupdateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    let registry = config::parse(&args.root.join(paths::CONFIG_YAML))?;
    let entries = autoupdate::parse(&args.root.join(paths::AUTOUPDATE_YAML))?;

    let entries: Vec<_> = match &args.entry {
        Some(name) => {
            let filtered: Vec<_> = entries.into_iter().filter(|e| &e.name == name).collect();
            if filtered.is_empty() {
                bail!("no autoupdate entry named {:?}", name);
            }
            filtered
        }
        None => entries,
    };

    // Resolve the runtime environment once, before any entry runs.
    let env = AutoupdateEnv::from_env(args.dry_run)?;

    let git = Git::new(&args.root);
    if !args.dry_run && !git.is_working_tree_clean()? {
        bail!("working tree has uncommitted changes; commit or stash them first");
    }

    let github = GithubClient::new(env.token.clone())?;
    let ctx = RunContext {
        root: &args.root,
        owner: &env.owner,
        repo: &env.repo,
        dry_run: args.dry_run,
        releases: &github,
        proposals: &github,
        vcs: &git,
    };

    let mut failed = 0usize;
    for entry in &entries {
        match run_entry(entry, &registry, &ctx) {
            Ok(Outcome::NoUpdate) => {
                println!("{}: no updates found", entry.name);
            }
            Ok(Outcome::ExistingProposal { url }) => {
                println!(
                    "{} {}: found existing proposal: {}",
                    emoji(&out, "ℹ️", "[INFO]"),
                    entry.name,
                    url
                );
            }
            Ok(Outcome::AmbiguousProposal { urls }) => {
                println!(
                    "{} {}: multiple existing proposals share one branch; manual cleanup needed:",
                    emoji(&out, "⚠️", "[WARN]"),
                    entry.name
                );
                for url in urls {
                    println!("   - {}", url);
                }
            }
            Ok(Outcome::DryRun { branch }) => {
                println!("{}: would make proposal under branch {}", entry.name, branch);
            }
            Ok(Outcome::Published { tag, url, .. }) => {
                println!(
                    "{} {}: created proposal for tag {}: {}",
                    emoji(&out, "✅", "[OK]"),
                    entry.name,
                    tag,
                    url
                );
            }
            Err(e) => {
                eprintln!("{} {}: {}", emoji(&out, "❌", "[ERR]"), entry.name, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} entries failed", failed, entries.len());
    }
    Ok(())
}

//! # Autoupdate Orchestration
//!
//! Drives one autoupdate entry from upstream discovery to a reviewable pull
//! request. The sequence per entry is strictly linear:
//!
//! 1. Resolve the entry's latest upstream images.
//! 2. Diff them against the registry through a freshly seeded accumulator.
//! 3. Guard against a proposal that already exists for the same branch.
//! 4. Commit each newly required image, one commit per image.
//! 5. Push the branch and open a single pull request covering them all.
//!
//! Early terminations (no update, existing proposal, ambiguous remote
//! state, dry run) are successful [`Outcome`]s, not errors. Side-effecting
//! collaborators are injected as capabilities so the fold can be exercised
//! without git or the network; a mid-loop failure leaves the local branch
//! partially committed on purpose, each commit being independently
//! reviewable and revertable.

use std::env;
use std::path::Path;

use log::warn;

use crate::accumulator::ImageAccumulator;
use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::git::Git;
use crate::github::{GithubClient, NewPullRequest, PullRequest};
use crate::{paths, regsync};

use super::ConfigEntry;
use super::strategy::ReleaseSource;

/// The remote that autoupdate branches are pushed to.
pub const REMOTE: &str = "origin";

/// The branch that proposals are opened against.
pub const TRUNK_BRANCH: &str = "master";

/// Receiver for the version-control side effects of the commit loop.
pub trait CommitSink {
    fn create_and_checkout(&self, branch: &str) -> Result<()>;
    fn commit(&self, message: &str) -> Result<()>;
    fn push(&self, branch: &str, remote: &str) -> Result<()>;
}

impl CommitSink for Git {
    fn create_and_checkout(&self, branch: &str) -> Result<()> {
        Git::create_and_checkout(self, branch)
    }

    fn commit(&self, message: &str) -> Result<()> {
        Git::commit(self, message)
    }

    fn push(&self, branch: &str, remote: &str) -> Result<()> {
        Git::push_branch(self, branch, remote)
    }
}

/// Remote proposal listing and creation.
pub trait ProposalApi {
    /// List proposals whose source branch equals `head`, in any state.
    fn list_for_head(&self, owner: &str, repo: &str, head: &str) -> Result<Vec<PullRequest>>;
    fn create(&self, owner: &str, repo: &str, proposal: &NewPullRequest) -> Result<PullRequest>;
}

impl ProposalApi for GithubClient {
    fn list_for_head(&self, owner: &str, repo: &str, head: &str) -> Result<Vec<PullRequest>> {
        self.list_pull_requests(owner, repo, head)
    }

    fn create(&self, owner: &str, repo: &str, proposal: &NewPullRequest) -> Result<PullRequest> {
        self.create_pull_request(owner, repo, proposal)
    }
}

/// Runtime inputs resolved once before any entry is processed, instead of
/// being read from the process environment mid-run.
#[derive(Debug, Clone)]
pub struct AutoupdateEnv {
    /// API token. May be absent only in dry-run mode.
    pub token: Option<String>,
    /// Owner of the repository that proposals target.
    pub owner: String,
    /// Name of the repository that proposals target.
    pub repo: String,
}

impl AutoupdateEnv {
    /// Resolve `GITHUB_TOKEN` and `GITHUB_REPOSITORY` from the process
    /// environment. Missing values are fatal before any entry runs.
    pub fn from_env(dry_run: bool) -> Result<Self> {
        let token = env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
        let repository = env::var("GITHUB_REPOSITORY").unwrap_or_default();
        Self::from_parts(token, &repository, dry_run)
    }

    fn from_parts(token: Option<String>, repository: &str, dry_run: bool) -> Result<Self> {
        if token.is_none() && !dry_run {
            return Err(Error::Environment {
                message: "must define GITHUB_TOKEN".to_string(),
            });
        }
        if repository.is_empty() {
            return Err(Error::Environment {
                message: "must define GITHUB_REPOSITORY".to_string(),
            });
        }
        let parts: Vec<&str> = repository.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            return Err(Error::Environment {
                message: "must define GITHUB_REPOSITORY in form <owner>/<repo>".to_string(),
            });
        }
        Ok(AutoupdateEnv {
            token,
            owner: parts[0].to_string(),
            repo: parts[1].to_string(),
        })
    }
}

/// Everything one entry run needs, owned by the caller and borrowed for the
/// duration of the run.
pub struct RunContext<'a> {
    /// Checkout root; the registry and regsync files live directly under it.
    pub root: &'a Path,
    pub owner: &'a str,
    pub repo: &'a str,
    pub dry_run: bool,
    pub releases: &'a dyn ReleaseSource,
    pub proposals: &'a dyn ProposalApi,
    pub vcs: &'a dyn CommitSink,
}

/// Terminal state of a successful entry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every discovered image is already in the registry.
    NoUpdate,
    /// A proposal for the computed branch already exists.
    ExistingProposal { url: String },
    /// More than one proposal matches the computed branch. Inconsistent
    /// remote state needing manual cleanup; nothing is mutated.
    AmbiguousProposal { urls: Vec<String> },
    /// Dry run: the branch that would have been created.
    DryRun { branch: String },
    /// Proposal opened.
    Published { branch: String, tag: String, url: String },
}

/// Run the autoupdate workflow for a single entry.
///
/// The registry snapshot is the caller's parse of the current registry
/// file; on-disk state is only touched from the commit loop onward. Errors
/// abort this entry only — whether to continue with other entries is the
/// caller's policy.
pub fn run_entry(entry: &ConfigEntry, registry: &Config, ctx: &RunContext<'_>) -> Result<Outcome> {
    let latest_images = entry.latest_images(ctx.releases)?;

    let mut accumulator = ImageAccumulator::new();
    accumulator.add_images(registry.images.iter().cloned());

    let images_to_update: Vec<_> = latest_images
        .into_iter()
        .filter(|image| !accumulator.contains(image))
        .collect();
    if images_to_update.is_empty() {
        return Ok(Outcome::NoUpdate);
    }

    let tag = images_to_update[0]
        .tags
        .first()
        .cloned()
        .ok_or_else(|| Error::Strategy {
            entry: entry.name.clone(),
            message: format!(
                "strategy returned image {:?} without a tag",
                images_to_update[0].source_image
            ),
        })?;
    let branch = format!("autoupdate/{}/{}", entry.name, tag);

    // The pull request list endpoint only filters by head branch when the
    // filter is in <owner>:<branch> form. Branches pushed with the workflow
    // token live under the target repository's owner.
    let head = format!("{}:{}", ctx.owner, branch);
    let existing = ctx.proposals.list_for_head(ctx.owner, ctx.repo, &head)?;
    match existing.len() {
        0 => {}
        1 => {
            return Ok(Outcome::ExistingProposal {
                url: existing[0].html_url.clone(),
            })
        }
        _ => {
            let urls: Vec<String> = existing.iter().map(|pr| pr.html_url.clone()).collect();
            warn!(
                "{}: found multiple existing proposals with head branch {}: {}",
                entry.name,
                head,
                urls.join(", ")
            );
            return Ok(Outcome::AmbiguousProposal { urls });
        }
    }

    if ctx.dry_run {
        return Ok(Outcome::DryRun { branch });
    }

    ctx.vcs.create_and_checkout(&branch)?;

    // The accumulator is reused across the loop: each iteration folds one
    // more image in and commits the regenerated files, so every addition
    // gets its own commit on the shared branch.
    let mut registry = registry.clone();
    for image in &images_to_update {
        accumulator.add_images([image.clone()]);
        registry.images = accumulator.images();

        config::write(&ctx.root.join(paths::CONFIG_YAML), &registry)?;
        let regsync_config = regsync::from_config(&registry);
        regsync::write(&ctx.root.join(paths::REGSYNC_YAML), &regsync_config)?;

        let message = format!("Add tag {} for image {}", tag, image.source_image);
        ctx.vcs.commit(&message)?;
    }

    ctx.vcs.push(&branch, REMOTE)?;

    let title = format!("[autoupdate] Add tag `{}` for `{}`", tag, entry.name);
    let mut body = format!(
        "This PR was created by the autoupdate workflow.\n\n\
         It adds the tag `{}` for the following images:",
        tag
    );
    for image in &images_to_update {
        body.push_str("\n- `");
        body.push_str(&image.source_image);
        body.push('`');
    }

    let proposal = ctx.proposals.create(
        ctx.owner,
        ctx.repo,
        &NewPullRequest {
            title,
            body,
            head: branch.clone(),
            base: TRUNK_BRANCH.to_string(),
            maintainer_can_modify: true,
        },
    )?;

    Ok(Outcome::Published {
        branch,
        tag,
        url: proposal.html_url,
    })
}

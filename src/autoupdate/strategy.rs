//! # Update Discovery Strategies
//!
//! A strategy answers one question for an autoupdate entry: what is the
//! latest known upstream state of its images? Each resolved image carries
//! exactly one tag, the latest discovered one.
//!
//! One strategy exists today, keyed on an upstream project's latest GitHub
//! release. The [`UpdateStrategy`] trait keeps the orchestrator indifferent
//! to how discovery happens, so further mechanisms (registry tag listings,
//! release feeds) can be added without touching the diff/commit/publish
//! logic.

use serde::{Deserialize, Serialize};

use crate::config::Image;
use crate::error::Result;
use crate::github::GithubClient;

/// Source of "latest release" lookups, injected so strategies can be
/// resolved without the network in tests.
pub trait ReleaseSource {
    fn latest_release_tag(&self, owner: &str, repository: &str) -> Result<String>;
}

impl ReleaseSource for GithubClient {
    fn latest_release_tag(&self, owner: &str, repository: &str) -> Result<String> {
        Ok(self.latest_release(owner, repository)?.tag_name)
    }
}

/// An update discovery mechanism for one autoupdate entry.
pub trait UpdateStrategy {
    /// Resolve the set of images representing the latest known upstream
    /// state, one tag per image.
    fn latest_images(&self, releases: &dyn ReleaseSource) -> Result<Vec<Image>>;
}

/// Discover the latest tag from an upstream project's most recent GitHub
/// release, and apply it to every configured image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct GithubLatestRelease {
    /// Upstream project owner (not the mirror target).
    pub owner: String,
    /// Upstream project repository.
    pub repository: String,
    /// Source image references that follow this project's releases.
    pub images: Vec<String>,
}

impl UpdateStrategy for GithubLatestRelease {
    fn latest_images(&self, releases: &dyn ReleaseSource) -> Result<Vec<Image>> {
        let tag = releases.latest_release_tag(&self.owner, &self.repository)?;
        self.images
            .iter()
            .map(|source| Image::new(source.clone(), vec![tag.clone()]))
            .collect()
    }
}

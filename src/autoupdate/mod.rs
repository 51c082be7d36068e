//! # Autoupdate Configuration
//!
//! The autoupdate file (`autoupdate.yaml`) is a list of named entries, each
//! describing how to discover the latest upstream tag for one image family.
//! This module owns the entry schema, its strict parsing and validation, and
//! the dispatch from an entry to its configured update strategy.
//!
//! The orchestration workflow that consumes these entries lives in
//! [`run`]; the discovery strategies live in [`strategy`].

pub mod run;
pub mod strategy;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::Image;
use crate::error::{Error, Result};
use strategy::{GithubLatestRelease, ReleaseSource, UpdateStrategy};

/// One autoupdate entry: a unique name plus exactly one update strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ConfigEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_latest_release: Option<GithubLatestRelease>,
}

/// Parse the autoupdate file. The schema is strict: unknown fields are
/// rejected, and every entry is validated before any is returned.
pub fn parse(path: &Path) -> Result<Vec<ConfigEntry>> {
    let contents = fs::read_to_string(path)?;

    let entries: Vec<ConfigEntry> =
        serde_yaml::from_str(&contents).map_err(|e| Error::ConfigParse {
            message: format!("{}: {}", path.display(), e),
            hint: Some("autoupdate entries accept only Name and a single update strategy".into()),
        })?;

    for entry in &entries {
        entry.validate()?;
    }

    Ok(entries)
}

/// Write the autoupdate file, sorted by entry name.
pub fn write(path: &Path, entries: &[ConfigEntry]) -> Result<()> {
    let mut entries = entries.to_vec();
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let contents = serde_yaml::to_string(&entries)?;
    fs::write(path, contents)?;

    Ok(())
}

impl ConfigEntry {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::EntryValidation {
                entry: self.name.clone(),
                message: "must specify Name".to_string(),
            });
        }
        if self.github_latest_release.is_none() {
            return Err(Error::EntryValidation {
                entry: self.name.clone(),
                message: "must specify an autoupdate strategy".to_string(),
            });
        }
        Ok(())
    }

    /// Resolve the latest upstream images via this entry's strategy. Each
    /// returned image carries exactly one tag, the latest discovered one.
    pub fn latest_images(&self, releases: &dyn ReleaseSource) -> Result<Vec<Image>> {
        let strategy: &dyn UpdateStrategy = match &self.github_latest_release {
            Some(github_latest_release) => github_latest_release,
            None => {
                return Err(Error::Strategy {
                    entry: self.name.clone(),
                    message: "did not find update strategy".to_string(),
                })
            }
        };
        strategy
            .latest_images(releases)
            .map_err(|e| Error::Strategy {
                entry: self.name.clone(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(name: &str) -> ConfigEntry {
        ConfigEntry {
            name: name.to_string(),
            github_latest_release: Some(GithubLatestRelease {
                owner: "flannel-io".to_string(),
                repository: "flannel".to_string(),
                images: vec!["docker.io/flannel/flannel".to_string()],
            }),
        }
    }

    #[test]
    fn test_parse_valid_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("autoupdate.yaml");
        fs::write(
            &path,
            r#"
- Name: flannel
  GithubLatestRelease:
    Owner: flannel-io
    Repository: flannel
    Images:
      - docker.io/flannel/flannel
"#,
        )
        .unwrap();

        let entries = parse(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "flannel");
        let strategy = entries[0].github_latest_release.as_ref().unwrap();
        assert_eq!(strategy.owner, "flannel-io");
        assert_eq!(strategy.images, vec!["docker.io/flannel/flannel"]);
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("autoupdate.yaml");
        fs::write(
            &path,
            r#"
- Name: flannel
  Strategy: github
"#,
        )
        .unwrap();

        let err = parse(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_rejects_entry_without_strategy() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("autoupdate.yaml");
        fs::write(&path, "- Name: flannel\n").unwrap();

        let err = parse(&path).unwrap_err();
        assert!(err.to_string().contains("must specify an autoupdate strategy"));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let err = entry("").validate().unwrap_err();
        assert!(err.to_string().contains("must specify Name"));
    }

    #[test]
    fn test_write_sorts_entries_by_name() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("autoupdate.yaml");

        write(&path, &[entry("skopeo"), entry("coredns")]).unwrap();

        let reparsed = parse(&path).unwrap();
        assert_eq!(reparsed[0].name, "coredns");
        assert_eq!(reparsed[1].name, "skopeo");
    }
}

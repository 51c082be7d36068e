//! # Regsync Configuration Generation
//!
//! The mirroring itself is performed by regsync, driven by a `regsync.yaml`
//! generated from the registry. This module owns that derivation: it is
//! regenerated in full from the current registry snapshot on every change
//! and written alongside the registry, never edited by hand.
//!
//! Credentials are not stored; each target repository contributes a creds
//! entry templated against its environment variable prefix, resolved by
//! regsync at run time.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;

/// Root of the generated regsync file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegsyncConfig {
    pub version: u32,
    pub creds: Vec<RegsyncCred>,
    pub sync: Vec<RegsyncEntry>,
}

/// Credential template for one target registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegsyncCred {
    pub registry: String,
    pub user: String,
    pub pass: String,
}

/// One source-to-target sync rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegsyncEntry {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub tags: RegsyncTags,
}

/// Tag filter for a sync rule. Only explicitly registered tags are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegsyncTags {
    pub allow: Vec<String>,
}

/// Derive the regsync configuration from a registry snapshot.
///
/// Output is deterministic: images and repositories are visited in the
/// registry's canonical sort order. Images flagged `DoNotMirror` are left
/// out entirely.
pub fn from_config(config: &Config) -> RegsyncConfig {
    let mut sorted = config.clone();
    sorted.sort();

    let targets: Vec<_> = sorted.repositories.iter().filter(|r| r.target).collect();

    let creds = targets
        .iter()
        .map(|repo| RegsyncCred {
            registry: registry_host(&repo.base_url).to_string(),
            user: format!("{{{{env \"{}_USERNAME\"}}}}", repo.env_var_prefix),
            pass: format!("{{{{env \"{}_PASSWORD\"}}}}", repo.env_var_prefix),
        })
        .collect();

    let mut sync = Vec::new();
    for image in sorted.images.iter().filter(|i| !i.do_not_mirror) {
        for repo in &targets {
            sync.push(RegsyncEntry {
                source: image.source_image.clone(),
                target: format!("{}/{}", repo.base_url, image.target_image_name()),
                kind: "repository".to_string(),
                tags: RegsyncTags {
                    allow: image.tags.clone(),
                },
            });
        }
    }

    RegsyncConfig {
        version: 1,
        creds,
        sync,
    }
}

/// Write the regsync configuration to a YAML file.
pub fn write(path: &Path, regsync: &RegsyncConfig) -> Result<()> {
    let contents = serde_yaml::to_string(regsync)?;
    fs::write(path, contents)?;
    Ok(())
}

/// The registry host is the first path segment of a repository base URL.
fn registry_host(base_url: &str) -> &str {
    base_url.split('/').next().unwrap_or(base_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Image, Repository};
    use tempfile::TempDir;

    fn sample_config() -> Config {
        let mut skipped = Image::new("quay.io/skopeo/stable", vec!["v1.14.0".into()]).unwrap();
        skipped.do_not_mirror = true;

        Config {
            images: vec![
                Image::new(
                    "docker.io/flannel/flannel",
                    vec!["v0.24.0".into(), "v0.25.1".into()],
                )
                .unwrap(),
                skipped,
            ],
            repositories: vec![
                Repository {
                    base_url: "docker.io/rancher".to_string(),
                    env_var_prefix: "DOCKER".to_string(),
                    target: true,
                },
                Repository {
                    base_url: "registry.example.com/upstream".to_string(),
                    env_var_prefix: "EXAMPLE".to_string(),
                    target: false,
                },
            ],
        }
    }

    #[test]
    fn test_from_config_creds_cover_targets_only() {
        let regsync = from_config(&sample_config());

        assert_eq!(regsync.version, 1);
        assert_eq!(regsync.creds.len(), 1);
        assert_eq!(regsync.creds[0].registry, "docker.io");
        assert_eq!(regsync.creds[0].user, "{{env \"DOCKER_USERNAME\"}}");
        assert_eq!(regsync.creds[0].pass, "{{env \"DOCKER_PASSWORD\"}}");
    }

    #[test]
    fn test_from_config_skips_do_not_mirror_images() {
        let regsync = from_config(&sample_config());

        assert_eq!(regsync.sync.len(), 1);
        let entry = &regsync.sync[0];
        assert_eq!(entry.source, "docker.io/flannel/flannel");
        assert_eq!(entry.target, "docker.io/rancher/mirrored-flannel-flannel");
        assert_eq!(entry.kind, "repository");
        assert_eq!(entry.tags.allow, vec!["v0.24.0", "v0.25.1"]);
    }

    #[test]
    fn test_from_config_is_deterministic() {
        let mut shuffled = sample_config();
        shuffled.images.reverse();
        shuffled.repositories.reverse();

        assert_eq!(from_config(&sample_config()), from_config(&shuffled));
    }

    #[test]
    fn test_write_emits_regsync_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("regsync.yaml");

        write(&path, &from_config(&sample_config())).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("version: 1"));
        assert!(contents.contains("type: repository"));
        assert!(contents.contains("docker.io/rancher/mirrored-flannel-flannel"));
    }
}

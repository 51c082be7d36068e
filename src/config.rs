//! # Registry Schema and Parsing
//!
//! This module defines the data structures that represent the image registry
//! file (`config.yaml`), as well as the logic for parsing and writing it. The
//! registry is the single source of truth for which upstream images are
//! mirrored and under which tags.
//!
//! ## Key Components
//!
//! - **`Config`**: The registry as a whole: a list of images to mirror plus a
//!   list of repository targets that mirrored images are pushed to.
//!
//! - **`Image`**: One upstream image. Identified by its source reference,
//!   its effective target name, and its do-not-mirror flag; the tag list is
//!   the mutable payload that grows over time.
//!
//! - **`Repository`**: A mirror destination, addressed by base URL, with an
//!   environment variable prefix used to template its credentials.
//!
//! ## Stable Output
//!
//! The registry is rewritten by tooling on every change, so `write` produces
//! a canonical form: images sorted by `(SourceImage, TargetImageName)`,
//! repositories sorted by `(BaseUrl, EnvVarPrefix)`, and each image's tag
//! list sorted lexicographically. Parsing accepts any order.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The image registry: every image to mirror and every mirror destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

/// One mirrored image.
///
/// `Image` should not be instantiated directly from struct literals. Use
/// [`Image::new`], or [`Config::parse`] which fills the derived fields after
/// deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Image {
    /// The source image reference without any tag.
    pub source_image: String,

    /// The desired name of the target image when it differs from the derived
    /// default. Access goes through [`Image::target_image_name`] and
    /// [`Image::set_target_image_name`]; the field is only public to the
    /// serializer.
    #[serde(
        rename = "TargetImageName",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    specified_target_image_name: String,

    /// The tags to mirror.
    #[serde(default)]
    pub tags: Vec<String>,

    /// When set, the image stays in the registry but is excluded from the
    /// generated sync configuration.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub do_not_mirror: bool,

    /// Derived from the source reference, never serialized.
    #[serde(skip)]
    default_target_image_name: String,
}

/// A mirror destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Repository {
    pub base_url: String,
    /// Prefix for the environment variables holding this repository's
    /// credentials (`<PREFIX>_USERNAME`, `<PREFIX>_PASSWORD`).
    pub env_var_prefix: String,
    /// Whether the repository should have images mirrored to it.
    #[serde(default)]
    pub target: bool,
}

/// Parse the registry from a YAML file.
///
/// Derived image fields are populated after deserialization; a source image
/// reference with fewer than two path segments is rejected here.
pub fn parse(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)?;

    let mut config: Config = serde_yaml::from_str(&contents).map_err(|e| Error::ConfigParse {
        message: format!("{}: {}", path.display(), e),
        hint: None,
    })?;

    for image in &mut config.images {
        image.set_defaults()?;
    }

    Ok(config)
}

/// Write the registry to a YAML file in canonical sorted form.
pub fn write(path: &Path, config: &Config) -> Result<()> {
    let mut config = config.clone();
    config.sort();

    let contents = serde_yaml::to_string(&config)?;
    fs::write(path, contents)?;

    Ok(())
}

impl Config {
    /// Sort images, repositories, and each image's tag list into the
    /// canonical order used on disk.
    pub fn sort(&mut self) {
        for image in &mut self.images {
            image.sort_tags();
        }
        self.images.sort_by(|a, b| {
            (a.source_image.as_str(), a.target_image_name())
                .cmp(&(b.source_image.as_str(), b.target_image_name()))
        });
        self.repositories.sort_by(|a, b| {
            (a.base_url.as_str(), a.env_var_prefix.as_str())
                .cmp(&(b.base_url.as_str(), b.env_var_prefix.as_str()))
        });
    }
}

impl Image {
    /// Create an image from a source reference and tag list, computing the
    /// derived target name.
    pub fn new(source_image: impl Into<String>, tags: Vec<String>) -> Result<Self> {
        let mut image = Image {
            source_image: source_image.into(),
            tags,
            ..Image::default()
        };
        image.set_defaults()?;
        Ok(image)
    }

    /// Compute the derived target image name from the source reference.
    ///
    /// The default is `mirrored-<repo>-<name>` built from the last two path
    /// segments of the source reference.
    pub(crate) fn set_defaults(&mut self) -> Result<()> {
        let parts: Vec<&str> = self.source_image.split('/').collect();
        if parts.len() < 2 {
            return Err(Error::InvalidImage {
                image: self.source_image.clone(),
                message: format!(
                    "source image split into {} parts (>=2 parts expected)",
                    parts.len()
                ),
            });
        }
        let repo_name = parts[parts.len() - 2];
        let image_name = parts[parts.len() - 1];
        self.default_target_image_name = format!("mirrored-{}-{}", repo_name, image_name);
        Ok(())
    }

    /// The effective target image name: the explicit override when present,
    /// the derived default otherwise.
    pub fn target_image_name(&self) -> &str {
        if !self.specified_target_image_name.is_empty() {
            &self.specified_target_image_name
        } else {
            &self.default_target_image_name
        }
    }

    /// Set the target image name, clearing the override when it matches the
    /// derived default so the registry file stays minimal.
    pub fn set_target_image_name(&mut self, value: &str) {
        if value == self.default_target_image_name {
            self.specified_target_image_name = String::new();
        } else {
            self.specified_target_image_name = value.to_string();
        }
    }

    fn sort_tags(&mut self) {
        self.tags.sort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_registry() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(
            &path,
            r#"
Images:
  - SourceImage: docker.io/flannel/flannel
    Tags:
      - v0.24.0
      - v0.25.1
  - SourceImage: quay.io/skopeo/stable
    TargetImageName: mirrored-skopeo
    Tags:
      - v1.14.0
    DoNotMirror: true
Repositories:
  - BaseUrl: docker.io/rancher
    EnvVarPrefix: DOCKER
    Target: true
"#,
        )
        .unwrap();

        let config = parse(&path).unwrap();
        assert_eq!(config.images.len(), 2);
        assert_eq!(config.images[0].source_image, "docker.io/flannel/flannel");
        assert_eq!(config.images[0].tags, vec!["v0.24.0", "v0.25.1"]);
        assert!(!config.images[0].do_not_mirror);
        assert_eq!(config.images[1].target_image_name(), "mirrored-skopeo");
        assert!(config.images[1].do_not_mirror);
        assert_eq!(config.repositories.len(), 1);
        assert!(config.repositories[0].target);
    }

    #[test]
    fn test_parse_rejects_short_source_image() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(
            &path,
            r#"
Images:
  - SourceImage: busybox
    Tags:
      - latest
"#,
        )
        .unwrap();

        let err = parse(&path).unwrap_err();
        assert!(err.to_string().contains("busybox"));
        assert!(err.to_string().contains(">=2 parts expected"));
    }

    #[test]
    fn test_default_target_image_name() {
        let image = Image::new(
            "registry.k8s.io/coredns/coredns",
            vec!["v1.11.1".to_string()],
        )
        .unwrap();
        assert_eq!(image.target_image_name(), "mirrored-coredns-coredns");
    }

    #[test]
    fn test_set_target_image_name_clears_matching_override() {
        let mut image = Image::new("docker.io/library/nginx", vec![]).unwrap();

        image.set_target_image_name("custom-nginx");
        assert_eq!(image.target_image_name(), "custom-nginx");

        // Setting the derived default removes the override entirely.
        image.set_target_image_name("mirrored-library-nginx");
        assert_eq!(image.target_image_name(), "mirrored-library-nginx");
        assert!(image.specified_target_image_name.is_empty());
    }

    #[test]
    fn test_sort_orders_images_repositories_and_tags() {
        let mut config = Config {
            images: vec![
                Image::new("quay.io/skopeo/stable", vec!["v2".into(), "v1".into()]).unwrap(),
                Image::new("docker.io/flannel/flannel", vec!["v0.2".into()]).unwrap(),
            ],
            repositories: vec![
                Repository {
                    base_url: "quay.io/acme".to_string(),
                    env_var_prefix: "QUAY".to_string(),
                    target: true,
                },
                Repository {
                    base_url: "docker.io/acme".to_string(),
                    env_var_prefix: "DOCKER".to_string(),
                    target: true,
                },
            ],
        };

        config.sort();

        assert_eq!(config.images[0].source_image, "docker.io/flannel/flannel");
        assert_eq!(config.images[1].source_image, "quay.io/skopeo/stable");
        assert_eq!(config.images[1].tags, vec!["v1", "v2"]);
        assert_eq!(config.repositories[0].base_url, "docker.io/acme");
    }

    #[test]
    fn test_write_emits_minimal_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");

        let config = Config {
            images: vec![Image::new("docker.io/library/nginx", vec!["1.27".into()]).unwrap()],
            repositories: vec![],
        };
        write(&path, &config).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("SourceImage: docker.io/library/nginx"));
        // Defaults are not written out.
        assert!(!contents.contains("TargetImageName"));
        assert!(!contents.contains("DoNotMirror"));
    }

    #[test]
    fn test_write_parse_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");

        let mut image = Image::new("quay.io/skopeo/stable", vec!["v1.14.0".into()]).unwrap();
        image.set_target_image_name("mirrored-skopeo");
        image.do_not_mirror = true;
        let config = Config {
            images: vec![image],
            repositories: vec![Repository {
                base_url: "docker.io/rancher".to_string(),
                env_var_prefix: "DOCKER".to_string(),
                target: true,
            }],
        };

        write(&path, &config).unwrap();
        let reparsed = parse(&path).unwrap();

        assert_eq!(reparsed, config);
        assert_eq!(reparsed.images[0].target_image_name(), "mirrored-skopeo");
        assert!(reparsed.images[0].do_not_mirror);
    }
}

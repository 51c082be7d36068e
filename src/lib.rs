//! # Image Mirror Library
//!
//! This library maintains a declarative registry of upstream container
//! images to mirror and automatically proposes registry updates as pull
//! requests when an upstream project publishes a new release tag. It backs
//! the `image-mirror` command-line tool but can be embedded by other
//! automation.
//!
//! ## Quick Example
//!
//! ```
//! use image_mirror::accumulator::ImageAccumulator;
//! use image_mirror::config::Image;
//!
//! // Seed an accumulator with a registry image.
//! let mut accumulator = ImageAccumulator::new();
//! let current = Image::new("docker.io/flannel/flannel", vec!["v0.24.0".into()]).unwrap();
//! accumulator.add_images([current]);
//!
//! // A newly discovered tag merges into the same logical image.
//! let discovered = Image::new("docker.io/flannel/flannel", vec!["v0.25.1".into()]).unwrap();
//! assert!(!accumulator.contains(&discovered));
//! accumulator.add_images([discovered]);
//! assert_eq!(accumulator.images().len(), 1);
//! ```
//!
//! ## Core Concepts
//!
//! - **Registry (`config`)**: the `config.yaml` schema — images to mirror
//!   and the repositories they are mirrored to, written in a canonical
//!   sorted form.
//! - **Accumulator (`accumulator`)**: merges image records by their
//!   `(DoNotMirror, SourceImage, TargetImageName)` identity, unioning tag
//!   sets; the foundation of update detection.
//! - **Autoupdate (`autoupdate`)**: named entries describing how to discover
//!   the latest upstream tag, and the orchestration that turns a discovery
//!   into a branch of per-image commits and a single pull request.
//! - **Derived configuration (`regsync`)**: the sync-tool file regenerated
//!   from the registry on every change.
//! - **Collaborators (`git`, `github`)**: the system git binary and the
//!   GitHub REST API, behind injectable traits at the orchestration seam.
//!
//! ## Execution Flow
//!
//! For each autoupdate entry, `autoupdate::run::run_entry`:
//!
//! 1. Resolves the latest upstream images via the entry's strategy.
//! 2. Diffs them against the registry through a freshly seeded accumulator.
//! 3. Stops early when nothing changed or a proposal already exists.
//! 4. Otherwise commits each addition separately on one branch, pushes it,
//!    and opens one pull request covering all of them.

pub mod accumulator;
pub mod autoupdate;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod output;
pub mod paths;
pub mod regsync;

#[cfg(test)]
mod accumulator_proptest;

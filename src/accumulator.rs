//! # Image Accumulator
//!
//! Merges image records by logical identity and unions their tag sets. Two
//! records describe the same logical image iff they agree on the
//! `(DoNotMirror, SourceImage, TargetImageName)` triple; tags are excluded
//! from identity on purpose, so "same image, new tag" merges into the
//! existing record instead of duplicating it. That property is what lets the
//! autoupdate diff detect exactly the new tags.
//!
//! An accumulator lives for one orchestration run: it is seeded with the
//! full registry, progressively merged with each newly required image, and
//! discarded at the end. Only its serialized snapshot is persisted.

use std::collections::HashMap;

use log::warn;

use crate::config::Image;

/// The identity of a logical image. Tags are deliberately excluded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ImageIndex {
    do_not_mirror: bool,
    source_image: String,
    target_image_name: String,
}

impl ImageIndex {
    fn for_image(image: &Image) -> Self {
        ImageIndex {
            do_not_mirror: image.do_not_mirror,
            source_image: image.source_image.clone(),
            target_image_name: image.target_image_name().to_string(),
        }
    }
}

/// Accumulates image records, merging tag sets under each logical identity.
#[derive(Debug, Default)]
pub struct ImageAccumulator {
    mapping: HashMap<ImageIndex, Image>,
}

impl ImageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge images into the accumulator.
    ///
    /// An image with an unseen identity is inserted as the canonical record
    /// for that identity. An image with a known identity contributes every
    /// tag not already present, appended in first-seen order. Calling this
    /// twice with the same images is a no-op the second time.
    pub fn add_images<I>(&mut self, images: I)
    where
        I: IntoIterator<Item = Image>,
    {
        for new_image in images {
            let index = ImageIndex::for_image(&new_image);
            match self.mapping.get_mut(&index) {
                None => {
                    self.mapping.insert(index, new_image);
                }
                Some(existing) => {
                    for new_tag in new_image.tags {
                        if !existing.tags.contains(&new_tag) {
                            existing.tags.push(new_tag);
                        }
                    }
                }
            }
        }
    }

    /// Whether the accumulator already holds `image` at its first tag.
    ///
    /// `image` is assumed to carry exactly one tag. If it carries more, only
    /// the first is checked and a warning is logged; an image with an
    /// unknown identity, or a known identity without the queried tag, is not
    /// contained.
    pub fn contains(&self, image: &Image) -> bool {
        if image.tags.len() > 1 {
            warn!(
                "image {:?} contains multiple tags: {:?}; only the first is checked",
                image.source_image, image.tags
            );
        }
        let Some(found) = self.mapping.get(&ImageIndex::for_image(image)) else {
            return false;
        };
        image
            .tags
            .first()
            .is_some_and(|tag| found.tags.contains(tag))
    }

    /// A snapshot of every held record. Order is unspecified; callers
    /// needing determinism sort independently.
    pub fn images(&self) -> Vec<Image> {
        self.mapping.values().cloned().collect()
    }
}

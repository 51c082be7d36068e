//! Property-based tests for the image accumulator.
//!
//! These tests use proptest to generate random tag sets and verify that the
//! merge invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::accumulator::ImageAccumulator;
    use crate::config::Image;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn tag_set() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("[a-z0-9.]{1,8}", 0..6)
    }

    fn image_with_tags(tags: Vec<String>) -> Image {
        Image::new("docker.io/acme/widget", tags).unwrap()
    }

    fn sorted_tags(acc: &ImageAccumulator) -> Vec<BTreeSet<String>> {
        let mut images = acc.images();
        images.sort_by(|a, b| a.source_image.cmp(&b.source_image));
        images
            .into_iter()
            .map(|i| i.tags.into_iter().collect())
            .collect()
    }

    proptest! {
        /// Property: adding the same image twice leaves the accumulator
        /// unchanged after the first call.
        #[test]
        fn add_images_is_idempotent(tags in tag_set()) {
            let mut once = ImageAccumulator::new();
            once.add_images([image_with_tags(tags.clone())]);

            let mut twice = ImageAccumulator::new();
            twice.add_images([image_with_tags(tags.clone())]);
            twice.add_images([image_with_tags(tags)]);

            prop_assert_eq!(sorted_tags(&once), sorted_tags(&twice));
        }

        /// Property: merging two images of one identity yields the union of
        /// their tag sets, regardless of insertion order.
        #[test]
        fn merge_is_union_and_order_independent(a in tag_set(), b in tag_set()) {
            let mut forward = ImageAccumulator::new();
            forward.add_images([image_with_tags(a.clone()), image_with_tags(b.clone())]);

            let mut reverse = ImageAccumulator::new();
            reverse.add_images([image_with_tags(b.clone()), image_with_tags(a.clone())]);

            let expected: BTreeSet<String> = a.into_iter().chain(b).collect();
            prop_assert_eq!(sorted_tags(&forward), vec![expected.clone()]);
            prop_assert_eq!(sorted_tags(&reverse), vec![expected]);
        }

        /// Property: a merged record never holds duplicate tags.
        #[test]
        fn merged_tags_are_unique(batches in proptest::collection::vec(tag_set(), 1..5)) {
            let mut acc = ImageAccumulator::new();
            for tags in batches {
                acc.add_images([image_with_tags(tags)]);
            }
            for image in acc.images() {
                let unique: BTreeSet<&String> = image.tags.iter().collect();
                prop_assert_eq!(unique.len(), image.tags.len());
            }
        }

        /// Property: after adding a single-tag image, `contains` finds it.
        #[test]
        fn contains_after_add(tag in "[a-z0-9.]{1,8}") {
            let mut acc = ImageAccumulator::new();
            let img = image_with_tags(vec![tag]);
            acc.add_images([img.clone()]);
            prop_assert!(acc.contains(&img));
        }
    }
}

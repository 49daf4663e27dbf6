//! Property-based tests for path normalization.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{join, normalize_relative};
    use proptest::prelude::*;
    use std::path::{Component, PathBuf};

    proptest! {
        /// Property: a normalized path never escapes its root
        #[test]
        fn normalized_paths_stay_relative(input in "[a-z./\\\\]{0,24}") {
            if let Ok(path) = normalize_relative(&input) {
                prop_assert!(path.is_relative());
                for component in path.components() {
                    prop_assert!(
                        matches!(component, Component::Normal(_)),
                        "unexpected component {:?} in {:?}",
                        component,
                        path
                    );
                }
            }
        }

        /// Property: normalization is idempotent
        #[test]
        fn normalize_is_idempotent(input in "[a-z0-9_.-]{1,8}(/[a-z0-9_.-]{1,8}){0,4}") {
            if let Ok(first) = normalize_relative(&input) {
                let again = normalize_relative(first.to_str().unwrap()).unwrap();
                prop_assert_eq!(first, again);
            }
        }

        /// Property: any path with a parent segment is rejected
        #[test]
        fn parent_segments_are_rejected(
            prefix in "([a-z]{1,6}/){0,3}",
            suffix in "(/[a-z]{1,6}){0,3}",
        ) {
            let input = format!("{}..{}", prefix, suffix);
            prop_assert!(normalize_relative(&input).is_err());
        }

        /// Property: plain names joined under a folder normalize to folder/name
        #[test]
        fn join_then_normalize(folder in "[a-z]{1,6}(/[a-z]{1,6}){0,2}", name in "[a-z]{1,8}\\.[a-z]{1,3}") {
            let joined = join(&folder, &name);
            let normalized = normalize_relative(&joined).unwrap();
            prop_assert_eq!(normalized, PathBuf::from(format!("{}/{}", folder, name)));
        }
    }
}

//! Property-based tests for symlink target normalization

use continuity::manifest::path::{normalize_symlink_target, target_escapes_root};
use proptest::prelude::*;
use std::path::Path;

fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("..".to_string()),
        Just(".".to_string()),
        "[a-z]{1,5}",
    ]
}

fn segments() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment(), 0..8)
}

proptest! {
    /// Absolute targets always normalize to a clean root-relative path
    #[test]
    fn absolute_targets_stay_inside(parts in segments()) {
        let target = format!("/{}", parts.join("/"));
        let normalized = normalize_symlink_target(Path::new("/srv/root"), Path::new(&target)).unwrap();

        prop_assert!(!normalized.starts_with('/'));
        if normalized != "." {
            for component in normalized.split('/') {
                prop_assert!(component != ".." && component != "." && !component.is_empty());
            }
        }
    }

    /// Relative targets are never rewritten
    #[test]
    fn relative_targets_are_verbatim(parts in prop::collection::vec(segment(), 1..8)) {
        let target = parts.join("/");
        let normalized = normalize_symlink_target(Path::new("/srv/root"), Path::new(&target)).unwrap();
        prop_assert_eq!(normalized, target);
    }

    /// A target made only of plain names never escapes, wherever the link is
    #[test]
    fn descending_targets_never_escape(
        link in prop::collection::vec("[a-z]{1,5}", 1..5),
        target in prop::collection::vec("[a-z]{1,5}", 1..5),
    ) {
        prop_assert!(!target_escapes_root(&link.join("/"), &target.join("/")));
    }

    /// Climbing one level more than the link's depth always escapes
    #[test]
    fn over_climbing_targets_escape(link in prop::collection::vec("[a-z]{1,5}", 1..5)) {
        let climb = vec![".."; link.len()].join("/");
        prop_assert!(target_escapes_root(&link.join("/"), &climb));
    }
}

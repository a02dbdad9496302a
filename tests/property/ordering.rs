//! Property-based tests for manifest ordering

use continuity::manifest::identity::StaticIdentities;
use continuity::manifest::DigestAlgorithm;
use continuity::{Manifest, ManifestBuilder};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use tempfile::TempDir;

fn build(root: &Path) -> Manifest {
    let meta = fs::metadata(root).unwrap();
    ManifestBuilder::new(root.to_path_buf())
        .with_identities(
            StaticIdentities::new()
                .with_user(meta.uid(), "u")
                .with_group(meta.gid(), "g"),
        )
        .build()
        .unwrap()
}

/// Relative file paths one or two levels deep. Top-level names carry an `f`
/// prefix and directories a `d` prefix so a file never shadows a directory.
fn layout() -> impl Strategy<Value = BTreeSet<String>> {
    let file = "[a-zA-Z0-9._-]{1,8}".prop_map(|n| format!("f{}", n));
    let nested = ("[a-z]{1,3}", "[a-zA-Z0-9._-]{1,8}").prop_map(|(d, n)| format!("d{}/n{}", d, n));
    prop::collection::btree_set(prop_oneof![file, nested], 0..24)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Entries come out strictly increasing by path bytes, one per file
    #[test]
    fn manifest_paths_are_sorted_and_unique(files in layout()) {
        let temp_dir = TempDir::new().unwrap();
        for name in &files {
            let path = temp_dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, name.as_bytes()).unwrap();
        }

        let manifest = build(temp_dir.path());
        let paths: Vec<&str> = manifest.iter().map(|e| e.path.as_str()).collect();
        prop_assert_eq!(paths.len(), files.len());
        for pair in paths.windows(2) {
            prop_assert!(pair[0].as_bytes() < pair[1].as_bytes());
        }
    }

    /// Creating the same files in reverse order gives the same manifest
    #[test]
    fn creation_order_does_not_matter(files in layout()) {
        let forward = TempDir::new().unwrap();
        let backward = TempDir::new().unwrap();
        for name in files.iter() {
            let path = forward.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, name.as_bytes()).unwrap();
        }
        for name in files.iter().rev() {
            let path = backward.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, name.as_bytes()).unwrap();
        }

        let a = build(forward.path());
        let b = build(backward.path());
        prop_assert_eq!(
            a.digest(DigestAlgorithm::Sha256).unwrap(),
            b.digest(DigestAlgorithm::Sha256).unwrap()
        );
        prop_assert_eq!(a, b);
    }
}

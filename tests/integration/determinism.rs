//! Integration tests for manifest determinism

use super::test_utils::{build, builder};
use continuity::manifest::identity::StaticIdentities;
use continuity::manifest::DigestAlgorithm;
use continuity::ManifestBuilder;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use tempfile::TempDir;

fn populate(root: &Path, names: &[&str]) {
    for name in names {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, name.as_bytes()).unwrap();
    }
}

/// Test that two builds of an unchanged tree are identical
#[test]
fn test_same_tree_same_manifest() {
    let temp_dir = TempDir::new().unwrap();
    populate(temp_dir.path(), &["b", "a/x", "a/y", "c/d/e"]);

    let first = build(temp_dir.path());
    let second = build(temp_dir.path());
    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

/// Test that creation order does not leak into the manifest
#[test]
fn test_creation_order_is_irrelevant() {
    let left = TempDir::new().unwrap();
    let right = TempDir::new().unwrap();
    populate(left.path(), &["z", "m/1", "a", "m/0"]);
    populate(right.path(), &["m/0", "a", "m/1", "z"]);
    fs::hard_link(left.path().join("z"), left.path().join("y")).unwrap();
    fs::hard_link(right.path().join("z"), right.path().join("y")).unwrap();

    // Same identity names for both roots so only layout is compared
    let identities = |root: &Path| {
        let meta = fs::metadata(root).unwrap();
        StaticIdentities::new()
            .with_user(meta.uid(), "u")
            .with_group(meta.gid(), "g")
    };
    let a = ManifestBuilder::new(left.path().to_path_buf())
        .with_identities(identities(left.path()))
        .build()
        .unwrap();
    let b = ManifestBuilder::new(right.path().to_path_buf())
        .with_identities(identities(right.path()))
        .build()
        .unwrap();

    assert_eq!(a, b);
    assert_eq!(
        a.digest(DigestAlgorithm::Sha256).unwrap(),
        b.digest(DigestAlgorithm::Sha256).unwrap()
    );
}

/// Test that a content change is visible in the manifest digest
#[test]
fn test_content_change_changes_manifest_digest() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("f"), "one").unwrap();
    let before = builder(temp_dir.path())
        .build()
        .unwrap()
        .digest(DigestAlgorithm::Blake3)
        .unwrap();

    fs::write(temp_dir.path().join("f"), "two").unwrap();
    let after = builder(temp_dir.path())
        .build()
        .unwrap()
        .digest(DigestAlgorithm::Blake3)
        .unwrap();

    assert_ne!(before, after);
}

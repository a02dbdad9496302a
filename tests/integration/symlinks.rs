//! Integration tests for symbolic link targets

use super::test_utils::{build, builder_with, Fixture};
use continuity::manifest::SymlinkPolicy;
use continuity::{EntryKind, ManifestConfig, ManifestError};
use std::fs;
use std::os::unix::fs::symlink;
use tempfile::TempDir;

#[test]
fn test_relative_target_is_verbatim() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join("lib")).unwrap();
    symlink("../share/./data", root.join("lib/data")).unwrap();

    let manifest = build(root);
    assert_eq!(manifest.get("lib/data").unwrap().target(), Some("../share/./data"));
}

#[test]
fn test_absolute_target_under_root_loses_prefix() {
    let fixture = Fixture::new();
    let root = fixture.root();
    fs::create_dir(root.join("bin")).unwrap();
    fs::write(root.join("bin/tool"), "x").unwrap();
    symlink(root.join("bin/tool"), root.join("tool")).unwrap();
    symlink(&root, root.join("self")).unwrap();

    let manifest = build(&root);
    assert_eq!(manifest.get("tool").unwrap().target(), Some("bin/tool"));
    assert_eq!(manifest.get("self").unwrap().target(), Some("."));
}

#[test]
fn test_absolute_target_elsewhere_is_anchored_at_root() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    symlink("/usr/lib/../lib64/libc.so.6", root.join("libc")).unwrap();

    let manifest = build(root);
    assert_eq!(manifest.get("libc").unwrap().target(), Some("usr/lib64/libc.so.6"));
}

#[test]
fn test_dangling_and_directory_links_are_not_followed() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join("dir")).unwrap();
    fs::write(root.join("dir/inner"), "x").unwrap();
    symlink("dir", root.join("dir-link")).unwrap();
    symlink("nowhere", root.join("dangling")).unwrap();

    let manifest = build(root);
    let paths: Vec<_> = manifest.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["dangling", "dir-link", "dir/inner"]);
    assert!(matches!(
        manifest.get("dir-link").unwrap().kind,
        EntryKind::Symlink { .. }
    ));
    assert_eq!(manifest.get("dangling").unwrap().target(), Some("nowhere"));
}

#[test]
fn test_escaping_link_policies() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    symlink("../../etc/shadow", root.join("escape")).unwrap();

    for policy in [SymlinkPolicy::Keep, SymlinkPolicy::Warn] {
        let config = ManifestConfig {
            symlink_policy: policy,
            ..ManifestConfig::default()
        };
        let manifest = builder_with(root, config).build().unwrap();
        assert_eq!(manifest.get("escape").unwrap().target(), Some("../../etc/shadow"));
    }

    let config = ManifestConfig {
        symlink_policy: SymlinkPolicy::Reject,
        ..ManifestConfig::default()
    };
    let result = builder_with(root, config).build();
    assert!(matches!(result, Err(ManifestError::SymlinkEscapesRoot { .. })));
}

//! Integration tests for build failures: any error aborts the whole build

use super::test_utils::{build, builder, identities_for, running_as_root};
use continuity::manifest::identity::StaticIdentities;
use continuity::{ManifestBuilder, ManifestError};
use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use tempfile::TempDir;

#[test]
fn test_unreadable_file_aborts_build() {
    if running_as_root() {
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let secret = temp_dir.path().join("secret");
    fs::write(&secret, "x").unwrap();
    fs::write(temp_dir.path().join("public"), "x").unwrap();
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

    let result = builder(temp_dir.path()).build();
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o600)).unwrap();

    assert!(matches!(result, Err(ManifestError::Digest { .. })));
}

#[test]
fn test_unreadable_directory_aborts_build() {
    if running_as_root() {
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let locked = temp_dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("inside"), "x").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let result = builder(temp_dir.path()).build();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o700)).unwrap();

    assert!(matches!(result, Err(ManifestError::Walk { .. })));
}

#[test]
fn test_unknown_owner_aborts_build() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("f"), "x").unwrap();
    let meta = fs::metadata(temp_dir.path()).unwrap();

    let result = ManifestBuilder::new(temp_dir.path().to_path_buf())
        .with_identities(StaticIdentities::new().with_group(meta.gid(), "g"))
        .build();
    assert!(matches!(result, Err(ManifestError::UnknownUser(uid)) if uid == meta.uid()));
}

#[test]
fn test_filtered_nodes_never_reach_the_build() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("kept"), "x").unwrap();
    let secret = temp_dir.path().join("skipped");
    fs::write(&secret, "x").unwrap();
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

    // An unreadable file that is filtered out cannot fail the build
    let manifest = ManifestBuilder::new(temp_dir.path().to_path_buf())
        .with_identities(identities_for(temp_dir.path()))
        .with_filter(|path: &str, _: &continuity::manifest::entry::RawStat| path != "skipped")
        .build();
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o600)).unwrap();

    assert_eq!(manifest.unwrap().len(), 1);
    assert_eq!(build(temp_dir.path()).len(), 2);
}

#[test]
fn test_filtered_non_utf8_name_never_fails_the_build() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(OsStr::from_bytes(b"bad\xff")), "x").unwrap();
    fs::write(temp_dir.path().join("ok"), "x").unwrap();

    let manifest = builder(temp_dir.path())
        .with_filter(|path: &str, _: &continuity::manifest::entry::RawStat| path == "ok")
        .build()
        .unwrap();
    assert_eq!(manifest.len(), 1);
    assert!(manifest.get("ok").is_some());

    let unfiltered = builder(temp_dir.path()).build();
    assert!(matches!(unfiltered, Err(ManifestError::NonUtf8Path(_))));
}

#[test]
fn test_canonical_member_vanishing_before_resolution_aborts_build() {
    let temp_dir = TempDir::new().unwrap();
    let canonical = temp_dir.path().join("a");
    fs::write(&canonical, "x").unwrap();
    fs::hard_link(&canonical, temp_dir.path().join("b")).unwrap();

    // Both members are deferred during the walk; "a" is gone by the time the
    // group is resolved and its content is read
    let result = builder(temp_dir.path())
        .with_filter(
            move |path: &str, _: &continuity::manifest::entry::RawStat| {
                if path == "b" {
                    let _ = fs::remove_file(&canonical);
                }
                true
            },
        )
        .build();

    match result {
        Err(ManifestError::Digest { path, .. }) => assert!(path.ends_with("a")),
        other => panic!("expected digest error, got {:?}", other),
    }
}

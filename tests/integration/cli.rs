//! Integration tests for the continuity binary

use continuity::Manifest;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Config pointing at a private group file that names the fixture's gid.
/// Returns None when the host has no passwd entry for the fixture's uid.
fn write_config(temp: &Path) -> Option<PathBuf> {
    let meta = fs::metadata(temp).unwrap();
    nix::unistd::User::from_uid(nix::unistd::Uid::from_raw(meta.uid())).ok().flatten()?;

    let group_file = temp.join("group");
    fs::write(&group_file, format!("fixture:x:{}:\n", meta.gid())).unwrap();
    let config = temp.join("continuity.toml");
    fs::write(
        &config,
        format!("[manifest]\ngroup_file = {:?}\n", group_file.to_str().unwrap()),
    )
    .unwrap();
    Some(config)
}

fn continuity(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_continuity"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("CONTINUITY_LOG")
        .output()
        .unwrap()
}

fn fixture() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("tree");
    fs::create_dir_all(root.join("etc")).unwrap();
    fs::write(root.join("etc/hosts"), "127.0.0.1 localhost\n").unwrap();
    std::os::unix::fs::symlink("hosts", root.join("etc/hosts.link")).unwrap();
    (temp, root)
}

#[test]
fn test_build_prints_json_manifest() {
    let (temp, root) = fixture();
    let Some(config) = write_config(temp.path()) else {
        return;
    };

    let output = continuity(&config, &["build", root.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let manifest = Manifest::from_json(&String::from_utf8(output.stdout).unwrap()).unwrap();
    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest.get("etc/hosts").unwrap().owner.group, "fixture");
    assert_eq!(manifest.get("etc/hosts.link").unwrap().target(), Some("hosts"));
}

#[test]
fn test_build_to_toml_file_then_check() {
    let (temp, root) = fixture();
    let Some(config) = write_config(temp.path()) else {
        return;
    };
    let out_file = temp.path().join("out/manifest.toml");

    let output = continuity(
        &config,
        &[
            "build",
            root.to_str().unwrap(),
            "--format",
            "toml",
            "--output",
            out_file.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(Manifest::from_toml(&fs::read_to_string(&out_file).unwrap()).is_ok());

    let output = continuity(&config, &["check", out_file.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Entries: 2"));
    assert!(stdout.contains("symlinks: 1"));
}

#[test]
fn test_digest_command_is_stable() {
    let (temp, root) = fixture();
    let Some(config) = write_config(temp.path()) else {
        return;
    };
    let args = ["digest", root.to_str().unwrap(), "--algorithm", "blake3"];

    let first = continuity(&config, &args);
    let second = continuity(&config, &args);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert!(String::from_utf8_lossy(&first.stdout).starts_with("blake3:"));
}

#[test]
fn test_check_rejects_unsorted_manifest() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("continuity.toml");
    fs::write(&config, "").unwrap();
    let manifest = temp.path().join("bad.json");
    fs::write(
        &manifest,
        r#"{"entry":[
            {"path":"b","mode":4516,"user":"root","uid":0,"group":"root","gid":0},
            {"path":"a","mode":4516,"user":"root","uid":0,"group":"root","gid":0}
        ]}"#,
    )
    .unwrap();

    let output = continuity(&config, &["check", manifest.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not sorted"));
}

#[test]
fn test_missing_root_exits_with_error() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("continuity.toml");
    fs::write(&config, "").unwrap();

    let output = continuity(&config, &["build", temp.path().join("absent").to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_check_rejects_dangling_hard_link() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("continuity.toml");
    fs::write(&config, "").unwrap();
    let manifest = temp.path().join("links.json");
    fs::write(
        &manifest,
        r#"{"entry":[
            {"path":"a","mode":33188,"user":"root","uid":0,"group":"root","gid":0,"target":"missing"}
        ]}"#,
    )
    .unwrap();

    let output = continuity(&config, &["check", manifest.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("hard link target"));
}

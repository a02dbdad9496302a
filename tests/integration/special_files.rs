//! Integration tests for pipes, sockets and other non-regular files

use super::test_utils::{build, builder, paths};
use continuity::EntryKind;
use nix::sys::stat::Mode;
use std::fs;
use std::os::unix::net::UnixListener;
use tempfile::TempDir;

#[test]
fn test_named_pipe_entry() {
    let temp_dir = TempDir::new().unwrap();
    let fifo = temp_dir.path().join("pipe");
    nix::unistd::mkfifo(&fifo, Mode::from_bits_truncate(0o600)).unwrap();

    let manifest = build(temp_dir.path());
    let entry = manifest.get("pipe").unwrap();
    assert_eq!(entry.kind, EntryKind::NamedPipe);
    assert_eq!(entry.mode() & 0o170000, 0o010000);
    assert!(entry.digest().is_none());
}

#[test]
fn test_sockets_are_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let _listener = UnixListener::bind(temp_dir.path().join("sock")).unwrap();
    fs::write(temp_dir.path().join("file"), "x").unwrap();

    let (manifest, stats) = builder(temp_dir.path()).build_with_stats().unwrap();
    assert_eq!(paths(&manifest), vec!["file"]);
    assert_eq!(stats.sockets, 1);
}

#[test]
fn test_host_character_device() {
    // /dev/null is 1:3 on Linux; only checked when the host exposes it
    let dev = std::path::Path::new("/dev");
    if !dev.join("null").exists() {
        return;
    }
    let manifest = builder(dev)
        .with_filter(|path: &str, _: &continuity::manifest::entry::RawStat| path == "null")
        .build();
    let manifest = match manifest {
        Ok(manifest) => manifest,
        // /dev ownership may not match the fixture identities
        Err(_) => return,
    };
    if let Some(entry) = manifest.get("null") {
        assert!(matches!(entry.kind, EntryKind::CharDevice { .. }));
        #[cfg(target_os = "linux")]
        assert_eq!(entry.device(), Some((1, 3)));
    }
}

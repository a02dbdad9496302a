//! CLI presentation: text summaries for digest and check.

use crate::manifest::{Digest, EntryKind, Manifest};
use std::collections::BTreeMap;

pub fn format_digest_summary(digest: &Digest, manifest: &Manifest) -> String {
    format!("{}  ({} entries)", digest, manifest.len())
}

/// One line per entry kind present, in a fixed order
pub fn format_check_summary(manifest: &Manifest) -> String {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for entry in manifest {
        *counts.entry(kind_label(&entry.kind)).or_default() += 1;
    }

    let mut s = format!("Manifest is valid:\n  Entries: {}", manifest.len());
    for (label, count) in counts {
        s.push_str(&format!("\n  {}: {}", label, count));
    }
    s
}

fn kind_label(kind: &EntryKind) -> &'static str {
    match kind {
        EntryKind::File { .. } => "files",
        EntryKind::HardLink { .. } => "hard links",
        EntryKind::Symlink { .. } => "symlinks",
        EntryKind::NamedPipe => "named pipes",
        EntryKind::CharDevice { .. } => "char devices",
        EntryKind::BlockDevice { .. } => "block devices",
    }
}

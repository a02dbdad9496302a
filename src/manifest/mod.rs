//! Filesystem manifests
//!
//! A manifest lists every object under a root with its type, permissions,
//! ownership and, for regular files, a content digest. Entries are sorted by
//! path, so two builds of identical trees produce identical manifests no
//! matter how the filesystem enumerates them.

pub mod assembler;
pub mod builder;
pub mod classify;
pub mod device;
pub mod entry;
pub mod filter;
pub mod hardlink;
pub mod hasher;
pub mod identity;
pub mod path;
pub mod walker;

pub use builder::{BuildStats, ManifestBuilder, ManifestConfig};
pub use classify::SymlinkPolicy;
pub use entry::{Entry, EntryKind, Ownership};
pub use hasher::{Digest, DigestAlgorithm};

use crate::error::ManifestError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ordered, immutable list of entries with unique paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ManifestRecord", into = "ManifestRecord")]
pub struct Manifest {
    entries: Vec<Entry>,
}

#[derive(Serialize, Deserialize)]
struct ManifestRecord {
    #[serde(default, rename = "entry")]
    entries: Vec<Entry>,
}

impl TryFrom<ManifestRecord> for Manifest {
    type Error = ManifestError;

    fn try_from(record: ManifestRecord) -> Result<Self, Self::Error> {
        Manifest::from_entries(record.entries)
    }
}

impl From<Manifest> for ManifestRecord {
    fn from(manifest: Manifest) -> Self {
        ManifestRecord {
            entries: manifest.entries,
        }
    }
}

impl Manifest {
    /// Callers guarantee order and uniqueness
    pub(crate) fn from_sorted(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Wrap entries that must already be sorted by path with no duplicates
    pub fn from_entries(entries: Vec<Entry>) -> Result<Self, ManifestError> {
        for pair in entries.windows(2) {
            match pair[0].path.as_bytes().cmp(pair[1].path.as_bytes()) {
                std::cmp::Ordering::Less => {}
                std::cmp::Ordering::Equal => {
                    return Err(ManifestError::DuplicatePath(pair[1].path.clone()))
                }
                std::cmp::Ordering::Greater => {
                    return Err(ManifestError::Unsorted(pair[1].path.clone()))
                }
            }
        }
        let manifest = Self { entries };
        manifest.check_hard_links()?;
        Ok(manifest)
    }

    /// Every hard link must name a digest-bearing file that sorts before it
    fn check_hard_links(&self) -> Result<(), ManifestError> {
        for entry in &self.entries {
            let EntryKind::HardLink { target } = &entry.kind else {
                continue;
            };
            let invalid = |reason: &str| ManifestError::InvalidEntry {
                path: entry.path.clone(),
                reason: reason.to_string(),
            };
            if target.as_bytes() >= entry.path.as_bytes() {
                return Err(invalid("hard link target must sort before the link"));
            }
            match self.get(target).map(|canonical| &canonical.kind) {
                Some(EntryKind::File { .. }) => {}
                Some(_) => return Err(invalid("hard link target is not a regular file")),
                None => return Err(invalid("hard link target is missing")),
            }
        }
        Ok(())
    }

    /// Build a manifest of `root` with default options
    pub fn build(root: impl Into<PathBuf>) -> Result<Self, ManifestError> {
        ManifestBuilder::new(root.into()).build()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by manifest path
    pub fn get(&self, path: &str) -> Option<&Entry> {
        self.entries
            .binary_search_by(|e| e.path.as_bytes().cmp(path.as_bytes()))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn to_json(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self).map_err(|e| ManifestError::Serialization(e.to_string()))
    }

    pub fn from_json(s: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(s).map_err(|e| ManifestError::Serialization(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String, ManifestError> {
        toml::to_string(self).map_err(|e| ManifestError::Serialization(e.to_string()))
    }

    pub fn from_toml(s: &str) -> Result<Self, ManifestError> {
        toml::from_str(s).map_err(|e| ManifestError::Serialization(e.to_string()))
    }

    /// Digest of the manifest itself, over its compact JSON encoding
    pub fn digest(&self, algorithm: DigestAlgorithm) -> Result<Digest, ManifestError> {
        let bytes =
            serde_json::to_vec(self).map_err(|e| ManifestError::Serialization(e.to_string()))?;
        Ok(hasher::compute_digest(algorithm, &bytes))
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

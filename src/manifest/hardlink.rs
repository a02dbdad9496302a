//! Hard-link group resolution
//!
//! Multi-linked regular files are parked by (device, inode) during the walk.
//! Once the walk is done each group elects the member with the smallest path
//! as canonical: it alone is digested and carries the digest, every other
//! member becomes a link to it. The election depends only on the paths, so the
//! result does not depend on walk order.

use crate::error::ManifestError;
use crate::manifest::entry::{Entry, EntryKind, Ownership};
use crate::manifest::hasher::{self, DigestAlgorithm};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, instrument};

/// Identity of the underlying file shared by all aliases
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HardLinkKey {
    pub dev: u64,
    pub ino: u64,
}

/// A classified hard-link alias waiting for its group to be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLink {
    pub path: String,
    pub permissions: u32,
    pub owner: Ownership,
}

/// Accumulated hard-link groups for one build
#[derive(Debug, Default)]
pub struct HardLinkGroups {
    groups: BTreeMap<HardLinkKey, Vec<PendingLink>>,
}

impl HardLinkGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defer(&mut self, key: HardLinkKey, member: PendingLink) {
        self.groups.entry(key).or_default().push(member);
    }

    /// Insert a group directly, possibly empty. Used to exercise the
    /// invariant checks.
    #[cfg(test)]
    pub(crate) fn insert_group(&mut self, key: HardLinkKey, members: Vec<PendingLink>) {
        self.groups.insert(key, members);
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn member_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Resolve every group into finalized entries.
    ///
    /// `root` is the absolute build root the member paths are relative to.
    /// With `strict` set, a group holding a single member is an error instead
    /// of being emitted as a plain file.
    #[instrument(skip(self, root), fields(groups = self.groups.len()))]
    pub fn resolve(
        self,
        root: &Path,
        algorithm: DigestAlgorithm,
        strict: bool,
    ) -> Result<Vec<Entry>, ManifestError> {
        let mut resolved = Vec::with_capacity(self.member_count());

        for (key, mut members) in self.groups {
            members.sort_by(|a, b| a.path.as_bytes().cmp(b.path.as_bytes()));
            let mut members = members.into_iter();
            let canonical = match members.next() {
                Some(canonical) => canonical,
                None => {
                    return Err(ManifestError::EmptyHardLinkGroup {
                        dev: key.dev,
                        ino: key.ino,
                    })
                }
            };

            if members.len() == 0 {
                if strict {
                    return Err(ManifestError::SingletonHardLinkGroup {
                        dev: key.dev,
                        ino: key.ino,
                        path: canonical.path,
                    });
                }
                debug!(path = %canonical.path, "Hard link has no other alias under the root");
            }

            let digest = hasher::digest_file(algorithm, &root.join(&canonical.path))?;
            debug!(
                canonical = %canonical.path,
                aliases = members.len(),
                "Resolved hard-link group"
            );

            for link in members {
                resolved.push(Entry {
                    path: link.path,
                    permissions: link.permissions,
                    owner: link.owner,
                    kind: EntryKind::HardLink {
                        target: canonical.path.clone(),
                    },
                });
            }
            resolved.push(Entry {
                path: canonical.path,
                permissions: canonical.permissions,
                owner: canonical.owner,
                kind: EntryKind::File {
                    digest: vec![digest],
                },
            });
        }

        Ok(resolved)
    }
}

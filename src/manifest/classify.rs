//! Entry classification
//!
//! Turns one walked node into an entry, a deferred hard-link member, or
//! nothing.

use crate::error::ManifestError;
use crate::manifest::device::split_device;
use crate::manifest::entry::{Entry, EntryKind, FileKind};
use crate::manifest::hardlink::{HardLinkKey, PendingLink};
use crate::manifest::hasher::{self, DigestAlgorithm};
use crate::manifest::identity::IdentityResolver;
use crate::manifest::path;
use crate::manifest::walker::Node;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{trace, warn};

/// What to do with relative symlink targets that climb above the root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymlinkPolicy {
    /// Record the target as-is
    #[default]
    Keep,
    /// Record the target and log a warning
    Warn,
    /// Fail the build
    Reject,
}

impl std::str::FromStr for SymlinkPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep" => Ok(SymlinkPolicy::Keep),
            "warn" => Ok(SymlinkPolicy::Warn),
            "reject" => Ok(SymlinkPolicy::Reject),
            other => Err(format!(
                "unknown symlink policy '{}' (expected 'keep', 'warn' or 'reject')",
                other
            )),
        }
    }
}

/// Why a node produced no entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Directory,
    Socket,
    UnknownType,
}

/// Result of classifying one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Entry(Entry),
    Deferred { key: HardLinkKey, member: PendingLink },
    Skipped(SkipReason),
}

/// Per-build state shared by every classification step
pub struct Classifier<'a> {
    root: &'a Path,
    identities: &'a IdentityResolver<'a>,
    algorithm: DigestAlgorithm,
    symlink_policy: SymlinkPolicy,
}

impl<'a> Classifier<'a> {
    pub fn new(
        root: &'a Path,
        identities: &'a IdentityResolver<'a>,
        algorithm: DigestAlgorithm,
        symlink_policy: SymlinkPolicy,
    ) -> Self {
        Self {
            root,
            identities,
            algorithm,
            symlink_policy,
        }
    }

    pub fn classify(&self, node: &Node) -> Result<Classified, ManifestError> {
        let stat = &node.stat;
        let owner = self.identities.resolve(stat.uid, stat.gid)?;

        let file_kind = match stat.kind() {
            Some(kind) => kind,
            None => {
                warn!(path = %node.relative, mode = stat.mode, "Unknown file type, skipping");
                return Ok(Classified::Skipped(SkipReason::UnknownType));
            }
        };

        let kind = match file_kind {
            FileKind::Regular if stat.nlink >= 2 => {
                trace!(path = %node.relative, nlink = stat.nlink, "Deferring hard link");
                return Ok(Classified::Deferred {
                    key: HardLinkKey {
                        dev: stat.dev,
                        ino: stat.ino,
                    },
                    member: PendingLink {
                        path: node.relative.clone(),
                        permissions: stat.permissions(),
                        owner,
                    },
                });
            }
            FileKind::Regular => {
                let digest = hasher::digest_file(self.algorithm, &node.path)?;
                EntryKind::File {
                    digest: vec![digest],
                }
            }
            FileKind::Symlink => EntryKind::Symlink {
                target: self.symlink_target(node)?,
            },
            FileKind::NamedPipe => EntryKind::NamedPipe,
            FileKind::CharDevice => {
                let (major, minor) = split_device(stat.rdev);
                EntryKind::CharDevice { major, minor }
            }
            FileKind::BlockDevice => {
                let (major, minor) = split_device(stat.rdev);
                EntryKind::BlockDevice { major, minor }
            }
            FileKind::Socket => {
                trace!(path = %node.relative, "Skipping socket");
                return Ok(Classified::Skipped(SkipReason::Socket));
            }
            FileKind::Directory => return Ok(Classified::Skipped(SkipReason::Directory)),
        };

        Ok(Classified::Entry(Entry {
            path: node.relative.clone(),
            permissions: stat.permissions(),
            owner,
            kind,
        }))
    }

    fn symlink_target(&self, node: &Node) -> Result<String, ManifestError> {
        let raw = std::fs::read_link(&node.path).map_err(|source| ManifestError::ReadLink {
            path: node.path.clone(),
            source,
        })?;
        let target = path::normalize_symlink_target(self.root, &raw)?;

        if path::target_escapes_root(&node.relative, &target) {
            match self.symlink_policy {
                SymlinkPolicy::Keep => {}
                SymlinkPolicy::Warn => {
                    warn!(path = %node.relative, target = %target, "Symlink points outside the root")
                }
                SymlinkPolicy::Reject => {
                    return Err(ManifestError::SymlinkEscapesRoot {
                        path: node.relative.clone(),
                        target,
                    })
                }
            }
        }
        Ok(target)
    }
}

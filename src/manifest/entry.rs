//! Manifest entries
//!
//! An [`Entry`] carries the fields every filesystem object has (path,
//! permissions, ownership) plus an [`EntryKind`] holding the fields that only
//! some kinds use. On the wire an entry is the flat [`EntryRecord`]; decoding
//! rejects records whose optional fields do not match their mode.

use crate::error::ManifestError;
use crate::manifest::hasher::Digest;
use serde::{Deserialize, Serialize};
use std::fs::Metadata;

pub const S_IFMT: u32 = 0o170_000;
pub const S_IFSOCK: u32 = 0o140_000;
pub const S_IFLNK: u32 = 0o120_000;
pub const S_IFREG: u32 = 0o100_000;
pub const S_IFBLK: u32 = 0o060_000;
pub const S_IFDIR: u32 = 0o040_000;
pub const S_IFCHR: u32 = 0o020_000;
pub const S_IFIFO: u32 = 0o010_000;

/// Permission bits, including setuid, setgid and sticky
pub const PERMISSION_MASK: u32 = 0o7777;

/// File type decoded from the `st_mode` type bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Regular,
    Directory,
    Symlink,
    NamedPipe,
    CharDevice,
    BlockDevice,
    Socket,
}

impl FileKind {
    /// Decode the type bits of a raw mode, `None` for unknown types
    pub fn from_mode(mode: u32) -> Option<Self> {
        match mode & S_IFMT {
            S_IFREG => Some(FileKind::Regular),
            S_IFDIR => Some(FileKind::Directory),
            S_IFLNK => Some(FileKind::Symlink),
            S_IFIFO => Some(FileKind::NamedPipe),
            S_IFCHR => Some(FileKind::CharDevice),
            S_IFBLK => Some(FileKind::BlockDevice),
            S_IFSOCK => Some(FileKind::Socket),
            _ => None,
        }
    }

    pub fn type_bits(&self) -> u32 {
        match self {
            FileKind::Regular => S_IFREG,
            FileKind::Directory => S_IFDIR,
            FileKind::Symlink => S_IFLNK,
            FileKind::NamedPipe => S_IFIFO,
            FileKind::CharDevice => S_IFCHR,
            FileKind::BlockDevice => S_IFBLK,
            FileKind::Socket => S_IFSOCK,
        }
    }
}

/// The subset of `lstat` results the classifier consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawStat {
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub nlink: u64,
    pub dev: u64,
    pub ino: u64,
    pub rdev: u64,
}

impl RawStat {
    pub fn from_metadata(metadata: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;

        Self {
            mode: metadata.mode(),
            uid: metadata.uid(),
            gid: metadata.gid(),
            nlink: metadata.nlink(),
            dev: metadata.dev(),
            ino: metadata.ino(),
            rdev: metadata.rdev(),
        }
    }

    pub fn kind(&self) -> Option<FileKind> {
        FileKind::from_mode(self.mode)
    }

    pub fn permissions(&self) -> u32 {
        self.mode & PERMISSION_MASK
    }
}

/// Resolved ownership, with the numeric ids kept alongside the names
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ownership {
    pub user: String,
    pub uid: u32,
    pub group: String,
    pub gid: u32,
}

/// Kind-specific entry data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file content, including the canonical member of a hard-link group
    File { digest: Vec<Digest> },
    /// Non-canonical hard-link member; `target` is the canonical member's path
    HardLink { target: String },
    Symlink { target: String },
    NamedPipe,
    CharDevice { major: u32, minor: u32 },
    BlockDevice { major: u32, minor: u32 },
}

impl EntryKind {
    pub fn file_kind(&self) -> FileKind {
        match self {
            EntryKind::File { .. } | EntryKind::HardLink { .. } => FileKind::Regular,
            EntryKind::Symlink { .. } => FileKind::Symlink,
            EntryKind::NamedPipe => FileKind::NamedPipe,
            EntryKind::CharDevice { .. } => FileKind::CharDevice,
            EntryKind::BlockDevice { .. } => FileKind::BlockDevice,
        }
    }
}

/// One filesystem object in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "EntryRecord", try_from = "EntryRecord")]
pub struct Entry {
    pub path: String,
    /// Permission bits only; the type bits come from `kind`
    pub permissions: u32,
    pub owner: Ownership,
    pub kind: EntryKind,
}

impl Entry {
    /// Full `st_mode`: type bits plus permission bits
    pub fn mode(&self) -> u32 {
        self.kind.file_kind().type_bits() | (self.permissions & PERMISSION_MASK)
    }

    pub fn digest(&self) -> Option<&[Digest]> {
        match &self.kind {
            EntryKind::File { digest } => Some(digest),
            _ => None,
        }
    }

    /// Symlink target or canonical hard-link path
    pub fn target(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::HardLink { target } | EntryKind::Symlink { target } => Some(target),
            _ => None,
        }
    }

    pub fn device(&self) -> Option<(u32, u32)> {
        match self.kind {
            EntryKind::CharDevice { major, minor } | EntryKind::BlockDevice { major, minor } => {
                Some((major, minor))
            }
            _ => None,
        }
    }
}

/// Flat wire representation of an [`Entry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub path: String,
    pub mode: u32,
    pub user: String,
    pub uid: u32,
    pub group: String,
    pub gid: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub digest: Vec<Digest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor: Option<u32>,
}

impl From<Entry> for EntryRecord {
    fn from(entry: Entry) -> Self {
        let mode = entry.mode();
        let mut record = EntryRecord {
            path: entry.path,
            mode,
            user: entry.owner.user,
            uid: entry.owner.uid,
            group: entry.owner.group,
            gid: entry.owner.gid,
            digest: Vec::new(),
            target: None,
            major: None,
            minor: None,
        };
        match entry.kind {
            EntryKind::File { digest } => record.digest = digest,
            EntryKind::HardLink { target } | EntryKind::Symlink { target } => {
                record.target = Some(target)
            }
            EntryKind::NamedPipe => {}
            EntryKind::CharDevice { major, minor } | EntryKind::BlockDevice { major, minor } => {
                record.major = Some(major);
                record.minor = Some(minor);
            }
        }
        record
    }
}

impl TryFrom<EntryRecord> for Entry {
    type Error = ManifestError;

    fn try_from(record: EntryRecord) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| ManifestError::InvalidEntry {
            path: record.path.clone(),
            reason: reason.to_string(),
        };

        if record.path.is_empty()
            || record.path.starts_with('/')
            || record
                .path
                .split('/')
                .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(invalid("path is not a normalized root-relative path"));
        }

        let has_device = record.major.is_some() || record.minor.is_some();
        let kind = match FileKind::from_mode(record.mode) {
            Some(FileKind::Regular) => {
                if has_device {
                    return Err(invalid("regular file with device numbers"));
                }
                match (record.digest.is_empty(), record.target.clone()) {
                    (false, None) => EntryKind::File {
                        digest: record.digest.clone(),
                    },
                    (true, Some(target)) => EntryKind::HardLink { target },
                    (false, Some(_)) => return Err(invalid("both digest and target set")),
                    (true, None) => return Err(invalid("regular file without digest or target")),
                }
            }
            Some(FileKind::Symlink) => {
                if has_device || !record.digest.is_empty() {
                    return Err(invalid("symlink with digest or device numbers"));
                }
                let target = record
                    .target
                    .clone()
                    .ok_or_else(|| invalid("symlink without target"))?;
                EntryKind::Symlink { target }
            }
            Some(FileKind::NamedPipe) => {
                if has_device || !record.digest.is_empty() || record.target.is_some() {
                    return Err(invalid("named pipe with extra fields"));
                }
                EntryKind::NamedPipe
            }
            Some(kind @ (FileKind::CharDevice | FileKind::BlockDevice)) => {
                if !record.digest.is_empty() || record.target.is_some() {
                    return Err(invalid("device with digest or target"));
                }
                let (major, minor) = match (record.major, record.minor) {
                    (Some(major), Some(minor)) => (major, minor),
                    _ => return Err(invalid("device without major/minor")),
                };
                if kind == FileKind::CharDevice {
                    EntryKind::CharDevice { major, minor }
                } else {
                    EntryKind::BlockDevice { major, minor }
                }
            }
            Some(FileKind::Directory) => return Err(invalid("directories are not manifest entries")),
            Some(FileKind::Socket) => return Err(invalid("sockets are not manifest entries")),
            None => return Err(invalid("unknown file type in mode")),
        };

        Ok(Entry {
            path: record.path,
            permissions: record.mode & PERMISSION_MASK,
            owner: Ownership {
                user: record.user,
                uid: record.uid,
                group: record.group,
                gid: record.gid,
            },
            kind,
        })
    }
}

//! Error types for the continuity manifest builder.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or decoding a manifest.
///
/// Every variant is fatal to the build that raised it: no partial manifest is
/// ever returned.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to walk {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read metadata for {path:?}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No user name for uid {0}")]
    UnknownUser(u32),

    #[error("No group name for gid {0}")]
    UnknownGroup(u32),

    #[error("User lookup for uid {uid} failed: {source}")]
    UserLookup {
        uid: u32,
        #[source]
        source: nix::Error,
    },

    #[error("Failed to read group database {path:?}: {source}")]
    GroupDatabase {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to digest {path:?}: {source}")]
    Digest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read symlink {path:?}: {source}")]
    ReadLink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path {path:?} is not under root {root:?}")]
    OutsideRoot { root: PathBuf, path: PathBuf },

    #[error("Path is not valid UTF-8: {0:?}")]
    NonUtf8Path(PathBuf),

    #[error("Symlink {path} points outside the root: {target}")]
    SymlinkEscapesRoot { path: String, target: String },

    #[error("Invalid entry {path}: {reason}")]
    InvalidEntry { path: String, reason: String },

    #[error("Invalid digest string: {0}")]
    InvalidDigest(String),

    #[error("Manifest is not sorted by path at {0}")]
    Unsorted(String),

    #[error("Duplicate manifest path: {0}")]
    DuplicatePath(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: no hard-link members for device {dev}, inode {ino}")]
    EmptyHardLinkGroup { dev: u64, ino: u64 },

    #[error("Internal error: hard-link group for device {dev}, inode {ino} has a single member {path}")]
    SingletonHardLinkGroup { dev: u64, ino: u64, path: String },
}

impl ManifestError {
    /// True for invariant violations inside the builder itself, as opposed to
    /// failures of the environment (I/O, identity database, bad input).
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ManifestError::EmptyHardLinkGroup { .. } | ManifestError::SingletonHardLinkGroup { .. }
        )
    }
}

/// Errors surfaced by the configuration, logging and CLI layers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

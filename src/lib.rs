//! Continuity: Deterministic Filesystem Manifests
//!
//! Describes every object under a root directory (type, permissions,
//! ownership, content digest, link target or device number) as a sorted,
//! reproducible manifest.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;

pub use error::{ApiError, ManifestError};
pub use manifest::{Entry, EntryKind, Manifest, ManifestBuilder, ManifestConfig};

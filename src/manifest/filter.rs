//! Inclusion filters
//!
//! A filter sees each node right after its metadata is read, before ownership
//! resolution or type dispatch. Rejecting a directory prunes its subtree.

use crate::manifest::entry::RawStat;

pub trait InclusionFilter {
    /// Return false to leave `path` (root-relative) out of the manifest
    fn include(&self, path: &str, stat: &RawStat) -> bool;
}

impl<F> InclusionFilter for F
where
    F: Fn(&str, &RawStat) -> bool,
{
    fn include(&self, path: &str, stat: &RawStat) -> bool {
        self(path, stat)
    }
}

/// Includes everything
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAll;

impl InclusionFilter for IncludeAll {
    fn include(&self, _path: &str, _stat: &RawStat) -> bool {
        true
    }
}

/// Excludes any node with a path component equal to one of the names
#[derive(Debug, Clone, Default)]
pub struct ExcludeNames {
    names: Vec<String>,
}

impl ExcludeNames {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl InclusionFilter for ExcludeNames {
    fn include(&self, path: &str, _stat: &RawStat) -> bool {
        !path
            .split('/')
            .any(|component| self.names.iter().any(|name| name == component))
    }
}

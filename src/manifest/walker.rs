//! Filesystem walker feeding the classifier

use crate::error::ManifestError;
use crate::manifest::entry::{FileKind, RawStat};
use crate::manifest::filter::InclusionFilter;
use crate::manifest::path;
use std::path::{Path, PathBuf};
use tracing::trace;
use walkdir::WalkDir;

/// One visited node below the root
#[derive(Debug, Clone)]
pub struct Node {
    /// Absolute path on the host
    pub path: PathBuf,
    /// Manifest path, relative to the root
    pub relative: String,
    pub stat: RawStat,
}

/// Walks a root without following symlinks, skipping the root itself
pub struct Walker<'a> {
    root: &'a Path,
    filter: &'a dyn InclusionFilter,
}

impl<'a> Walker<'a> {
    /// `root` must already be canonical
    pub fn new(root: &'a Path, filter: &'a dyn InclusionFilter) -> Self {
        Self { root, filter }
    }

    /// Visit every included node once. The first error from the walk or from
    /// `visit` stops the traversal and is returned.
    pub fn walk<F>(&self, mut visit: F) -> Result<(), ManifestError>
    where
        F: FnMut(Node) -> Result<(), ManifestError>,
    {
        let mut it = WalkDir::new(self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = it.next() {
            let entry = entry.map_err(|source| ManifestError::Walk {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root.to_path_buf()),
                source,
            })?;

            if entry.depth() == 0 {
                continue;
            }

            let metadata = entry.metadata().map_err(|source| ManifestError::Walk {
                path: entry.path().to_path_buf(),
                source,
            })?;
            let stat = RawStat::from_metadata(&metadata);

            // The filter sees a lossy path so excluded nodes never fail the walk
            let candidate = path::relative_lossy(self.root, entry.path());
            if !self.filter.include(&candidate, &stat) {
                trace!(path = %candidate, "Excluded by filter");
                if stat.kind() == Some(FileKind::Directory) {
                    it.skip_current_dir();
                }
                continue;
            }
            let relative = path::relative_to_root(self.root, entry.path())?;

            visit(Node {
                path: entry.into_path(),
                relative,
                stat,
            })?;
        }

        Ok(())
    }
}

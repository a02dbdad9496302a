//! Root-relative path handling
//!
//! Manifest paths are UTF-8, `/`-separated, relative to the build root and
//! free of `.`/`..` components.

use crate::error::ManifestError;
use std::path::{Component, Path, PathBuf};

/// Canonicalize the build root into an absolute path
pub fn canonicalize_root(root: &Path) -> Result<PathBuf, ManifestError> {
    dunce::canonicalize(root).map_err(|source| ManifestError::Metadata {
        path: root.to_path_buf(),
        source,
    })
}

/// Express `path` relative to `root` as a manifest path.
pub fn relative_to_root(root: &Path, path: &Path) -> Result<String, ManifestError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| ManifestError::OutsideRoot {
            root: root.to_path_buf(),
            path: path.to_path_buf(),
        })?;

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => {
                let name = name
                    .to_str()
                    .ok_or_else(|| ManifestError::NonUtf8Path(path.to_path_buf()))?;
                segments.push(name);
            }
            Component::CurDir => {}
            _ => {
                return Err(ManifestError::OutsideRoot {
                    root: root.to_path_buf(),
                    path: path.to_path_buf(),
                })
            }
        }
    }

    if segments.is_empty() {
        return Err(ManifestError::OutsideRoot {
            root: root.to_path_buf(),
            path: path.to_path_buf(),
        });
    }
    Ok(segments.join("/"))
}

/// Root-relative form of `path` for filtering. Invalid UTF-8 is replaced
/// rather than rejected; manifest paths still come from [`relative_to_root`].
pub fn relative_lossy(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

/// Rewrite a symlink target for the manifest.
///
/// Relative targets are returned verbatim. Absolute targets are anchored at
/// the bundle root: a target under `root` on this host loses the root prefix,
/// any other absolute target loses its leading `/`. The result is lexically
/// cleaned and `..` cannot climb above the anchor.
pub fn normalize_symlink_target(root: &Path, target: &Path) -> Result<String, ManifestError> {
    let utf8 = |p: &Path| {
        p.to_str()
            .map(str::to_string)
            .ok_or_else(|| ManifestError::NonUtf8Path(p.to_path_buf()))
    };

    if !target.is_absolute() {
        return utf8(target);
    }

    let anchored = target.strip_prefix(root).unwrap_or(target);
    let mut segments: Vec<&str> = Vec::new();
    for component in anchored.components() {
        match component {
            Component::Normal(name) => segments.push(
                name.to_str()
                    .ok_or_else(|| ManifestError::NonUtf8Path(target.to_path_buf()))?,
            ),
            Component::ParentDir => {
                segments.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    if segments.is_empty() {
        Ok(".".to_string())
    } else {
        Ok(segments.join("/"))
    }
}

/// Whether a relative symlink target, resolved lexically from the link's
/// directory, climbs above the root.
pub fn target_escapes_root(link_path: &str, target: &str) -> bool {
    if target.starts_with('/') {
        return false;
    }

    let mut depth: usize = link_path.split('/').count().saturating_sub(1);
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if depth == 0 {
                    return true;
                }
                depth -= 1;
            }
            _ => depth += 1,
        }
    }
    false
}

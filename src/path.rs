//! Relative/absolute path algebra for working-tree entries.
//!
//! Stored paths are always forward-slash, relative to the working root, never
//! empty, never containing `..`, and never ending in a separator.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::error::{IndexError, Result};

/// The name of the marker directory that makes a directory a working tree.
pub const MARKER_DIR: &str = ".ddb";
/// The marker database file inside `MARKER_DIR`.
pub const MARKER_DB: &str = "dbase.sqlite";
/// Subdirectory under the marker holding content-addressed build artifacts.
pub const BUILD_DIR: &str = "build";

/// Converts `path` to a forward-slash path relative to `root`.
///
/// Rejects paths not contained in `root`, and paths whose final component
/// contains a backslash (treated as a corrupt entry from a foreign-OS archive).
pub fn relative_to_root(root: &Path, path: &Path) -> Result<String> {
    let root = dunce_canonicalize(root)?;
    let path = dunce_canonicalize(path)?;

    let rel = path.strip_prefix(&root).map_err(|_| {
        IndexError::fs(format!(
            "{} is not contained in working root {}",
            path.display(),
            root.display()
        ))
    })?;

    if rel.as_os_str().is_empty() {
        return Err(IndexError::fs("path equals working root"));
    }

    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| {
                    IndexError::fs(format!("non-UTF8 path component in {}", rel.display()))
                })?;
                parts.push(part.to_owned());
            }
            Component::CurDir => continue,
            other => {
                return Err(IndexError::fs(format!(
                    "unexpected path component {other:?} in {}",
                    rel.display()
                )))
            }
        }
    }

    if parts.is_empty() {
        return Err(IndexError::fs("path equals working root"));
    }

    if let Some(last) = parts.last() {
        if last.contains('\\') {
            return Err(IndexError::fs(format!(
                "path component {last:?} contains a backslash"
            )));
        }
    }

    Ok(parts.join("/"))
}

/// Best-effort canonicalization that doesn't require the full path to exist on
/// every platform's canonicalize (e.g. UNC prefixes on Windows); falls back to
/// the plain path when canonicalization fails for a component that is itself
/// missing (happens for a parent walk probing ancestors, see `open.rs`).
fn dunce_canonicalize(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(p) => Ok(p),
        Err(_) => Ok(path.to_path_buf()),
    }
}

/// Number of `/` separators in a relative path (its stored `depth`).
pub fn depth_of(rel_path: &str) -> i64 {
    rel_path.matches('/').count() as i64
}

/// Every proper `/`-separated prefix of `rel_path`, shallowest first, excluding
/// `rel_path` itself. Used to restore invariant 2 (every ancestor directory is
/// represented).
pub fn ancestor_prefixes(rel_path: &str) -> Vec<String> {
    let mut prefixes = Vec::new();
    let mut acc = String::new();
    let segments: Vec<&str> = rel_path.split('/').collect();
    for segment in &segments[..segments.len().saturating_sub(1)] {
        if !acc.is_empty() {
            acc.push('/');
        }
        acc.push_str(segment);
        prefixes.push(acc.clone());
    }
    prefixes
}

/// The parent directory prefix of `rel_path` (everything up to, excluding, the
/// last `/`), or `None` if `rel_path` has no `/`.
pub fn parent_of(rel_path: &str) -> Option<&str> {
    rel_path.rfind('/').map(|idx| &rel_path[..idx])
}

/// True if `rel_path` (or any ancestor of it) is exactly the marker directory
/// name. A path equal to `.ddb` is never indexed.
pub fn is_marker_path(rel_path: &str) -> bool {
    rel_path
        .split('/')
        .any(|segment| segment == MARKER_DIR)
}

/// Reads mtime (seconds since epoch) and size from filesystem metadata.
pub fn stat(path: &Path) -> Result<(i64, i64)> {
    let meta = fs::metadata(path)?;
    let mtime = meta
        .modified()?
        .duration_since(UNIX_EPOCH)
        .map_err(|_| IndexError::fs("modification time before the epoch"))?
        .as_secs() as i64;
    let size = if meta.is_dir() { 0 } else { meta.len() as i64 };
    Ok((mtime, size))
}

/// Removes a file or directory tree, tolerating "already gone".
pub fn remove_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    } else {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

//! Index operations: add/remove/sync/move/list/match and the
//! directory-consistency sweep, each run inside a single exclusive
//! transaction on the store.

pub mod add;
pub mod folders;
pub mod list;
pub mod move_entry;
pub mod parse;
pub mod remove;
pub mod sync;
pub(crate) mod walk;

use std::path::Path;

use crate::config::IndexConfig;
use crate::error::Result;
use crate::types::Entry;

/// Outcome of comparing a stored entry against the filesystem, shared by
/// `add` (skips `Deleted`, defers it to `sync`) and `sync` (acts on it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    NotModified,
    Modified,
    Deleted,
}

/// `checkUpdate`: a deliberately mtime-first check. A directory is never
/// reported `Modified` (only appearing/vanishing matters for it). A file
/// whose mtime hasn't changed is trusted without rehashing — a documented
/// performance trade-off, not a correctness guarantee against an
/// mtime-preserving content edit.
pub fn check_update(root: &Path, stored: &Entry, _config: &IndexConfig) -> Result<UpdateStatus> {
    let abs_path = root.join(&stored.path);
    if !abs_path.exists() {
        return Ok(UpdateStatus::Deleted);
    }
    if stored.is_directory() {
        return Ok(UpdateStatus::NotModified);
    }
    let (mtime, _size) = crate::path::stat(&abs_path)?;
    if mtime == stored.mtime {
        return Ok(UpdateStatus::NotModified);
    }
    let hash = crate::hash::hash_file(&abs_path)?;
    if hash == stored.hash {
        Ok(UpdateStatus::NotModified)
    } else {
        Ok(UpdateStatus::Modified)
    }
}

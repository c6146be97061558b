//! Derived-artifact cache-key derivation and invalidation.
//!
//! Thumbnails and tile pyramids are produced by external collaborators (out
//! of scope here, per the engine's boundary); this module only owns the
//! cache-keying contract — where a given source hash's derived output lives
//! on disk — and the invalidation hook that clears it when the owning
//! entry's hash changes or the entry is removed.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::path::{BUILD_DIR, MARKER_DIR};
use crate::store::{queries, Store};

/// The content-addressed build subtree for a given hash: `.ddb/build/<hash>/`.
pub fn build_dir_for(root: &Path, hash: &str) -> PathBuf {
    root.join(MARKER_DIR).join(BUILD_DIR).join(hash)
}

/// Removes `.ddb/build/<hash>/` entirely. Must be called before the owning
/// row is updated or deleted within the same transaction, so a stale
/// artifact is never served for a hash that no longer has a row (or has a
/// different row) pointing at it.
pub fn invalidate(root: &Path, hash: &str) -> Result<()> {
    if hash.is_empty() {
        return Ok(());
    }
    crate::path::remove_path(&build_dir_for(root, hash))
}

fn thumbnail_file_name(edge_length: u32) -> String {
    format!("thumb_{edge_length}.jpg")
}

fn tile_file_name(z: u32, x: u32, y: u32, tile_size: u32, tms: bool) -> String {
    let scheme = if tms { "tms" } else { "xyz" };
    format!("tile_{z}_{x}_{y}_{tile_size}_{scheme}.png")
}

/// Cache path for a thumbnail of `rel_path` at `edge_length`, keyed by the
/// entry's current content hash. `mtime` is accepted (matching the external
/// interface signature) but is advisory only: the hash, not the mtime, is
/// the actual cache key. If `force_recreate` is set, any existing cached
/// file is invalidated before the path is handed back; production of the
/// thumbnail itself is the caller's responsibility.
pub fn get_thumbnail(
    store: &Store,
    rel_path: &str,
    _mtime: i64,
    edge_length: u32,
    force_recreate: bool,
) -> Result<PathBuf> {
    let entry = queries::get_entry(store.connection(), rel_path)?
        .ok_or_else(|| crate::error::IndexError::argument(format!("no entry at {rel_path}")))?;
    let dir = build_dir_for(store.root(), &entry.hash);
    if force_recreate {
        invalidate(store.root(), &entry.hash)?;
    }
    Ok(dir.join(thumbnail_file_name(edge_length)))
}

/// Cache path for a tile of `rel_path`, keyed by content hash plus the
/// z/x/y/tileSize/tms tuple. See `get_thumbnail` for `force_recreate`
/// semantics.
pub fn get_tile(
    store: &Store,
    rel_path: &str,
    z: u32,
    x: u32,
    y: u32,
    tile_size: u32,
    tms: bool,
    force_recreate: bool,
) -> Result<PathBuf> {
    let entry = queries::get_entry(store.connection(), rel_path)?
        .ok_or_else(|| crate::error::IndexError::argument(format!("no entry at {rel_path}")))?;
    let dir = build_dir_for(store.root(), &entry.hash);
    if force_recreate {
        invalidate(store.root(), &entry.hash)?;
    }
    Ok(dir.join(tile_file_name(z, x, y, tile_size, tms)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidate_tolerates_an_already_missing_build_dir() {
        let root = tempfile::tempdir().unwrap();
        assert!(invalidate(root.path(), "deadbeef").is_ok());
    }

    #[test]
    fn invalidate_removes_the_hash_keyed_subtree() {
        let root = tempfile::tempdir().unwrap();
        let dir = build_dir_for(root.path(), "deadbeef");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("thumb_256.jpg"), b"fake").unwrap();
        invalidate(root.path(), "deadbeef").unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn empty_hash_is_a_no_op() {
        let root = tempfile::tempdir().unwrap();
        assert!(invalidate(root.path(), "").is_ok());
    }
}

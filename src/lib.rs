//! `dronedex`: a content-addressed, geospatial-aware file index engine.
//!
//! This crate is the indexing engine only: it classifies files into entry
//! types, extracts per-type metadata and geometries, digests file contents,
//! and reconciles the result against an embedded relational store kept
//! alongside the working directory it indexes (see `SPEC_FULL.md`). Per-format
//! decoders, the HTTP/CLI surface a host might wrap this in, and network sync
//! are all out of scope — this crate only ever reads files and writes to its
//! own `.ddb/` subtree.

pub mod artifacts;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod hash;
pub mod ops;
pub mod parser;
pub mod path;
pub mod pattern;
pub mod store;
pub mod types;

pub use config::{IndexConfig, ParseOptions};
pub use error::{IndexError, Result};
pub use types::{Entry, EntryType, Meta};

use std::path::{Path, PathBuf};

use store::Store;

/// An open handle to a working tree, bundling the store with the
/// configuration it was opened with. This is the facade hosts are expected
/// to use; each method here corresponds to one operation signature from
/// `SPEC_FULL.md` §6.
pub struct WorkingTree {
    store: Store,
    config: IndexConfig,
}

impl WorkingTree {
    /// `initIndex(dir, fromScratch) -> ddbPath`. Creates the `.ddb` marker
    /// directory at `dir` and builds the schema, returning the path to the
    /// marker database. Fails if `dir` already contains a `.ddb` entry.
    pub fn init(dir: &Path, from_scratch: bool) -> Result<PathBuf> {
        let store = Store::init(dir, from_scratch)?;
        Ok(store.marker_path())
    }

    /// `openWorkingTree(dir, traverseUp) -> handle`.
    pub fn open(dir: &Path, config: IndexConfig) -> Result<Self> {
        let store = Store::open(dir, &config)?;
        Ok(WorkingTree { store, config })
    }

    /// The canonical root directory this tree indexes.
    pub fn root(&self) -> &Path {
        self.store.root()
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// `parseFiles(paths, opts) -> entries[]`. A pure parse: no store
    /// interaction, no mutation. Useful for previewing what `add_to_index`
    /// would produce.
    pub fn parse_files(&self, paths: &[PathBuf], opts: ParseOptions) -> Result<Vec<Entry>> {
        ops::parse::parse_files(self.store.root(), paths, opts)
    }

    /// `addToIndex(paths, onProgress) -> void`.
    pub fn add_to_index<F>(&mut self, paths: &[PathBuf], on_progress: F) -> Result<()>
    where
        F: FnMut(&Entry, bool) -> bool,
    {
        ops::add::add_to_index(&mut self.store, &self.config, paths, on_progress)
    }

    /// `removeFromIndex(paths, onRemoved) -> void`.
    pub fn remove_from_index<F>(&mut self, paths: &[String], on_removed: F) -> Result<()>
    where
        F: FnMut(&str) -> bool,
    {
        ops::remove::remove_from_index(&mut self.store, paths, on_removed)
    }

    /// `syncIndex() -> void`. Returns the `D\t<path>`/`U\t<path>` status
    /// lines for every change made.
    pub fn sync_index(&mut self) -> Result<Vec<String>> {
        ops::sync::sync_index(&mut self.store, &self.config)
    }

    /// `moveEntry(source, dest) -> void`.
    pub fn move_entry(&mut self, source: &str, dest: &str) -> Result<()> {
        ops::move_entry::move_entry(&mut self.store, source, dest)
    }

    /// All entries whose path equals `path` or begins with `path/`.
    pub fn list(&self, path: &str) -> Result<Vec<Entry>> {
        ops::list::list(&self.store, path)
    }

    /// Sanitized SQL-LIKE match, optionally depth-bounded, optionally
    /// extended to sweep in a folder's descendants.
    pub fn match_entries(
        &self,
        pattern: &str,
        max_depth: Option<i64>,
        is_folder: bool,
    ) -> Result<Vec<Entry>> {
        ops::list::match_entries(&self.store, pattern, max_depth, is_folder)
    }

    /// `getThumbnail(imagePath, mtime, size, forceRecreate) -> cachePath`.
    pub fn get_thumbnail(
        &self,
        image_path: &str,
        mtime: i64,
        edge_length: u32,
        force_recreate: bool,
    ) -> Result<PathBuf> {
        artifacts::get_thumbnail(&self.store, image_path, mtime, edge_length, force_recreate)
    }

    /// `getTile(geotiffPath, z, x, y, tileSize, tms, forceRecreate) -> cachePath`.
    #[allow(clippy::too_many_arguments)]
    pub fn get_tile(
        &self,
        raster_path: &str,
        z: u32,
        x: u32,
        y: u32,
        tile_size: u32,
        tms: bool,
        force_recreate: bool,
    ) -> Result<PathBuf> {
        artifacts::get_tile(&self.store, raster_path, z, x, y, tile_size, tms, force_recreate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_then_open_then_add_round_trips_through_the_facade() {
        let dir = tempfile::tempdir().unwrap();
        WorkingTree::init(dir.path(), false).unwrap();

        let mut tree = WorkingTree::open(dir.path(), IndexConfig::default()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

        let mut seen = Vec::new();
        tree.add_to_index(&[dir.path().join("notes.txt")], |entry, was_update| {
            seen.push(entry.path.clone());
            was_update
        })
        .unwrap();
        assert_eq!(seen, vec!["notes.txt".to_string()]);

        let listed = tree.list("notes.txt").unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[test]
    fn add_then_sync_with_no_filesystem_changes_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        WorkingTree::init(dir.path(), false).unwrap();
        let mut tree = WorkingTree::open(dir.path(), IndexConfig::default()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        tree.add_to_index(&[dir.path().join("notes.txt")], |_, _| true)
            .unwrap();

        let lines = tree.sync_index().unwrap();
        assert!(lines.is_empty());
    }
}

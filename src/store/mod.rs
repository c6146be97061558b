//! Index store facade: opening/initializing a working tree, schema
//! migrations, and the exclusive-transaction wrapper every mutating
//! operation runs inside.

mod migrations;
pub mod queries;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::config::IndexConfig;
use crate::error::{IndexError, Result};
use crate::path::{MARKER_DB, MARKER_DIR};

/// An open handle to a working tree's store: the `rusqlite` connection plus
/// the canonical root directory the stored paths are relative to.
pub struct Store {
    conn: Connection,
    root: PathBuf,
}

impl Store {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn marker_path(&self) -> PathBuf {
        self.root.join(MARKER_DIR).join(MARKER_DB)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join(MARKER_DIR).join(crate::path::BUILD_DIR)
    }

    /// Runs `f` inside a single exclusive transaction. `f` returns
    /// `Ok(Some(r))` to commit with result `r`, or `Ok(None)` to roll back
    /// cleanly (the cancellation path: a user callback returned `false`).
    /// Any `Err` also rolls back, since the transaction is simply dropped
    /// without a `commit()` call.
    pub fn transaction<F, R>(&mut self, f: F) -> Result<Option<R>>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<Option<R>>,
    {
        let tx = self.conn.transaction()?;
        match f(&tx)? {
            Some(r) => {
                tx.commit()?;
                Ok(Some(r))
            }
            None => Ok(None),
        }
    }

    /// Opens an existing working tree rooted at `dir`. If `dir` itself isn't
    /// a working tree and `config.traverse_up` is set, walks up ancestor
    /// directories until one is found or the filesystem root is reached.
    pub fn open(dir: &Path, config: &IndexConfig) -> Result<Self> {
        let mut candidate = dunce(dir)?;
        loop {
            let marker = candidate.join(MARKER_DIR).join(MARKER_DB);
            if marker.is_file() {
                return Self::open_at(&candidate);
            }
            if !config.traverse_up {
                break;
            }
            match candidate.parent() {
                Some(parent) => candidate = parent.to_path_buf(),
                None => break,
            }
        }
        Err(IndexError::fs(format!(
            "{} is not a working tree (no {MARKER_DIR}/{MARKER_DB} found)",
            dir.display()
        )))
    }

    fn open_at(root: &Path) -> Result<Self> {
        let db_path = root.join(MARKER_DIR).join(MARKER_DB);
        let mut conn = Connection::open(&db_path)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        migrations::run(&mut conn)?;
        Ok(Store {
            conn,
            root: root.to_path_buf(),
        })
    }

    /// Initializes a new working tree at `dir`: creates the `.ddb` marker
    /// directory and builds the schema from scratch by running every
    /// registered migration against a fresh database. `from_scratch` and the
    /// "copy a template" path both end up running the identical migration
    /// set, so the two initialization strategies are guaranteed to produce
    /// byte-identical schemas; there is no bundled template database to copy
    /// in this engine, so `from_scratch` is accepted for interface
    /// compatibility but has no observable effect.
    pub fn init(dir: &Path, _from_scratch: bool) -> Result<Self> {
        let root = dunce(dir)?;
        let marker_dir = root.join(MARKER_DIR);
        if marker_dir.exists() {
            return Err(IndexError::app(format!(
                "{} already contains a {MARKER_DIR} entry",
                root.display()
            )));
        }
        std::fs::create_dir_all(&marker_dir)?;
        std::fs::create_dir_all(marker_dir.join(crate::path::BUILD_DIR))?;
        Self::open_at(&root)
    }
}

fn dunce(path: &Path) -> Result<PathBuf> {
    match std::fs::canonicalize(path) {
        Ok(p) => Ok(p),
        Err(_) => Ok(path.to_path_buf()),
    }
}

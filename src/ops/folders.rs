//! `createMissingFolders()`: restores invariant 2 (every proper path prefix
//! has a `Directory` entry) by synthesizing rows for parents that aren't
//! represented.

use rusqlite::Connection;

use crate::error::Result;
use crate::store::queries;
use crate::types::Entry;

/// Repeatedly queries for missing parent directories and inserts synthetic
/// `Directory` rows for them, using `now` as their `mtime`, until none
/// remain. A single pass can itself uncover a new gap — inserting `a/b`
/// doesn't mean `a` is represented too — so this loops to a fixed point.
/// Returns the number of directory rows inserted.
pub fn create_missing_folders(conn: &Connection, now: i64) -> Result<usize> {
    let mut total = 0;
    loop {
        let missing = queries::missing_directory_parents(conn)?;
        if missing.is_empty() {
            break;
        }
        for path in &missing {
            queries::upsert_entry(conn, &Entry::directory(path.clone(), now))?;
        }
        total += missing.len();
    }
    Ok(total)
}

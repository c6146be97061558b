//! Prepared-statement-shaped queries over the `entries` table. Every function
//! here takes a plain `&rusqlite::Connection`, so callers can pass either the
//! store's own connection (reads) or an open `rusqlite::Transaction` (which
//! derefs to `Connection`) for mutations that must be part of the enclosing
//! exclusive transaction.

use std::collections::{BTreeSet, HashSet};

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{IndexError, Result};
use crate::geometry::{GeoPointValue, GeoPolygonValue};
use crate::types::{Entry, EntryType, Meta};

const SELECT_COLUMNS: &str =
    "path, hash, type, meta, mtime, size, depth, point_geom, polygon_geom";

fn entry_from_row(row: &Row) -> rusqlite::Result<Entry> {
    let path: String = row.get(0)?;
    let hash: String = row.get(1)?;
    let type_tag: i64 = row.get(2)?;
    let meta_json: Option<String> = row.get(3)?;
    let mtime: i64 = row.get(4)?;
    let size: i64 = row.get(5)?;
    let depth: i64 = row.get(6)?;
    let point_blob: Option<Vec<u8>> = row.get(7)?;
    let polygon_blob: Option<Vec<u8>> = row.get(8)?;

    let entry_type = EntryType::from_i64(type_tag).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Integer,
            Box::new(IndexError::app(format!("unknown entry type tag {type_tag}"))),
        )
    })?;

    let meta = match meta_json {
        Some(json) => Some(serde_json::from_str::<Meta>(&json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?),
        None => None,
    };

    let point_geom = match point_blob {
        Some(bytes) => Some(GeoPointValue::from_wkb(&bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Blob, Box::new(e))
        })?),
        None => None,
    };
    let polygon_geom = match polygon_blob {
        Some(bytes) => Some(GeoPolygonValue::from_wkb(&bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Blob, Box::new(e))
        })?),
        None => None,
    };

    Ok(Entry {
        path,
        hash,
        entry_type,
        meta,
        mtime,
        size,
        depth,
        point_geom,
        polygon_geom,
    })
}

/// Looks up a single entry by its exact relative path.
pub fn get_entry(conn: &Connection, path: &str) -> Result<Option<Entry>> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM entries WHERE path = ?1");
    conn.query_row(&sql, params![path], entry_from_row)
        .optional()
        .map_err(IndexError::from)
}

/// Inserts or replaces an entry row wholesale (add's insert path and update
/// path are the same statement: the primary key makes this an upsert).
pub fn upsert_entry(conn: &Connection, entry: &Entry) -> Result<()> {
    let meta_json = entry
        .meta
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| IndexError::app(format!("could not serialize metadata: {e}")))?;
    let point_blob = entry.point_geom.as_ref().map(GeoPointValue::to_wkb);
    let polygon_blob = entry.polygon_geom.as_ref().map(GeoPolygonValue::to_wkb);

    conn.execute(
        "INSERT INTO entries (path, hash, type, meta, mtime, size, depth, point_geom, polygon_geom)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(path) DO UPDATE SET
            hash = excluded.hash,
            type = excluded.type,
            meta = excluded.meta,
            mtime = excluded.mtime,
            size = excluded.size,
            depth = excluded.depth,
            point_geom = excluded.point_geom,
            polygon_geom = excluded.polygon_geom",
        params![
            entry.path,
            entry.hash,
            entry.entry_type.as_i64(),
            meta_json,
            entry.mtime,
            entry.size,
            entry.depth,
            point_blob,
            polygon_blob,
        ],
    )?;
    Ok(())
}

/// Deletes a single entry by exact path. No-op if absent.
pub fn delete_entry(conn: &Connection, path: &str) -> Result<()> {
    conn.execute("DELETE FROM entries WHERE path = ?1", params![path])?;
    Ok(())
}

/// `list(path)`: the entry at `path` plus every entry whose path begins with
/// `path/`.
pub fn list_under(conn: &Connection, path: &str) -> Result<Vec<Entry>> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM entries WHERE path = ?1 OR path LIKE ?2 ESCAPE '/' ORDER BY path"
    );
    let prefix_pattern = format!("{}/%", crate::pattern::escape_like(path));
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![path, prefix_pattern], entry_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// `match(pattern, isFolder)`: a caller-sanitized SQL-LIKE pattern (already
/// glob-to-LIKE translated, `/` as escape char); `isFolder` extends it with
/// `//%` to also match descendants.
pub fn match_pattern(conn: &Connection, like_pattern: &str) -> Result<Vec<Entry>> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM entries WHERE path LIKE ?1 ESCAPE '/' ORDER BY path");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![like_pattern], entry_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Every entry in the store, in the table's natural row order. Used by
/// `sync`, which has no narrower scope to search within.
pub fn all_entries(conn: &Connection) -> Result<Vec<Entry>> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM entries");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], entry_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Rewrites a single row's `path`/`depth` in place, used by `move`. Fails
/// (constraint violation, surfaced as `StoreError`) if `new_path` already
/// exists; callers must delete any pre-existing destination row first.
pub fn rewrite_path(conn: &Connection, old_path: &str, new_path: &str, new_depth: i64) -> Result<()> {
    conn.execute(
        "UPDATE entries SET path = ?1, depth = ?2 WHERE path = ?3",
        params![new_path, new_depth, old_path],
    )?;
    Ok(())
}

/// Parent-directory paths (the longest prefix up to, excluding, the last
/// `/`) that have no corresponding `Directory` row, deduplicated. Used by
/// `createMissingFolders` to restore invariant 2; the caller re-runs this
/// until it returns empty, since inserting a missing grandparent can itself
/// be missing a great-grandparent.
pub fn missing_directory_parents(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT path, type FROM entries")?;
    let rows: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<_>>()?;

    let directories: HashSet<&str> = rows
        .iter()
        .filter(|(_, t)| *t == EntryType::Directory.as_i64())
        .map(|(p, _)| p.as_str())
        .collect();

    let mut missing: BTreeSet<String> = BTreeSet::new();
    for (path, _) in &rows {
        if let Some(parent) = crate::path::parent_of(path) {
            if !directories.contains(parent) {
                missing.insert(parent.to_string());
            }
        }
    }
    Ok(missing.into_iter().collect())
}

/// The index's last-edit timestamp (seconds since epoch).
pub fn last_edit(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT last_edit FROM index_meta WHERE id = 0",
        [],
        |row| row.get(0),
    )?)
}

/// Advances the last-edit timestamp. Called once per mutating operation that
/// actually changed a row, never on a no-op pass.
pub fn set_last_edit(conn: &Connection, timestamp: i64) -> Result<()> {
    conn.execute(
        "UPDATE index_meta SET last_edit = ?1 WHERE id = 0",
        params![timestamp],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn open_temp() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::init(dir.path(), false).unwrap();
        (dir, store)
    }

    #[test]
    fn upsert_then_get_round_trips_a_directory_entry() {
        let (_dir, mut store) = open_temp();
        let entry = Entry::directory("a/b", 1000);
        store
            .transaction(|tx| {
                upsert_entry(tx, &entry)?;
                Ok(Some(()))
            })
            .unwrap();
        let fetched = get_entry(store.connection(), "a/b").unwrap().unwrap();
        assert_eq!(fetched, entry);
    }

    #[test]
    fn missing_directory_parents_flags_ungrounded_files() {
        let (_dir, mut store) = open_temp();
        let mut file = Entry::directory("a/b", 1000);
        file.entry_type = EntryType::Generic;
        file.path = "a/b/c.txt".to_string();
        file.depth = 2;
        store
            .transaction(|tx| {
                upsert_entry(tx, &file)?;
                Ok(Some(()))
            })
            .unwrap();
        let missing = missing_directory_parents(store.connection()).unwrap();
        assert!(missing.contains(&"a/b".to_string()));
        assert!(missing.contains(&"a".to_string()));
    }
}

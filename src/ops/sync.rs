//! `sync()`: full reconciliation scan against the filesystem.

use super::{check_update, UpdateStatus};
use crate::config::IndexConfig;
use crate::error::Result;
use crate::store::{queries, Store};

/// Runs `checkUpdate` against every stored entry; deletes vanished files,
/// re-parses modified ones, and returns one status line per change (`D\t` or
/// `U\t` followed by the entry's path), in the store's natural row order.
/// Advances the last-edit timestamp only if something actually changed.
pub fn sync_index(store: &mut Store, config: &IndexConfig) -> Result<Vec<String>> {
    let root = store.root().to_path_buf();

    let lines = store.transaction(|tx| {
        let mut lines = Vec::new();
        let mut any_change = false;

        for stored in queries::all_entries(tx)? {
            match check_update(&root, &stored, config)? {
                UpdateStatus::NotModified => continue,
                UpdateStatus::Deleted => {
                    queries::delete_entry(tx, &stored.path)?;
                    crate::artifacts::invalidate(&root, &stored.hash)?;
                    lines.push(format!("D\t{}", stored.path));
                    any_change = true;
                }
                UpdateStatus::Modified => {
                    let abs_path = root.join(&stored.path);
                    let entry = crate::parser::parse_entry(&root, &abs_path, true)?;
                    if entry.hash != stored.hash {
                        crate::artifacts::invalidate(&root, &stored.hash)?;
                    }
                    queries::upsert_entry(tx, &entry)?;
                    lines.push(format!("U\t{}", stored.path));
                    any_change = true;
                }
            }
        }

        if any_change {
            queries::set_last_edit(tx, chrono::Utc::now().timestamp())?;
        }
        Ok(Some(lines))
    })?;

    Ok(lines.unwrap_or_default())
}

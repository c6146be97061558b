//! `remove(paths, callback)`.

use std::collections::BTreeMap;

use crate::error::{IndexError, Result};
use crate::store::{queries, Store};
use crate::types::Entry;

/// Matches every input against the store by SQL-LIKE (with the `/`-escape
/// scheme), sweeping in a matched directory's descendants too, then deletes
/// every match and invalidates its build artifacts. `on_removed` may cancel
/// the whole call by returning `false`, rolling back every deletion made so
/// far. Fails if no entry matched across all inputs.
pub fn remove_from_index<F>(store: &mut Store, inputs: &[String], mut on_removed: F) -> Result<()>
where
    F: FnMut(&str) -> bool,
{
    let root = store.root().to_path_buf();

    store.transaction(|tx| {
        let mut matched: BTreeMap<String, Entry> = BTreeMap::new();
        for rel_path in inputs {
            let pattern = crate::pattern::glob_to_like(rel_path);
            for e in queries::match_pattern(tx, &pattern)? {
                matched.insert(e.path.clone(), e);
            }
            let descendant_pattern = format!("{pattern}//%");
            for e in queries::match_pattern(tx, &descendant_pattern)? {
                matched.insert(e.path.clone(), e);
            }
        }

        if matched.is_empty() {
            return Err(IndexError::argument(
                "remove matched no entries for the given paths",
            ));
        }

        for entry in matched.into_values() {
            if !on_removed(&entry.path) {
                return Ok(None);
            }
            queries::delete_entry(tx, &entry.path)?;
            crate::artifacts::invalidate(&root, &entry.hash)?;
        }

        queries::set_last_edit(tx, chrono::Utc::now().timestamp())?;
        Ok(Some(()))
    })?;
    Ok(())
}

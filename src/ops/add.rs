//! `add(paths, callback)`.

use std::path::PathBuf;

use super::{check_update, walk, UpdateStatus};
use crate::config::IndexConfig;
use crate::error::Result;
use crate::store::{queries, Store};
use crate::types::Entry;

/// Expands `inputs`, reconciles each collected path against the stored
/// entry (if any), and upserts anything new or modified. `on_progress` is
/// invoked once per processed entry with `(entry, was_update)`; returning
/// `false` cancels the operation and rolls back every change made so far in
/// this call, including entries already upserted earlier in the same loop.
pub fn add_to_index<F>(
    store: &mut Store,
    config: &IndexConfig,
    inputs: &[PathBuf],
    mut on_progress: F,
) -> Result<()>
where
    F: FnMut(&Entry, bool) -> bool,
{
    let root = store.root().to_path_buf();
    let expanded = walk::expand_paths(&root, inputs, config)?;

    store.transaction(|tx| {
        let mut any_change = false;

        for abs_path in &expanded {
            let rel_path = match crate::path::relative_to_root(&root, abs_path) {
                Ok(p) => p,
                // a name component containing a backslash: skipped silently.
                Err(_) => continue,
            };
            if crate::path::is_marker_path(&rel_path) {
                continue;
            }

            let existing = queries::get_entry(tx, &rel_path)?;

            let (entry, was_update, prior_hash) = match &existing {
                None => {
                    let entry = crate::parser::parse_entry(&root, abs_path, true)?;
                    (entry, true, None)
                }
                Some(stored) => match check_update(&root, stored, config)? {
                    // a vanished file is sync's responsibility, not add's.
                    UpdateStatus::Deleted => continue,
                    UpdateStatus::NotModified => (stored.clone(), false, None),
                    UpdateStatus::Modified => {
                        let entry = crate::parser::parse_entry(&root, abs_path, true)?;
                        (entry, true, Some(stored.hash.clone()))
                    }
                },
            };

            if was_update {
                if let Some(prior_hash) = &prior_hash {
                    if prior_hash != &entry.hash {
                        crate::artifacts::invalidate(&root, prior_hash)?;
                    }
                }
                queries::upsert_entry(tx, &entry)?;
                any_change = true;
            }

            if !on_progress(&entry, was_update) {
                return Ok(None);
            }
        }

        if any_change {
            queries::set_last_edit(tx, chrono::Utc::now().timestamp())?;
        }
        Ok(Some(()))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryType;

    fn write_file(path: &std::path::Path, contents: &[u8]) {
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn adds_a_new_file_and_its_ancestor_directories() {
        let tree = tempfile::tempdir().unwrap();
        let mut store = Store::init(tree.path(), false).unwrap();
        let config = IndexConfig::default();

        let nested = tree.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        let file = nested.join("notes.txt");
        write_file(&file, b"hello");

        let mut seen = Vec::new();
        add_to_index(&mut store, &config, &[file], |entry, was_update| {
            seen.push((entry.path.clone(), was_update));
            true
        })
        .unwrap();

        assert!(seen.iter().any(|(p, u)| p == "a" && *u));
        assert!(seen.iter().any(|(p, u)| p == "a/b" && *u));
        assert!(seen.iter().any(|(p, u)| p == "a/b/notes.txt" && *u));

        let entry = queries::get_entry(store.connection(), "a/b/notes.txt")
            .unwrap()
            .unwrap();
        assert_eq!(entry.entry_type, EntryType::Generic);
        assert!(!entry.hash.is_empty());
    }

    #[test]
    fn readding_unchanged_files_reports_no_update_and_does_not_advance_last_edit() {
        let tree = tempfile::tempdir().unwrap();
        let mut store = Store::init(tree.path(), false).unwrap();
        let config = IndexConfig::default();
        let file = tree.path().join("notes.txt");
        write_file(&file, b"hello");

        add_to_index(&mut store, &config, &[file.clone()], |_, _| true).unwrap();
        let last_edit_after_first = queries::last_edit(store.connection()).unwrap();

        let mut updates = Vec::new();
        add_to_index(&mut store, &config, &[file], |entry, was_update| {
            updates.push((entry.path.clone(), was_update));
            true
        })
        .unwrap();

        assert!(updates.iter().all(|(_, u)| !u));
        assert_eq!(
            queries::last_edit(store.connection()).unwrap(),
            last_edit_after_first
        );
    }

    #[test]
    fn cancelling_mid_add_rolls_back_every_change_in_the_call() {
        let tree = tempfile::tempdir().unwrap();
        let mut store = Store::init(tree.path(), false).unwrap();
        let config = IndexConfig::default();
        let a = tree.path().join("a.txt");
        let b = tree.path().join("b.txt");
        write_file(&a, b"a");
        write_file(&b, b"b");

        let mut count = 0;
        add_to_index(&mut store, &config, &[a, b], |_, _| {
            count += 1;
            count < 1 // cancel on the very first callback
        })
        .unwrap();

        assert!(queries::get_entry(store.connection(), "a.txt")
            .unwrap()
            .is_none());
        assert!(queries::get_entry(store.connection(), "b.txt")
            .unwrap()
            .is_none());
    }
}

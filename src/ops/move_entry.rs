//! `move(source, dest)`: rewrites an entry's (or a directory subtree's)
//! `path`, renaming the underlying filesystem object in step, then restores
//! invariant 2.

use std::path::Path;

use super::folders::create_missing_folders;
use crate::error::{IndexError, Result};
use crate::path::depth_of;
use crate::store::{queries, Store};

/// Rejects a trailing separator, an empty path, or any `.`/`..` path
/// segment — endpoints must be plain, unambiguous relative paths.
fn validate_endpoint(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(IndexError::argument("move endpoint must not be empty"));
    }
    if path.ends_with('/') {
        return Err(IndexError::argument(format!(
            "move endpoint {path:?} must not end in a separator"
        )));
    }
    if path.split('/').any(|segment| segment == "." || segment == "..") {
        return Err(IndexError::argument(format!(
            "move endpoint {path:?} must not contain a '.' or '..' segment"
        )));
    }
    Ok(())
}

/// Rewrites `path` (which is known to equal `source` or start with
/// `source/`) onto the `dest` prefix by substring substitution.
fn rewrite_prefix(path: &str, source: &str, dest: &str) -> String {
    if path == source {
        dest.to_string()
    } else {
        format!("{dest}{}", &path[source.len()..])
    }
}

pub fn move_entry(store: &mut Store, source: &str, dest: &str) -> Result<()> {
    validate_endpoint(source)?;
    validate_endpoint(dest)?;
    if source == dest {
        return Ok(());
    }

    let root = store.root().to_path_buf();

    store.transaction(|tx| {
        let src_entry = queries::get_entry(tx, source)?.ok_or_else(|| {
            IndexError::argument(format!("move source {source:?} is not indexed"))
        })?;
        let dest_entry = queries::get_entry(tx, dest)?;

        if src_entry.is_directory() {
            move_directory(tx, &root, source, dest, dest_entry)?;
        } else {
            move_file(tx, &root, source, dest, dest_entry)?;
        }

        create_missing_folders(tx, chrono::Utc::now().timestamp())?;
        queries::set_last_edit(tx, chrono::Utc::now().timestamp())?;
        Ok(Some(()))
    })?;
    Ok(())
}

fn move_directory(
    tx: &rusqlite::Transaction,
    root: &Path,
    source: &str,
    dest: &str,
    dest_entry: Option<crate::types::Entry>,
) -> Result<()> {
    // Forbid moving a directory onto any existing entry.
    if dest_entry.is_some() {
        return Err(IndexError::argument(format!(
            "cannot move directory {source:?} onto existing entry {dest:?}"
        )));
    }

    let abs_source = root.join(source);
    let abs_dest = root.join(dest);
    if abs_dest.exists() {
        return Err(IndexError::fs(format!(
            "destination {} already exists on disk",
            abs_dest.display()
        )));
    }
    if abs_source.exists() {
        if let Some(parent) = abs_dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::rename(&abs_source, &abs_dest)?;
    }

    // every row at `source` itself, plus everything under `source/`.
    let rows = queries::list_under(tx, source)?;
    for row in rows {
        let new_path = rewrite_prefix(&row.path, source, dest);
        queries::delete_entry(tx, &new_path)?;
        let new_depth = depth_of(&new_path);
        queries::rewrite_path(tx, &row.path, &new_path, new_depth)?;
    }
    Ok(())
}

fn move_file(
    tx: &rusqlite::Transaction,
    root: &Path,
    source: &str,
    dest: &str,
    dest_entry: Option<crate::types::Entry>,
) -> Result<()> {
    if let Some(dest_entry) = &dest_entry {
        if dest_entry.is_directory() {
            return Err(IndexError::argument(format!(
                "cannot move file {source:?} onto existing directory {dest:?}"
            )));
        }
        // moving a file onto an existing file deletes the destination entry first.
        queries::delete_entry(tx, dest)?;
    }

    let abs_source = root.join(source);
    let abs_dest = root.join(dest);
    if abs_source.exists() {
        if let Some(parent) = abs_dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::rename(&abs_source, &abs_dest)?;
    }

    let new_depth = depth_of(dest);
    queries::rewrite_path(tx, source, dest, new_depth)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use crate::ops::add::add_to_index;
    use crate::types::EntryType;

    fn seeded_tree() -> (tempfile::TempDir, Store) {
        let tree = tempfile::tempdir().unwrap();
        let mut store = Store::init(tree.path(), false).unwrap();
        let config = IndexConfig::default();
        let nested = tree.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("img.jpg"), b"x").unwrap();
        add_to_index(&mut store, &config, &[tree.path().join("a")], |_, _| true).unwrap();
        (tree, store)
    }

    #[test]
    fn moving_a_file_over_an_existing_file_deletes_the_old_row() {
        let (tree, mut store) = seeded_tree();
        std::fs::write(tree.path().join("a/b/pic.jpg"), b"y").unwrap();
        let config = IndexConfig::default();
        add_to_index(
            &mut store,
            &config,
            &[tree.path().join("a/b/pic.jpg")],
            |_, _| true,
        )
        .unwrap();

        move_entry(&mut store, "a/b/img.jpg", "a/b/pic.jpg").unwrap();

        assert!(queries::get_entry(store.connection(), "a/b/img.jpg")
            .unwrap()
            .is_none());
        let moved = queries::get_entry(store.connection(), "a/b/pic.jpg")
            .unwrap()
            .unwrap();
        assert_eq!(moved.entry_type, EntryType::Image);
        assert!(tree.path().join("a/b/pic.jpg").exists());
        assert!(!tree.path().join("a/b/img.jpg").exists());
    }

    #[test]
    fn moving_a_directory_rewrites_every_descendant_prefix() {
        let (tree, mut store) = seeded_tree();
        move_entry(&mut store, "a/b", "a/c").unwrap();

        assert!(queries::get_entry(store.connection(), "a/b").unwrap().is_none());
        assert!(queries::get_entry(store.connection(), "a/b/img.jpg")
            .unwrap()
            .is_none());
        let dir = queries::get_entry(store.connection(), "a/c").unwrap().unwrap();
        assert_eq!(dir.entry_type, EntryType::Directory);
        let file = queries::get_entry(store.connection(), "a/c/img.jpg")
            .unwrap()
            .unwrap();
        assert_eq!(file.entry_type, EntryType::Image);
        assert!(tree.path().join("a/c/img.jpg").exists());
    }

    #[test]
    fn moving_onto_self_is_a_no_op() {
        let (_tree, mut store) = seeded_tree();
        move_entry(&mut store, "a/b", "a/b").unwrap();
        assert!(queries::get_entry(store.connection(), "a/b").unwrap().is_some());
    }

    #[test]
    fn move_then_move_back_restores_the_tree() {
        let (_tree, mut store) = seeded_tree();
        move_entry(&mut store, "a/b", "a/c").unwrap();
        move_entry(&mut store, "a/c", "a/b").unwrap();

        let file = queries::get_entry(store.connection(), "a/b/img.jpg")
            .unwrap()
            .unwrap();
        assert_eq!(file.entry_type, EntryType::Image);
        assert!(queries::get_entry(store.connection(), "a/c").unwrap().is_none());
    }

    #[test]
    fn rejects_a_trailing_separator() {
        let (_tree, mut store) = seeded_tree();
        let err = move_entry(&mut store, "a/b/", "a/c").unwrap_err();
        assert!(matches!(err, IndexError::Argument { .. }));
    }

    #[test]
    fn rejects_a_dot_dot_segment() {
        let (_tree, mut store) = seeded_tree();
        let err = move_entry(&mut store, "a/b", "a/../c").unwrap_err();
        assert!(matches!(err, IndexError::Argument { .. }));
    }

    #[test]
    fn forbids_moving_a_directory_onto_an_existing_entry() {
        let (tree, mut store) = seeded_tree();
        let config = IndexConfig::default();
        std::fs::create_dir_all(tree.path().join("a/existing")).unwrap();
        add_to_index(
            &mut store,
            &config,
            &[tree.path().join("a/existing")],
            |_, _| true,
        )
        .unwrap();

        let err = move_entry(&mut store, "a/b", "a/existing").unwrap_err();
        assert!(matches!(err, IndexError::Argument { .. }));
    }

    #[test]
    fn forbids_moving_a_file_onto_an_existing_directory() {
        let (_tree, mut store) = seeded_tree();
        let err = move_entry(&mut store, "a/b/img.jpg", "a").unwrap_err();
        assert!(matches!(err, IndexError::Argument { .. }));
    }
}

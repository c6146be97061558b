//! Property tests for the invariants every committed entry set must hold:
//! depth matches path nesting, every proper prefix has a `Directory` row,
//! and paths are unique. Exercised against real, randomly generated working
//! trees rather than hand-picked fixtures.

use std::collections::BTreeSet;
use std::path::PathBuf;

use dronedex::config::IndexConfig;
use dronedex::store::{queries, Store};
use dronedex::types::EntryType;
use proptest::prelude::*;

/// Component names kept short and filesystem-safe; depth is bounded so trees
/// stay small enough for `proptest`'s shrinker to be useful.
fn path_component() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn relative_file_path() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(path_component(), 1..4)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Adding an arbitrary set of nested files leaves every committed entry's
    /// `depth` equal to the number of `/` separators in its path (invariant 1)
    /// and every proper prefix represented by a `Directory` row (invariant 2).
    #[test]
    fn add_preserves_depth_and_ancestor_directory_invariants(
        paths in proptest::collection::vec(relative_file_path(), 1..8)
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::init(dir.path(), false).unwrap();
        let config = IndexConfig::default();

        let mut seen_rel: BTreeSet<String> = BTreeSet::new();
        let mut abs_paths = Vec::new();
        for components in &paths {
            let rel = components.join("/");
            if !seen_rel.insert(rel.clone()) {
                continue;
            }
            let abs = dir.path().join(&rel);
            std::fs::create_dir_all(abs.parent().unwrap()).unwrap();
            std::fs::write(&abs, b"x").unwrap();
            abs_paths.push(abs);
        }
        if abs_paths.is_empty() {
            return Ok(());
        }

        dronedex::ops::add::add_to_index(&mut store, &config, &abs_paths, |_, _| true).unwrap();

        let all = queries::all_entries(store.connection()).unwrap();
        let by_path: BTreeSet<&str> = all.iter().map(|e| e.path.as_str()).collect();

        for entry in &all {
            prop_assert_eq!(entry.depth, entry.path.matches('/').count() as i64);

            let mut prefix = entry.path.as_str();
            while let Some(idx) = prefix.rfind('/') {
                prefix = &prefix[..idx];
                prop_assert!(
                    by_path.contains(prefix),
                    "missing Directory entry for prefix {prefix}"
                );
                let parent = all.iter().find(|e| e.path == prefix).unwrap();
                prop_assert_eq!(parent.entry_type, EntryType::Directory);
            }
        }
    }

    /// Every committed entry's path is unique by construction (invariant 5):
    /// re-adding the exact same files never produces a second row for any
    /// of them.
    #[test]
    fn readding_the_same_paths_never_duplicates_rows(
        paths in proptest::collection::vec(relative_file_path(), 1..6)
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::init(dir.path(), false).unwrap();
        let config = IndexConfig::default();

        let mut seen_rel: BTreeSet<String> = BTreeSet::new();
        let mut abs_paths: Vec<PathBuf> = Vec::new();
        for components in &paths {
            let rel = components.join("/");
            if !seen_rel.insert(rel.clone()) {
                continue;
            }
            let abs = dir.path().join(&rel);
            std::fs::create_dir_all(abs.parent().unwrap()).unwrap();
            std::fs::write(&abs, b"x").unwrap();
            abs_paths.push(abs);
        }
        if abs_paths.is_empty() {
            return Ok(());
        }

        dronedex::ops::add::add_to_index(&mut store, &config, &abs_paths, |_, _| true).unwrap();
        let first_pass = queries::all_entries(store.connection()).unwrap().len();

        dronedex::ops::add::add_to_index(&mut store, &config, &abs_paths, |_, _| true).unwrap();
        let second_pass = queries::all_entries(store.connection()).unwrap().len();

        prop_assert_eq!(first_pass, second_pass);

        let all = queries::all_entries(store.connection()).unwrap();
        let unique: BTreeSet<&str> = all.iter().map(|e| e.path.as_str()).collect();
        prop_assert_eq!(unique.len(), all.len());
    }
}

//! `parseFiles(paths, opts)`: a pure parse with no store interaction at all
//! — classification, extraction, and optional hashing only. Useful for
//! hosts that want to preview what `add_to_index` would produce before
//! committing to it.

use std::path::{Path, PathBuf};

use tracing::warn;

use super::walk;
use crate::config::{IndexConfig, ParseOptions};
use crate::error::Result;
use crate::types::Entry;

pub fn parse_files(root: &Path, paths: &[PathBuf], opts: ParseOptions) -> Result<Vec<Entry>> {
    let expand_config = IndexConfig {
        max_recursion_depth: opts.max_recursion_depth,
        ..IndexConfig::default()
    };

    let expanded = if opts.recursive {
        walk::expand_paths(root, paths, &expand_config)?
    } else {
        paths.to_vec()
    };

    let mut entries = Vec::with_capacity(expanded.len());
    for abs_path in &expanded {
        match crate::parser::parse_entry(root, abs_path, opts.with_hash) {
            Ok(entry) => entries.push(entry),
            Err(e) if opts.stop_on_error => return Err(e),
            Err(e) => {
                warn!(path = %abs_path.display(), error = %e, "skipping unparseable file");
            }
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_small_tree_without_touching_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("notes.txt"), b"hello").unwrap();

        let entries = parse_files(
            dir.path(),
            &[dir.path().join("a")],
            ParseOptions::default(),
        )
        .unwrap();

        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"a"));
        assert!(paths.contains(&"a/b"));
        assert!(paths.contains(&"a/b/notes.txt"));
    }

    #[test]
    fn with_hash_false_leaves_every_file_hash_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

        let opts = ParseOptions {
            with_hash: false,
            ..ParseOptions::default()
        };
        let entries = parse_files(dir.path(), &[dir.path().join("notes.txt")], opts).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].hash.is_empty());
    }

    #[test]
    fn non_recursive_skips_directory_expansion() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("a/b/notes.txt"), b"hello").unwrap();

        let opts = ParseOptions {
            recursive: false,
            ..ParseOptions::default()
        };
        let entries = parse_files(dir.path(), &[dir.path().join("a")], opts).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "a");
    }
}

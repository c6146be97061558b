//! Entry parser: turns an absolute filesystem path into a populated `Entry`.
//!
//! Orchestrates the pieces built elsewhere in the crate (path algebra,
//! classifier, extractors, hasher) the way the teacher's `raster.rs`
//! repository constructors walk a directory and build up a typed record per
//! file, generalized here to the full classification/extraction pipeline and
//! split into an independently callable, side-effect-free function per file
//! rather than a whole-directory scan.

use std::path::Path;

use tracing::debug;

use crate::classify::{self, ExtensionClass};
use crate::error::Result;
use crate::extract;
use crate::hash::hash_file;
use crate::path::{depth_of, relative_to_root, stat};
use crate::types::{Entry, EntryType, Meta};

/// Parses the file or directory at `abs_path` (which must exist) into an
/// `Entry` relative to `root`. Directories get `EntryType::Directory`, an
/// empty hash, and no metadata (invariant 5); files are run through the
/// classifier/extractor pipeline and, if `compute_hash` is set, streamed
/// through SHA-256. Index operations that need to detect future
/// modifications (`add`, `sync`) always pass `true`; a pure preview call
/// (`parse_files` with `withHash: false`) can skip the hash entirely.
pub fn parse_entry(root: &Path, abs_path: &Path, compute_hash: bool) -> Result<Entry> {
    let rel_path = relative_to_root(root, abs_path)?;
    let (mtime, size) = stat(abs_path)?;
    let depth = depth_of(&rel_path);

    if abs_path.is_dir() {
        return Ok(Entry::directory(rel_path, mtime));
    }

    let hash = if compute_hash {
        hash_file(abs_path)?
    } else {
        String::new()
    };

    let ext_class = classify::classify_by_extension(abs_path);
    let ext_class = if ext_class == ExtensionClass::Generic {
        classify::sniff_magic(abs_path).unwrap_or(ExtensionClass::Generic)
    } else {
        ext_class
    };

    let extraction = extract::extract(abs_path, ext_class);
    debug!(
        path = %rel_path,
        entry_type = ?extraction.entry_type,
        "parsed entry"
    );

    let meta = match extraction.meta {
        Meta::Generic => None,
        other => Some(other),
    };

    Ok(Entry {
        path: rel_path,
        hash,
        entry_type: extraction.entry_type,
        meta,
        mtime,
        size,
        depth,
        point_geom: extraction.point_geom,
        polygon_geom: extraction.polygon_geom,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_a_plain_text_file_as_generic() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("notes.txt");
        let mut f = std::fs::File::create(&file_path).unwrap();
        writeln!(f, "hello").unwrap();
        drop(f);

        let entry = parse_entry(dir.path(), &file_path, true).unwrap();
        assert_eq!(entry.path, "notes.txt");
        assert_eq!(entry.entry_type, EntryType::Generic);
        assert!(entry.meta.is_none());
        assert_eq!(entry.depth, 0);
        assert!(!entry.hash.is_empty());
    }

    #[test]
    fn parses_a_directory_with_no_hash_or_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("images");
        std::fs::create_dir(&sub).unwrap();

        let entry = parse_entry(dir.path(), &sub, true).unwrap();
        assert!(entry.is_directory());
        assert_eq!(entry.hash, "");
        assert!(entry.meta.is_none());
    }

    #[test]
    fn skips_hashing_when_compute_hash_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("notes.txt");
        let mut f = std::fs::File::create(&file_path).unwrap();
        writeln!(f, "hello").unwrap();
        drop(f);

        let entry = parse_entry(dir.path(), &file_path, false).unwrap();
        assert!(entry.hash.is_empty());
    }
}

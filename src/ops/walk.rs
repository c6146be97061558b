//! Path expansion for `add`: resolves each input path against the working
//! root, recursively walks directories, prunes the `.ddb` subtree, and
//! guarantees every ancestor directory up to the root is represented in the
//! output list even if the caller only named a single deeply nested file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::IndexConfig;
use crate::error::{IndexError, Result};
use crate::path::{ancestor_prefixes, is_marker_path, relative_to_root};

/// Expands `inputs` into the deterministic, depth-first list of absolute
/// paths `add` should process: directories are walked recursively (skipping
/// `.ddb`), then every ancestor directory missing from that set is appended.
pub fn expand_paths(root: &Path, inputs: &[PathBuf], config: &IndexConfig) -> Result<Vec<PathBuf>> {
    let mut ordered = Vec::new();
    let mut seen_rel = HashSet::new();

    for input in inputs {
        if !input.exists() {
            return Err(IndexError::fs(format!("{} does not exist", input.display())));
        }

        if input.is_dir() {
            let mut walker = WalkDir::new(input).min_depth(0);
            if let Some(max_depth) = config.max_recursion_depth {
                walker = walker.max_depth(max_depth as usize);
            }
            for entry in walker
                .into_iter()
                .filter_entry(|e| e.file_name() != ".ddb" && !is_hidden_or_system(e.path()))
            {
                let entry = entry.map_err(|e| IndexError::fs(e.to_string()))?;
                push_unique(root, entry.path(), &mut ordered, &mut seen_rel)?;
            }
        } else {
            push_unique(root, input, &mut ordered, &mut seen_rel)?;
        }
    }

    append_missing_ancestors(root, &mut ordered, &mut seen_rel)?;
    Ok(ordered)
}

/// Hidden/system files are pruned from recursive walks on Windows, the same
/// way `.ddb` is pruned everywhere; on other platforms this is always `false`
/// since "hidden" there is purely a dotfile naming convention, not an
/// attribute bit, and dotfiles are ordinary entries to this index.
#[cfg(windows)]
fn is_hidden_or_system(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;
    match path.metadata() {
        Ok(meta) => meta.file_attributes() & (FILE_ATTRIBUTE_HIDDEN | FILE_ATTRIBUTE_SYSTEM) != 0,
        Err(_) => false,
    }
}

#[cfg(not(windows))]
fn is_hidden_or_system(_path: &Path) -> bool {
    false
}

fn push_unique(
    root: &Path,
    abs_path: &Path,
    ordered: &mut Vec<PathBuf>,
    seen_rel: &mut HashSet<String>,
) -> Result<()> {
    let rel_path = match relative_to_root(root, abs_path) {
        Ok(p) => p,
        // a name component with a backslash: add() skips these silently,
        // so we just never add them to the expanded list.
        Err(_) => return Ok(()),
    };
    if is_marker_path(&rel_path) {
        return Ok(());
    }
    if seen_rel.insert(rel_path) {
        ordered.push(abs_path.to_path_buf());
    }
    Ok(())
}

fn append_missing_ancestors(
    root: &Path,
    ordered: &mut Vec<PathBuf>,
    seen_rel: &mut HashSet<String>,
) -> Result<()> {
    // collect first so we don't mutate `seen_rel` while iterating prefixes
    // derived from entries we're about to append to it.
    let mut to_append: Vec<String> = Vec::new();
    for rel_path in seen_rel.iter() {
        for prefix in ancestor_prefixes(rel_path) {
            if !seen_rel.contains(&prefix) && !to_append.contains(&prefix) {
                to_append.push(prefix);
            }
        }
    }
    // shallowest first, so a parent's own ancestors are already appended
    // before it when `add` processes the list in order.
    to_append.sort_by_key(|p| p.matches('/').count());
    for rel_path in to_append {
        seen_rel.insert(rel_path.clone());
        ordered.push(root.join(&rel_path));
    }
    Ok(())
}

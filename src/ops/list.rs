//! `list(path)` and `match(pattern, maxDepth, isFolder)`.

use crate::error::Result;
use crate::pattern::glob_to_like;
use crate::store::{queries, Store};
use crate::types::Entry;

/// All entries whose path equals `path` or begins with `path/`.
pub fn list(store: &Store, path: &str) -> Result<Vec<Entry>> {
    queries::list_under(store.connection(), path)
}

/// SQL-LIKE match against a sanitized glob pattern (`*` -> `%`, `/` as the
/// escape character). When `is_folder` is set the pattern is extended with
/// `//%` so a folder pattern also matches everything underneath it. When
/// `max_depth` is set, matches deeper than the bound are filtered out.
pub fn match_entries(
    store: &Store,
    pattern: &str,
    max_depth: Option<i64>,
    is_folder: bool,
) -> Result<Vec<Entry>> {
    let mut like_pattern = glob_to_like(pattern);
    if is_folder {
        like_pattern.push_str("//%");
    }
    let mut matches = queries::match_pattern(store.connection(), &like_pattern)?;
    if let Some(max_depth) = max_depth {
        matches.retain(|e| e.depth <= max_depth);
    }
    Ok(matches)
}

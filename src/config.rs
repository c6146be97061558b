//! Explicit configuration handle threaded through the public API instead of
//! ambient/global state.

/// Tunables for a single working tree. Constructed once by the host and
/// passed into every operation that needs it; nothing in this crate reads
/// process-global configuration.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Streaming chunk size used by the hasher, in bytes.
    pub hash_chunk_size: usize,
    /// Upper bound on recursive directory depth walked by `add`; `None` means
    /// unbounded.
    pub max_recursion_depth: Option<u32>,
    /// Whether `open_working_tree` walks up ancestor directories looking for
    /// a `.ddb` marker when the given directory isn't one itself.
    pub traverse_up: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            hash_chunk_size: 64 * 1024,
            max_recursion_depth: None,
            traverse_up: true,
        }
    }
}

/// Options governing `parse_files`.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    pub with_hash: bool,
    pub stop_on_error: bool,
    pub recursive: bool,
    pub max_recursion_depth: Option<u32>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            with_hash: true,
            stop_on_error: false,
            recursive: true,
            max_recursion_depth: None,
        }
    }
}

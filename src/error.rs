//! Error taxonomy for the indexing engine.
//!
//! Each variant is a *kind*, not a leaf type: callers match on kind and read the
//! message, the way the distilled spec describes ("Errors surface to callers with
//! a kind tag and a human-readable message").

use std::path::PathBuf;

use thiserror::Error;

/// The single error type returned by every public operation in this crate.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Path missing, permission denied, I/O failure, path outside the working
    /// root, or a name component containing a backslash.
    #[error("filesystem error: {message}")]
    Filesystem {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Schema mismatch that cannot be migrated, constraint violation, or
    /// transaction failure in the embedded store.
    #[error("store error: {message}")]
    Store {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    /// Unreadable metadata. This degrades an extractor's output rather than
    /// aborting the enclosing operation, unless `stop_on_error` is set.
    #[error("parse error for {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Invalid move endpoints, negative recursion depth, or a null/invalid
    /// argument supplied to a public operation.
    #[error("argument error: {message}")]
    Argument { message: String },

    /// A model invariant would be violated by the requested mutation; the
    /// enclosing transaction is rolled back.
    #[error("invariant violation: {message}")]
    App { message: String },
}

impl IndexError {
    pub fn fs(message: impl Into<String>) -> Self {
        IndexError::Filesystem {
            message: message.into(),
            source: None,
        }
    }

    pub fn argument(message: impl Into<String>) -> Self {
        IndexError::Argument {
            message: message.into(),
        }
    }

    pub fn app(message: impl Into<String>) -> Self {
        IndexError::App {
            message: message.into(),
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        IndexError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for IndexError {
    fn from(err: std::io::Error) -> Self {
        IndexError::Filesystem {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for IndexError {
    fn from(err: rusqlite::Error) -> Self {
        IndexError::Store {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;

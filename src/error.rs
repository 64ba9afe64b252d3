//! Crate-level error taxonomy.
//!
//! Path and value shape errors are caller programming errors and are
//! propagated synchronously; nothing is caught or retried at this level.
//! Collaborator failures surface unchanged through [`StorageError`].

use thiserror::Error;

use crate::storage::traits::StorageError;

#[derive(Error, Debug)]
pub enum FireDbError {
    /// Malformed, empty, or too-deep path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Leaf value outside {null, bool, int, string, object}.
    #[error("unsupported value type: {0}")]
    UnsupportedValue(String),

    /// Malformed range query specification.
    #[error("invalid range query: {0}")]
    InvalidRangeQuery(String),

    /// All 64^12 suffixes for one millisecond were consumed.
    #[error("push key space exhausted within a single millisecond")]
    KeyspaceExhausted,

    /// Storage collaborator failure, passed through untranslated.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

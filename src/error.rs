//! Error types for hash table operations.

use thiserror::Error;

/// Errors that can occur during hash table operations.
///
/// Absence of a key is never an error: `get` and `remove` report it as part
/// of their outcome.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// Keys must be non-empty text.
    #[error("key must not be empty")]
    EmptyKey,

    /// Open addressing found neither an empty slot nor a tombstone within a
    /// full probe cycle. The table is left unchanged.
    #[error("hashtable full: no slot available for key '{key}' (table size {table_size})")]
    Overflow {
        /// The key that could not be placed.
        key: String,
        /// Effective array length at the time of the failure.
        table_size: usize,
    },

    /// A requested capacity that cannot be represented.
    #[error("invalid table size: {0}")]
    InvalidSize(u64),

    /// A load factor warning threshold outside `(0, 1]`.
    #[error("invalid load factor warning threshold: {0} (must be in (0, 1])")]
    InvalidLoadFactor(f64),
}

impl TableError {
    /// Returns `true` for the overflow condition raised by `set`.
    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::Overflow { .. })
    }
}

/// Result type for hash table operations.
pub type TableResult<T> = Result<T, TableError>;

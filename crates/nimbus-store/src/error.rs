//! Error types for nimbus-store

use thiserror::Error;

/// Errors that can occur in snapshot store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database file could not be created, opened, or locked
    #[error("failed to open database: {0}")]
    Open(#[from] redb::DatabaseError),

    /// Transaction could not be started
    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Snapshot table could not be opened
    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    /// Storage-level I/O or corruption error
    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    /// Write transaction failed to commit
    #[error("commit failed: {0}")]
    Commit(#[from] redb::CommitError),

    /// Stored key is not a valid timestamp encoding
    #[error("invalid snapshot key: {0}")]
    Key(#[from] KeyError),

    /// Endpoint list could not be serialized
    #[error("failed to encode snapshot {timestamp}: {source}")]
    Encode {
        /// Snapshot timestamp
        timestamp: i64,
        /// Serializer error
        #[source]
        source: serde_json::Error,
    },

    /// Stored endpoint list could not be deserialized
    #[error("corrupted snapshot {timestamp}: {source}")]
    Decode {
        /// Snapshot timestamp
        timestamp: i64,
        /// Deserializer error
        #[source]
        source: serde_json::Error,
    },

    /// No snapshot stored under the timestamp
    #[error("snapshot not found: {0}")]
    NotFound(i64),
}

impl StoreError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Errors decoding a variable-length timestamp key
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
    #[error("empty key")]
    Empty,

    #[error("truncated key")]
    Truncated,

    #[error("key overflows 64 bits")]
    Overflow,

    #[error("trailing bytes after key")]
    TrailingBytes,
}

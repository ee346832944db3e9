//! Snapshot store trait

use nimbus_api::{Endpoint, Snapshot};

use crate::error::StoreError;

/// Timestamp-keyed snapshot persistence
///
/// Methods block on storage I/O; async callers should run them on a
/// blocking thread.
pub trait SnapshotStore: Send + Sync {
    /// Write `endpoints` under `timestamp`, replacing any existing snapshot
    ///
    /// # Errors
    /// Returns an error if encoding or the write transaction fails.
    fn store(&self, timestamp: i64, endpoints: &[Endpoint]) -> Result<(), StoreError>;

    /// Every stored snapshot, in storage iteration order
    ///
    /// # Errors
    /// Returns an error if the read fails or any record is corrupted.
    fn list(&self) -> Result<Vec<Snapshot>, StoreError>;

    /// Snapshot stored under exactly `timestamp`
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if nothing is stored under `timestamp`,
    /// or a storage/decode error.
    fn get(&self, timestamp: i64) -> Result<Snapshot, StoreError>;
}

//! Core error types for nimbus-core

use nimbus_provider::AggregateError;
use nimbus_store::StoreError;
use thiserror::Error;

use crate::state::ScannerState;

/// Errors returned by the inventory service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No provider registered under this name
    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    /// No snapshot stored under this timestamp
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(i64),

    /// A provider failed during enumeration
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// Snapshot storage failed
    #[error("storage error: {0}")]
    Store(#[source] StoreError),

    /// Blocking storage task panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Invalid scanner state transition attempted
    #[error("invalid state transition from {from} to {to}")]
    InvalidTransition {
        /// Current state
        from: ScannerState,
        /// Attempted target state
        to: ScannerState,
    },
}

impl ServiceError {
    /// Whether the error means the requested item does not exist
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ProviderNotFound(_) | Self::SnapshotNotFound(_))
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(timestamp) => Self::SnapshotNotFound(timestamp),
            other => Self::Store(other),
        }
    }
}

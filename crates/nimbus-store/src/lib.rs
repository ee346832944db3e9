//! nimbus-store: Snapshot persistence
//!
//! Stores endpoint snapshots in an embedded redb database, keyed by the
//! capture timestamp.

pub mod database;
pub mod error;
pub mod key;
pub mod traits;

pub use database::RedbStore;
pub use error::{KeyError, StoreError};
pub use traits::SnapshotStore;

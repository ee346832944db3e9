//! `InventoryService`: live and historical endpoint queries

use std::sync::Arc;

use chrono::Utc;
use nimbus_api::{Endpoint, Snapshot};
use nimbus_provider::{ProviderRegistry, collect_from};
use nimbus_store::SnapshotStore;
use tracing::{info, instrument};

use crate::error::ServiceError;

/// Façade over the provider registry and the snapshot store
///
/// Cheap to clone; every clone shares the same registry and store. Safe to
/// call from any number of tasks at once.
#[derive(Clone)]
pub struct InventoryService {
    registry: Arc<ProviderRegistry>,
    store: Arc<dyn SnapshotStore>,
}

impl InventoryService {
    #[must_use]
    pub fn new(registry: ProviderRegistry, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            registry: Arc::new(registry),
            store,
        }
    }

    /// Names of the registered providers, sorted
    #[must_use]
    pub fn list_providers(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Live union of every provider's endpoints
    ///
    /// # Errors
    /// Returns `ServiceError::Aggregate` if any provider fails.
    #[instrument(skip(self))]
    pub async fn all_live(&self) -> Result<Vec<Endpoint>, ServiceError> {
        Ok(self.registry.aggregate().await?)
    }

    /// Live endpoints of one provider
    ///
    /// # Errors
    /// Returns `ServiceError::ProviderNotFound` for an unknown name, or
    /// `ServiceError::Aggregate` if the provider fails.
    #[instrument(skip(self))]
    pub async fn all_from_provider(&self, name: &str) -> Result<Vec<Endpoint>, ServiceError> {
        let provider = self
            .registry
            .get(name)
            .ok_or_else(|| ServiceError::ProviderNotFound(name.to_string()))?;

        Ok(collect_from(provider.as_ref()).await?)
    }

    /// Every stored snapshot, oldest first
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or holds a corrupt entry.
    pub async fn list_snapshots(&self) -> Result<Vec<Snapshot>, ServiceError> {
        let store = Arc::clone(&self.store);
        let mut snapshots = tokio::task::spawn_blocking(move || store.list()).await??;
        snapshots.sort_by_key(|s| s.timestamp);
        Ok(snapshots)
    }

    /// Snapshot stored under exactly `timestamp`
    ///
    /// # Errors
    /// Returns `ServiceError::SnapshotNotFound` if nothing is stored there.
    pub async fn get_snapshot(&self, timestamp: i64) -> Result<Snapshot, ServiceError> {
        let store = Arc::clone(&self.store);
        Ok(tokio::task::spawn_blocking(move || store.get(timestamp)).await??)
    }

    /// Aggregate all providers now and store the result under the current
    /// Unix second
    ///
    /// A capture in the same second as an earlier one replaces it.
    ///
    /// # Errors
    /// Returns an error if aggregation or storage fails; nothing is written
    /// when aggregation fails.
    #[instrument(skip(self))]
    pub async fn capture_snapshot_now(&self) -> Result<Snapshot, ServiceError> {
        let endpoints = self.registry.aggregate().await?;
        let timestamp = Utc::now().timestamp();

        let store = Arc::clone(&self.store);
        let snapshot = tokio::task::spawn_blocking(move || {
            store
                .store(timestamp, &endpoints)
                .map(|()| Snapshot::new(timestamp, endpoints))
        })
        .await??;

        info!(
            timestamp,
            endpoints = snapshot.endpoints.len(),
            "snapshot captured"
        );
        Ok(snapshot)
    }
}

impl std::fmt::Debug for InventoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryService")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

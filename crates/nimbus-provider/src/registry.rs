//! Provider registry and cross-provider aggregation

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::try_join_all;
use nimbus_api::Endpoint;
use tracing::{debug, info, instrument};

use crate::error::{AggregateError, RegistryError};
use crate::traits::Provider;

/// Read-only mapping from provider name to adapter
///
/// Built once; iteration order is by provider name.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Build a registry from adapters
    ///
    /// # Errors
    /// Returns `RegistryError::Duplicate` if two adapters share a name.
    pub fn new(
        providers: impl IntoIterator<Item = Arc<dyn Provider>>,
    ) -> Result<Self, RegistryError> {
        let mut map = BTreeMap::new();

        for provider in providers {
            let name = provider.name().to_string();
            if map.contains_key(&name) {
                return Err(RegistryError::Duplicate(name));
            }
            info!(provider = %name, "provider added");
            map.insert(name, provider);
        }

        Ok(Self { providers: map })
    }

    /// Names of all registered providers
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    /// Look up a provider by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Provider>> {
        self.providers.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Union of every provider's endpoints, each tagged with its provider
    ///
    /// Providers are queried concurrently. The first failure aborts the
    /// whole aggregation and no endpoints are returned.
    ///
    /// # Errors
    /// Returns the failing provider's error.
    #[instrument(skip(self), fields(providers = self.providers.len()))]
    pub async fn aggregate(&self) -> Result<Vec<Endpoint>, AggregateError> {
        let lists = try_join_all(self.providers.values().map(|p| collect_from(p.as_ref()))).await?;
        let endpoints: Vec<Endpoint> = lists.into_iter().flatten().collect();

        debug!(count = endpoints.len(), "aggregation finished");
        Ok(endpoints)
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

/// Enumerate one provider and tag its endpoints with the provider name
///
/// # Errors
/// Returns the provider's error annotated with its name.
pub async fn collect_from(provider: &dyn Provider) -> Result<Vec<Endpoint>, AggregateError> {
    let name = provider.name();
    let endpoints = provider.all().await.map_err(|source| AggregateError {
        provider: name.to_string(),
        source,
    })?;

    debug!(provider = %name, count = endpoints.len(), "provider enumerated");
    Ok(endpoints
        .into_iter()
        .map(|endpoint| endpoint.with_cloud(name))
        .collect())
}

//! Google Cloud Platform adapter (Compute Engine REST API v1)

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use nimbus_api::Endpoint;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ProviderError;
use crate::rest::{Page, RestClient};
use crate::traits::{Provider, parse_ip};

/// Provider name
pub const NAME: &str = "gcp";

/// GCP adapter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcpConfig {
    /// Project to enumerate
    #[serde(default)]
    pub project: String,
    /// OAuth2 access token (falls back to `NIMBUS_GCP_TOKEN` in the daemon)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Zones to walk when `aggregated` is off
    #[serde(default = "default_zones")]
    pub zones: Vec<String>,
    /// Use aggregated list calls instead of per-zone calls
    #[serde(default = "default_aggregated")]
    pub aggregated: bool,
    /// Compute API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_zones() -> Vec<String> {
    vec![
        "europe-north1-a".to_string(),
        "europe-north1-b".to_string(),
        "europe-north1-c".to_string(),
    ]
}

fn default_aggregated() -> bool {
    true
}

fn default_base_url() -> String {
    "https://compute.googleapis.com/compute/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GcpConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            token: None,
            zones: default_zones(),
            aggregated: default_aggregated(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Instance {
    #[serde(default)]
    name: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    network_interfaces: Vec<NetworkInterface>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkInterface {
    #[serde(rename = "networkIP", default)]
    network_ip: String,
    #[serde(default)]
    access_configs: Vec<AccessConfig>,
}

#[derive(Debug, Deserialize)]
struct AccessConfig {
    #[serde(rename = "natIP", default)]
    nat_ip: String,
}

#[derive(Debug, Deserialize)]
struct Address {
    #[serde(default)]
    name: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceList {
    #[serde(default)]
    items: Vec<Instance>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InstancesScopedList {
    #[serde(default)]
    instances: Vec<Instance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceAggregatedList {
    #[serde(default)]
    items: HashMap<String, InstancesScopedList>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressList {
    #[serde(default)]
    items: Vec<Address>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddressesScopedList {
    #[serde(default)]
    addresses: Vec<Address>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressAggregatedList {
    #[serde(default)]
    items: HashMap<String, AddressesScopedList>,
    next_page_token: Option<String>,
}

impl Page for InstanceList {
    fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }
}

impl Page for InstanceAggregatedList {
    fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }
}

impl Page for AddressList {
    fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }
}

impl Page for AddressAggregatedList {
    fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }
}

// ============================================================================
// Conversion
// ============================================================================

/// One endpoint per interface address plus one per external NAT address
fn instance_endpoints(instances: &[Instance]) -> Result<Vec<Endpoint>, ProviderError> {
    let mut endpoints = Vec::new();

    for instance in instances {
        for iface in &instance.network_interfaces {
            let ip = parse_ip(&instance.name, &iface.network_ip)?;
            endpoints.push(Endpoint::new(&instance.kind, &instance.name).with_ip(ip));

            for access in &iface.access_configs {
                if access.nat_ip.is_empty() {
                    continue;
                }
                let ip = parse_ip(&instance.name, &access.nat_ip)?;
                endpoints.push(Endpoint::new(&instance.kind, &instance.name).with_ip(ip));
            }
        }
    }

    Ok(endpoints)
}

fn address_endpoints(addresses: &[Address]) -> Result<Vec<Endpoint>, ProviderError> {
    addresses
        .iter()
        .map(|address| {
            let ip = parse_ip(&address.name, &address.address)?;
            Ok(Endpoint::new(&address.kind, &address.name).with_ip(ip))
        })
        .collect()
}

// ============================================================================
// Provider
// ============================================================================

/// Compute Engine adapter
pub struct GcpProvider {
    rest: RestClient,
    config: GcpConfig,
}

impl GcpProvider {
    /// Create a new GCP adapter
    ///
    /// # Errors
    /// Returns an error if the project or token is missing, or the HTTP
    /// client cannot be built.
    pub fn new(config: GcpConfig) -> Result<Self, ProviderError> {
        if config.project.is_empty() {
            return Err(ProviderError::Config("gcp project is not set".to_string()));
        }
        let token = config
            .token
            .clone()
            .ok_or_else(|| ProviderError::Config("gcp access token is not set".to_string()))?;
        if !config.aggregated && config.zones.is_empty() {
            return Err(ProviderError::Config(
                "gcp zones are required when aggregated listing is disabled".to_string(),
            ));
        }

        let rest = RestClient::new(token, Duration::from_secs(config.timeout_secs))?;
        Ok(Self { rest, config })
    }

    fn url(&self, path: &str) -> Result<url::Url, ProviderError> {
        RestClient::endpoint(
            &self.config.base_url,
            &format!("projects/{}/{path}", self.config.project),
        )
    }

    /// Instances of a single zone
    #[instrument(skip(self))]
    async fn zone_instances(&self, zone: &str) -> Result<Vec<Endpoint>, ProviderError> {
        let mut endpoints = Vec::new();
        let url = self.url(&format!("zones/{zone}/instances"))?;

        self.rest
            .for_each_page(url, |page: InstanceList| {
                endpoints.extend(instance_endpoints(&page.items)?);
                Ok(())
            })
            .await?;

        Ok(endpoints)
    }

    async fn aggregated_instances(&self) -> Result<Vec<Endpoint>, ProviderError> {
        let mut endpoints = Vec::new();
        let url = self.url("aggregated/instances")?;

        self.rest
            .for_each_page(url, |page: InstanceAggregatedList| {
                for scoped in page.items.values() {
                    endpoints.extend(instance_endpoints(&scoped.instances)?);
                }
                Ok(())
            })
            .await?;

        Ok(endpoints)
    }

    async fn aggregated_addresses(&self) -> Result<Vec<Endpoint>, ProviderError> {
        let mut endpoints = Vec::new();
        let url = self.url("aggregated/addresses")?;

        self.rest
            .for_each_page(url, |page: AddressAggregatedList| {
                for scoped in page.items.values() {
                    endpoints.extend(address_endpoints(&scoped.addresses)?);
                }
                Ok(())
            })
            .await?;

        Ok(endpoints)
    }

    async fn global_addresses(&self) -> Result<Vec<Endpoint>, ProviderError> {
        let mut endpoints = Vec::new();
        let url = self.url("global/addresses")?;

        self.rest
            .for_each_page(url, |page: AddressList| {
                endpoints.extend(address_endpoints(&page.items)?);
                Ok(())
            })
            .await?;

        Ok(endpoints)
    }
}

#[async_trait]
impl Provider for GcpProvider {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self), fields(project = %self.config.project))]
    async fn all(&self) -> Result<Vec<Endpoint>, ProviderError> {
        debug!(aggregated = self.config.aggregated, "getting endpoints");

        let mut endpoints = Vec::new();

        if self.config.aggregated {
            let (instances, addresses) =
                futures::try_join!(self.aggregated_instances(), self.aggregated_addresses())?;
            endpoints.extend(instances);
            endpoints.extend(addresses);
        } else {
            for zone in &self.config.zones {
                endpoints.extend(self.zone_instances(zone).await?);
            }
        }

        endpoints.extend(self.global_addresses().await?);

        debug!(count = endpoints.len(), "enumeration finished");
        Ok(endpoints)
    }
}

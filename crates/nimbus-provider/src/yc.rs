//! Yandex Cloud adapter (compute, managed Redis and VPC REST APIs)

use std::time::Duration;

use async_trait::async_trait;
use nimbus_api::Endpoint;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ProviderError;
use crate::rest::{Page, RestClient};
use crate::traits::{Provider, parse_ip};

/// Provider name
pub const NAME: &str = "yc";

const INSTANCE_TYPE: &str = "instance";
const REDIS_TYPE: &str = "redis";
const ADDRESS_TYPE: &str = "address";

/// Yandex Cloud adapter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexConfig {
    /// Folder to enumerate
    #[serde(default)]
    pub folder_id: String,
    /// IAM token (falls back to `NIMBUS_YC_TOKEN` in the daemon)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Compute API base URL
    #[serde(default = "default_compute_url")]
    pub compute_url: String,
    /// Managed databases API base URL
    #[serde(default = "default_mdb_url")]
    pub mdb_url: String,
    /// VPC API base URL
    #[serde(default = "default_vpc_url")]
    pub vpc_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_compute_url() -> String {
    "https://compute.api.cloud.yandex.net/compute/v1".to_string()
}

fn default_mdb_url() -> String {
    "https://mdb.api.cloud.yandex.net/managed-redis/v1".to_string()
}

fn default_vpc_url() -> String {
    "https://vpc.api.cloud.yandex.net/vpc/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for YandexConfig {
    fn default() -> Self {
        Self {
            folder_id: String::new(),
            token: None,
            compute_url: default_compute_url(),
            mdb_url: default_mdb_url(),
            vpc_url: default_vpc_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceList {
    #[serde(default)]
    instances: Vec<Instance>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Instance {
    #[serde(default)]
    name: String,
    #[serde(default)]
    network_interfaces: Vec<NetworkInterface>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkInterface {
    primary_v4_address: Option<PrimaryAddress>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrimaryAddress {
    #[serde(default)]
    address: String,
    one_to_one_nat: Option<OneToOneNat>,
}

#[derive(Debug, Deserialize)]
struct OneToOneNat {
    #[serde(default)]
    address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClusterList {
    #[serde(default)]
    clusters: Vec<Cluster>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Cluster {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostList {
    #[serde(default)]
    hosts: Vec<Host>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Host {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressList {
    #[serde(default)]
    addresses: Vec<Address>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Address {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    external_ipv4_address: Option<ExternalAddress>,
}

#[derive(Debug, Deserialize)]
struct ExternalAddress {
    #[serde(default)]
    address: String,
}

impl Page for InstanceList {
    fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }
}

impl Page for ClusterList {
    fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }
}

impl Page for HostList {
    fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }
}

impl Page for AddressList {
    fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }
}

// ============================================================================
// Conversion
// ============================================================================

/// Internal and one-to-one NAT addresses; empty addresses are skipped
fn instance_endpoints(instances: &[Instance]) -> Result<Vec<Endpoint>, ProviderError> {
    let mut endpoints = Vec::new();

    for instance in instances {
        for iface in &instance.network_interfaces {
            let Some(primary) = &iface.primary_v4_address else {
                continue;
            };

            if !primary.address.is_empty() {
                let ip = parse_ip(&instance.name, &primary.address)?;
                endpoints.push(Endpoint::new(INSTANCE_TYPE, &instance.name).with_ip(ip));
            }

            if let Some(nat) = &primary.one_to_one_nat
                && !nat.address.is_empty()
            {
                let ip = parse_ip(&instance.name, &nat.address)?;
                endpoints.push(Endpoint::new(INSTANCE_TYPE, &instance.name).with_ip(ip));
            }
        }
    }

    Ok(endpoints)
}

/// Redis hosts have no address of their own, only an FQDN
fn redis_endpoints(hosts: &[Host]) -> Vec<Endpoint> {
    hosts
        .iter()
        .map(|host| Endpoint::new(REDIS_TYPE, &host.name))
        .collect()
}

fn address_endpoints(addresses: &[Address]) -> Result<Vec<Endpoint>, ProviderError> {
    addresses
        .iter()
        .map(|address| {
            let name = if address.name.is_empty() {
                &address.id
            } else {
                &address.name
            };
            let raw = address
                .external_ipv4_address
                .as_ref()
                .map(|a| a.address.as_str())
                .unwrap_or_default();
            let ip = parse_ip(name, raw)?;
            Ok(Endpoint::new(ADDRESS_TYPE, name).with_ip(ip))
        })
        .collect()
}

// ============================================================================
// Provider
// ============================================================================

/// Yandex Cloud adapter scoped to one folder
pub struct YandexProvider {
    rest: RestClient,
    config: YandexConfig,
}

impl YandexProvider {
    /// Create a new Yandex Cloud adapter
    ///
    /// # Errors
    /// Returns an error if the folder or token is missing, or the HTTP
    /// client cannot be built.
    pub fn new(config: YandexConfig) -> Result<Self, ProviderError> {
        if config.folder_id.is_empty() {
            return Err(ProviderError::Config("yc folder_id is not set".to_string()));
        }
        let token = config
            .token
            .clone()
            .ok_or_else(|| ProviderError::Config("yc IAM token is not set".to_string()))?;

        let rest = RestClient::new(token, Duration::from_secs(config.timeout_secs))?;
        Ok(Self { rest, config })
    }

    fn folder_url(&self, base: &str, path: &str) -> Result<url::Url, ProviderError> {
        let mut url = RestClient::endpoint(base, path)?;
        url.query_pairs_mut()
            .append_pair("folderId", &self.config.folder_id);
        Ok(url)
    }

    async fn instances(&self) -> Result<Vec<Endpoint>, ProviderError> {
        let mut endpoints = Vec::new();
        let url = self.folder_url(&self.config.compute_url, "instances")?;

        self.rest
            .for_each_page(url, |page: InstanceList| {
                endpoints.extend(instance_endpoints(&page.instances)?);
                Ok(())
            })
            .await?;

        Ok(endpoints)
    }

    async fn redis(&self) -> Result<Vec<Endpoint>, ProviderError> {
        let mut cluster_ids = Vec::new();
        let url = self.folder_url(&self.config.mdb_url, "clusters")?;

        self.rest
            .for_each_page(url, |page: ClusterList| {
                cluster_ids.extend(page.clusters.into_iter().map(|c| c.id));
                Ok(())
            })
            .await?;

        let mut endpoints = Vec::new();
        for cluster_id in &cluster_ids {
            let url =
                RestClient::endpoint(&self.config.mdb_url, &format!("clusters/{cluster_id}/hosts"))?;
            self.rest
                .for_each_page(url, |page: HostList| {
                    endpoints.extend(redis_endpoints(&page.hosts));
                    Ok(())
                })
                .await?;
        }

        debug!(clusters = cluster_ids.len(), hosts = endpoints.len(), "redis hosts listed");
        Ok(endpoints)
    }

    async fn addresses(&self) -> Result<Vec<Endpoint>, ProviderError> {
        let mut endpoints = Vec::new();
        let mut url = self.folder_url(&self.config.vpc_url, "addresses")?;
        url.query_pairs_mut()
            .append_pair("filter", "type=\"EXTERNAL\"");

        self.rest
            .for_each_page(url, |page: AddressList| {
                endpoints.extend(address_endpoints(&page.addresses)?);
                Ok(())
            })
            .await?;

        Ok(endpoints)
    }
}

#[async_trait]
impl Provider for YandexProvider {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self), fields(folder_id = %self.config.folder_id))]
    async fn all(&self) -> Result<Vec<Endpoint>, ProviderError> {
        debug!("getting endpoints");

        let (instances, redis, addresses) =
            futures::try_join!(self.instances(), self.redis(), self.addresses())?;

        let mut endpoints = Vec::with_capacity(instances.len() + redis.len() + addresses.len());
        endpoints.extend(instances);
        endpoints.extend(redis);
        endpoints.extend(addresses);

        debug!(count = endpoints.len(), "enumeration finished");
        Ok(endpoints)
    }
}

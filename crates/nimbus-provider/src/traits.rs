//! Provider trait

use std::net::IpAddr;

use async_trait::async_trait;
use nimbus_api::Endpoint;

use crate::error::ProviderError;

/// Uniform enumeration capability implemented by every cloud adapter
///
/// `all` returns the complete result set of one enumeration or an error,
/// never a partial list. Implementations must tolerate concurrent calls.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Constant provider name, used as the `cloud` tag and route segment
    fn name(&self) -> &str;

    /// Enumerate every endpoint the provider currently sees
    async fn all(&self) -> Result<Vec<Endpoint>, ProviderError>;
}

/// Parse an upstream address, failing the enumeration on garbage
///
/// # Errors
/// Returns `ProviderError::InvalidIp` if `value` is not a valid IPv4/IPv6 address.
pub fn parse_ip(resource: &str, value: &str) -> Result<IpAddr, ProviderError> {
    value.parse().map_err(|_| ProviderError::InvalidIp {
        resource: resource.to_string(),
        value: value.to_string(),
    })
}

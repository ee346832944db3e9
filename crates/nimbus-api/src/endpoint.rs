//! Normalized endpoint and snapshot records

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One network-reachable resource reported by a provider
///
/// Empty fields are omitted from the JSON form. `cloud` is left empty by
/// adapters and filled in during aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Endpoint {
    /// Name of the provider that reported the resource
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cloud: String,
    /// Address of the resource, absent for addressless resources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "10.0.0.12")]
    pub ip: Option<IpAddr>,
    /// Resource kind as defined by the adapter (`instance`, `address`, `redis`, ...)
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Resource name, or a stable identifier when the name is empty upstream
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Endpoint {
    /// Create an addressless endpoint
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            cloud: String::new(),
            ip: None,
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Attach an address
    #[must_use]
    pub fn with_ip(mut self, ip: IpAddr) -> Self {
        self.ip = Some(ip);
        self
    }

    /// Tag the endpoint with the provider it came from
    #[must_use]
    pub fn with_cloud(mut self, cloud: impl Into<String>) -> Self {
        self.cloud = cloud.into();
        self
    }
}

/// Point-in-time capture of an aggregation result, keyed by Unix seconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Snapshot {
    pub timestamp: i64,
    pub endpoints: Vec<Endpoint>,
}

impl Snapshot {
    #[must_use]
    pub fn new(timestamp: i64, endpoints: Vec<Endpoint>) -> Self {
        Self {
            timestamp,
            endpoints,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_serialization() {
        let endpoint = Endpoint::new("instance", "test-instance")
            .with_ip("127.0.0.1".parse().unwrap());

        let json = serde_json::to_string(&endpoint).unwrap();
        assert_eq!(
            json,
            r#"{"ip":"127.0.0.1","type":"instance","name":"test-instance"}"#
        );
    }

    #[test]
    fn test_endpoint_with_cloud_and_no_ip() {
        let endpoint = Endpoint::new("redis", "rc1a-host.mdb.yandexcloud.net").with_cloud("yc");

        let json = serde_json::to_string(&endpoint).unwrap();
        assert_eq!(
            json,
            r#"{"cloud":"yc","type":"redis","name":"rc1a-host.mdb.yandexcloud.net"}"#
        );
    }

    #[test]
    fn test_endpoint_ipv6_roundtrip() {
        let endpoint =
            Endpoint::new("address", "v6").with_ip("2001:db8::1".parse().unwrap());

        let json = serde_json::to_string(&endpoint).unwrap();
        let back: Endpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, endpoint);
    }

    #[test]
    fn test_endpoint_rejects_invalid_ip() {
        let result: Result<Endpoint, _> =
            serde_json::from_str(r#"{"ip":"300.1.1.1","type":"instance","name":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshot_keeps_empty_endpoint_list() {
        let snapshot = Snapshot::new(1_700_000_000, vec![]);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"timestamp":1700000000,"endpoints":[]}"#);
    }
}

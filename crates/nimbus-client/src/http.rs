//! HTTP client for nimbus daemon

use nimbus_api::{Endpoint, Snapshot, responses::HealthResponse};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{ClientError, Result};

/// HTTP client for communicating with nimbus daemon
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    /// Create a new HTTP client
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new HTTP client with custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn with_client(base_url: impl AsRef<str>, client: Client) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self { client, base_url })
    }

    /// Build a full URL from a path
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(ClientError::Url)
    }

    /// Perform a GET request and deserialize the response
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    /// Perform a bodiless POST request and deserialize the response
    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        debug!(%url, "POST");
        let response = self.client.post(url).send().await?;
        decode(response).await
    }

    // System endpoints

    /// Get daemon health status
    ///
    /// # Errors
    /// Returns an error if the request fails or the daemon returns an error.
    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("/health").await
    }

    // Live inventory

    /// Names of the providers the daemon has registered
    ///
    /// # Errors
    /// Returns an error if the request fails or the daemon returns an error.
    pub async fn providers(&self) -> Result<Vec<String>> {
        self.get("/v1/available").await
    }

    /// Live endpoints across every provider
    ///
    /// # Errors
    /// Returns an error if the request fails or any provider fails.
    pub async fn all(&self) -> Result<Vec<Endpoint>> {
        self.get("/v1/all").await
    }

    /// Live endpoints of one provider
    ///
    /// # Errors
    /// Returns `ClientError::Api` with status 404 for an unknown provider.
    pub async fn provider_all(&self, provider: &str) -> Result<Vec<Endpoint>> {
        self.get(&format!("/v1/{provider}/all")).await
    }

    // Snapshots

    /// Every stored snapshot, oldest first
    ///
    /// # Errors
    /// Returns an error if the request fails or the daemon returns an error.
    pub async fn snapshots(&self) -> Result<Vec<Snapshot>> {
        self.get("/v1/snapshots").await
    }

    /// Snapshot stored under `timestamp`
    ///
    /// # Errors
    /// Returns `ClientError::Api` with status 404 if there is none.
    pub async fn snapshot(&self, timestamp: i64) -> Result<Snapshot> {
        self.get(&format!("/v1/snapshots/{timestamp}")).await
    }

    /// Ask the daemon to capture a snapshot now
    ///
    /// # Errors
    /// Returns an error if the request fails or aggregation fails.
    pub async fn capture_snapshot(&self) -> Result<Snapshot> {
        self.post("/v1/snapshot/new").await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Api {
            status,
            message: error_message(&body),
        });
    }

    Ok(response.json().await?)
}

/// The `message` of an error body, else the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

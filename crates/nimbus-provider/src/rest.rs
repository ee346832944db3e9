//! Minimal authenticated REST client shared by the adapters

use std::collections::HashSet;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::error::ProviderError;

/// Response page carrying a continuation token
pub trait Page: DeserializeOwned {
    /// Token for the next page, if any
    fn next_page_token(&self) -> Option<&str>;
}

/// Bearer-token JSON client
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    token: String,
}

impl RestClient {
    /// Create a new client
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(token: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            token: token.into(),
        })
    }

    /// Build a URL below `base` from path segments joined with `/`
    ///
    /// # Errors
    /// Returns an error if the resulting URL is invalid.
    pub fn endpoint(base: &str, path: &str) -> Result<Url, ProviderError> {
        let url = format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Ok(Url::parse(&url)?)
    }

    /// Perform a GET request and decode the JSON body
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status, or a body
    /// that does not decode into `T`.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ProviderError> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Walk every page of a list call, handing each page to `on_page`
    ///
    /// Stops at the first error; nothing collected so far escapes. A page
    /// token seen twice is treated as a malformed response.
    ///
    /// # Errors
    /// Returns the first request, decode, or callback error.
    pub async fn for_each_page<P, F>(&self, url: Url, mut on_page: F) -> Result<(), ProviderError>
    where
        P: Page,
        F: FnMut(P) -> Result<(), ProviderError>,
    {
        let mut token: Option<String> = None;
        let mut seen = HashSet::new();
        let mut pages = 0usize;

        loop {
            let mut page_url = url.clone();
            if let Some(token) = &token {
                page_url.query_pairs_mut().append_pair("pageToken", token);
            }

            let page: P = self.get_json(page_url).await?;
            pages += 1;
            token = page
                .next_page_token()
                .filter(|t| !t.is_empty())
                .map(str::to_string);

            if let Some(next) = &token
                && !seen.insert(next.clone())
            {
                return Err(ProviderError::Decode {
                    url: url.to_string(),
                    message: format!("page token {next:?} repeated after {pages} pages"),
                });
            }

            on_page(page)?;

            if token.is_none() {
                break;
            }
        }

        debug!(url = %url, pages, "pagination finished");
        Ok(())
    }
}

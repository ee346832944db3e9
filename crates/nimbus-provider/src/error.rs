//! Error types for nimbus-provider

use thiserror::Error;

/// Errors that can occur while enumerating a provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport-level failure talking to the upstream API
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream API answered with a non-success status
    #[error("upstream returned {status} for {url}: {message}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
        /// Response body
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("failed to decode response from {url}: {message}")]
    Decode {
        /// Requested URL
        url: String,
        /// Decoder message
        message: String,
    },

    /// A resource carried an address that is not a valid IP
    #[error("invalid IP address {value:?} on {resource}")]
    InvalidIp {
        /// Resource name
        resource: String,
        /// Raw address value
        value: String,
    },

    /// Invalid URL built from configuration
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ProviderError {
    /// Check if the upstream rejected our credentials
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ProviderError::Upstream {
                status: 401 | 403,
                ..
            }
        )
    }
}

/// Aggregation failure, naming the provider that caused it
#[derive(Error, Debug)]
#[error("provider {provider} failed: {source}")]
pub struct AggregateError {
    /// Name of the failing provider
    pub provider: String,
    /// Underlying provider error
    #[source]
    pub source: ProviderError,
}

/// Errors raised while building a provider registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two providers reported the same name
    #[error("duplicate provider name: {0}")]
    Duplicate(String),
}

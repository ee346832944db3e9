//! nimbus-provider: Cloud provider abstraction
//!
//! Provides the `Provider` trait, the provider registry that aggregates
//! endpoints across providers, and adapters for GCP and Yandex Cloud.

pub mod error;
pub mod gcp;
pub mod registry;
pub mod rest;
pub mod traits;
pub mod yc;

#[cfg(test)]
mod test_server;

pub use error::{AggregateError, ProviderError, RegistryError};
pub use gcp::{GcpConfig, GcpProvider};
pub use registry::{ProviderRegistry, collect_from};
pub use traits::Provider;
pub use yc::{YandexConfig, YandexProvider};

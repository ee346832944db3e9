//! Provider factory: builds the registry from configuration

use std::sync::Arc;

use eyre::{Result, WrapErr};
use nimbus_provider::{
    GcpProvider, Provider, ProviderRegistry, YandexProvider, gcp, yc,
};
use tracing::debug;

use crate::config::Config;

/// Fallback for `[gcp] token`
pub const GCP_TOKEN_ENV: &str = "NIMBUS_GCP_TOKEN";
/// Fallback for `[yc] token`
pub const YC_TOKEN_ENV: &str = "NIMBUS_YC_TOKEN";

/// Build adapters for every enabled provider
///
/// # Errors
/// Returns an error if an enabled adapter cannot be constructed, e.g. a
/// missing token.
pub fn build_registry(config: &Config) -> Result<ProviderRegistry> {
    build_registry_with(config, |var| std::env::var(var).ok())
}

fn build_registry_with(
    config: &Config,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ProviderRegistry> {
    let mut providers: Vec<Arc<dyn Provider>> = Vec::new();

    for name in &config.server.providers {
        match name.as_str() {
            gcp::NAME => {
                let mut settings = config.gcp.clone();
                settings.token = resolve_token(settings.token, env(GCP_TOKEN_ENV));
                let provider =
                    GcpProvider::new(settings).wrap_err("failed to create gcp provider")?;
                providers.push(Arc::new(provider));
            }
            yc::NAME => {
                let mut settings = config.yc.clone();
                settings.token = resolve_token(settings.token, env(YC_TOKEN_ENV));
                let provider =
                    YandexProvider::new(settings).wrap_err("failed to create yc provider")?;
                providers.push(Arc::new(provider));
            }
            other => eyre::bail!("unknown provider {other:?}"),
        }
        debug!(provider = %name, "provider configured");
    }

    Ok(ProviderRegistry::new(providers)?)
}

/// Configured token, else the environment fallback; blanks count as unset
fn resolve_token(configured: Option<String>, fallback: Option<String>) -> Option<String> {
    configured
        .filter(|t| !t.trim().is_empty())
        .or_else(|| fallback.filter(|t| !t.trim().is_empty()))
}

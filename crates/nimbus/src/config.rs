//! Configuration loading and types

use std::path::{Path, PathBuf};

use eyre::{WrapErr, bail};
use nimbus_provider::{GcpConfig, YandexConfig, gcp, yc};
use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV: &str = "NIMBUS_CONFIG";

/// Providers the daemon knows how to build
pub const KNOWN_PROVIDERS: [&str; 2] = [gcp::NAME, yc::NAME];

/// Top-level configuration for the nimbus daemon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Daemon server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Google Cloud adapter
    #[serde(default)]
    pub gcp: GcpConfig,
    /// Yandex Cloud adapter
    #[serde(default)]
    pub yc: YandexConfig,
}

/// Daemon server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address and port to bind to
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Snapshot database file
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Seconds between scheduled snapshots
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
    /// Enabled providers
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Seconds to wait for in-flight requests on shutdown
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            db_path: default_db_path(),
            scan_interval_secs: default_scan_interval_secs(),
            providers: default_providers(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1:3232".to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("nimbus.db")
}

fn default_scan_interval_secs() -> u64 {
    300
}

fn default_providers() -> Vec<String> {
    KNOWN_PROVIDERS.iter().map(ToString::to_string).collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Find the configuration file to use, if any
    ///
    /// `NIMBUS_CONFIG` wins; otherwise the first existing file among
    /// `./nimbus.toml`, `/etc/nimbus/nimbus.toml` and the user config dir.
    #[must_use]
    pub fn locate() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }

        let mut paths = vec![
            PathBuf::from("nimbus.toml"),
            PathBuf::from("/etc/nimbus/nimbus.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("nimbus/nimbus.toml"));
        }

        paths.into_iter().find(|path| path.exists())
    }

    /// Check that the configuration can start a daemon
    ///
    /// # Errors
    /// Returns an error naming the first problem found.
    pub fn validate(&self) -> eyre::Result<()> {
        let server = &self.server;

        if server.providers.is_empty() {
            bail!("no providers enabled");
        }
        for name in &server.providers {
            if !KNOWN_PROVIDERS.contains(&name.as_str()) {
                bail!(
                    "unknown provider {name:?} (known: {})",
                    KNOWN_PROVIDERS.join(", ")
                );
            }
        }
        if server.scan_interval_secs == 0 {
            bail!("scan_interval_secs must be greater than zero");
        }
        if self.enabled(gcp::NAME) && self.gcp.project.is_empty() {
            bail!("[gcp] project is required when gcp is enabled");
        }
        if self.enabled(yc::NAME) && self.yc.folder_id.is_empty() {
            bail!("[yc] folder_id is required when yc is enabled");
        }

        Ok(())
    }

    /// Whether `provider` is listed in `server.providers`
    #[must_use]
    pub fn enabled(&self, provider: &str) -> bool {
        self.server.providers.iter().any(|p| p == provider)
    }

    /// Render as TOML with provider tokens left out
    ///
    /// Tokens are supplied through `NIMBUS_GCP_TOKEN` / `NIMBUS_YC_TOKEN`
    /// when the dumped file is loaded again.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> eyre::Result<String> {
        let mut redacted = self.clone();
        redacted.gcp.token = None;
        redacted.yc.token = None;
        Ok(toml::to_string_pretty(&redacted)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        let mut config = Config::default();
        config.gcp.project = "inventory-prod".to_string();
        config.yc.folder_id = "b1gexample".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.listen, "127.0.0.1:3232");
        assert_eq!(config.server.db_path, PathBuf::from("nimbus.db"));
        assert_eq!(config.server.scan_interval_secs, 300);
        assert_eq!(config.server.providers, vec!["gcp", "yc"]);
        assert_eq!(config.server.log_format, LogFormat::Pretty);
        assert_eq!(config.server.shutdown_timeout_secs, 30);
    }

    #[test]
    fn test_parse_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [server]
            listen = "0.0.0.0:9000"
            providers = ["yc"]
            log_format = "json"

            [yc]
            folder_id = "b1gfolder"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.listen, "0.0.0.0:9000");
        assert_eq!(config.server.scan_interval_secs, 300);
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.yc.folder_id, "b1gfolder");
        assert!(config.gcp.aggregated);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_no_providers() {
        let mut config = valid();
        config.server.providers.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("no providers"));
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut config = valid();
        config.server.providers.push("aws".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("aws"));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = valid();
        config.server.scan_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_project_and_folder() {
        let mut config = valid();
        config.gcp.project.clear();
        assert!(config.validate().unwrap_err().to_string().contains("[gcp]"));

        let mut config = valid();
        config.yc.folder_id.clear();
        assert!(config.validate().unwrap_err().to_string().contains("[yc]"));

        // Disabled providers need no settings
        let mut config = valid();
        config.yc.folder_id.clear();
        config.server.providers = vec!["gcp".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_dump_reloads() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nimbus.toml");

        let mut config = valid();
        config.server.scan_interval_secs = 60;
        std::fs::write(&path, config.to_toml().unwrap()).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.server.scan_interval_secs, 60);
        assert_eq!(loaded.gcp.project, "inventory-prod");
        assert!(loaded.gcp.token.is_none());
    }

    #[test]
    fn test_dump_omits_tokens() {
        let mut config = valid();
        config.gcp.token = Some("ya29.secret-gcp".to_string());
        config.yc.token = Some("t1.secret-yc".to_string());

        let rendered = config.to_toml().unwrap();
        assert!(!rendered.contains("secret"));
        assert!(!rendered.contains("token ="));

        let reparsed: Config = toml::from_str(&rendered).unwrap();
        assert!(reparsed.gcp.token.is_none());
        assert!(reparsed.yc.token.is_none());
        assert_eq!(reparsed.yc.folder_id, "b1gexample");
        // The live configuration keeps its credentials
        assert_eq!(config.gcp.token.as_deref(), Some("ya29.secret-gcp"));
    }

    #[test]
    fn test_load_reports_path() {
        let err = Config::load(Path::new("/nonexistent/nimbus.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/nimbus.toml"));
    }
}

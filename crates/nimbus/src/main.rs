//! nimbus daemon
//!
//! Cloud endpoint inventory: live queries against GCP and Yandex Cloud,
//! periodic snapshots in a redb file, and an axum HTTP API over both.
//! `nimbus list <provider>` queries a single provider once without serving.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use eyre::{WrapErr, bail, eyre};
use nimbus_core::{InventoryService, Scanner, ScannerConfig};
use nimbus_store::RedbStore;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod config;
mod factory;
mod list;
mod router;
mod state;

use cli::{Cli, Command, ConfigCommand, ServeArgs};
use config::{Config, LogFormat, ServerConfig};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();

    let source = cli.config.clone().or_else(Config::locate);
    let config = match &source {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    init_tracing(&config.server)?;
    match &source {
        Some(path) => info!(path = %path.display(), "configuration loaded"),
        None => warn!("no config file found, using defaults"),
    }

    match cli.command {
        None => serve(config, &ServeArgs::default()).await,
        Some(Command::Serve(args)) => serve(config, &args).await,
        Some(Command::List(args)) => {
            list::run(config, &args, &mut std::io::stdout().lock()).await
        }
        Some(Command::Config {
            action: ConfigCommand::Dump { path, force },
        }) => dump_config(&config, &path, force, &mut std::io::stdout().lock()),
    }
}

/// Logs go to stderr; stdout carries command output only
fn init_tracing(server: &ServerConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .wrap_err("invalid log level")?;
    let registry = tracing_subscriber::registry().with(filter);

    match server.log_format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }
    Ok(())
}

/// Write the configuration to `path`, or to `stdout` when `path` is `-`
fn dump_config(config: &Config, path: &Path, force: bool, stdout: &mut impl Write) -> Result<()> {
    let rendered = config.to_toml()?;

    if path == Path::new("-") {
        stdout.write_all(rendered.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    std::fs::write(path, rendered)
        .wrap_err_with(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "configuration written");
    Ok(())
}

async fn serve(mut config: Config, args: &ServeArgs) -> Result<()> {
    args.apply(&mut config.server);
    config.validate()?;
    let server = config.server.clone();

    let store = Arc::new(
        RedbStore::open(&server.db_path)
            .wrap_err_with(|| format!("failed to open {}", server.db_path.display()))?,
    );
    let registry = factory::build_registry(&config)?;
    info!(providers = ?registry.names(), "providers ready");

    let service = InventoryService::new(registry, store.clone());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scanner = Scanner::new(
        service.clone(),
        ScannerConfig::from_secs(server.scan_interval_secs),
        shutdown_rx.clone(),
    )
    .spawn();

    let app = router::create_router(Arc::new(AppState::new(service, scanner.subscribe())));
    let listener = TcpListener::bind(&server.listen)
        .await
        .wrap_err_with(|| format!("failed to bind {}", server.listen))?;
    info!(addr = %listener.local_addr()?, "listening");

    let mut drain = shutdown_rx;
    let mut http = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = drain.wait_for(|stop| *stop).await;
            })
            .await
    });

    let early_exit = tokio::select! {
        () = shutdown_signal() => {
            info!("shutdown signal received");
            None
        }
        joined = &mut http => Some(joined),
    };
    shutdown_tx.send_replace(true);

    let outcome = match early_exit {
        Some(joined) => match joined {
            Ok(Ok(())) => Err(eyre!("HTTP server exited unexpectedly")),
            Ok(Err(e)) => Err(eyre!(e).wrap_err("HTTP server failed")),
            Err(e) => Err(eyre!(e).wrap_err("HTTP server task failed")),
        },
        None => drain_http(http, Duration::from_secs(server.shutdown_timeout_secs)).await,
    };

    if let Err(e) = scanner.join().await {
        error!(error = %e, "scanner ended with an error");
    }

    match Arc::try_unwrap(store) {
        Ok(store) => store.close(),
        Err(_) => warn!("snapshot store still referenced, closing on drop"),
    }

    outcome
}

/// Wait for in-flight requests, aborting the server after `timeout`
async fn drain_http(
    mut http: tokio::task::JoinHandle<std::io::Result<()>>,
    timeout: Duration,
) -> Result<()> {
    match tokio::time::timeout(timeout, &mut http).await {
        Ok(Ok(Ok(()))) => {
            info!("HTTP server drained");
            Ok(())
        }
        Ok(Ok(Err(e))) => Err(eyre!(e).wrap_err("HTTP server failed")),
        Ok(Err(e)) => Err(eyre!(e).wrap_err("HTTP server task failed")),
        Err(_) => {
            http.abort();
            let _ = http.await;
            Err(eyre!(
                "HTTP server did not drain within {}s, forced shutdown",
                timeout.as_secs()
            ))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn sample() -> Config {
        let mut config = Config::default();
        config.gcp.project = "inventory-prod".to_string();
        config.gcp.token = Some("ya29.secret".to_string());
        config.server.scan_interval_secs = 120;
        config
    }

    #[test]
    fn test_dump_to_stdout_is_pure_toml() {
        let mut out = Vec::new();
        dump_config(&sample(), Path::new("-"), false, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.server.scan_interval_secs, 120);
        assert_eq!(parsed.gcp.project, "inventory-prod");
        assert!(parsed.gcp.token.is_none());
        assert!(text.trim_start().starts_with('['));
    }

    #[test]
    fn test_dump_to_file_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nimbus.toml");
        let mut out = Vec::new();

        dump_config(&sample(), &path, false, &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(Config::load(&path).unwrap().server.scan_interval_secs, 120);

        assert!(dump_config(&sample(), &path, false, &mut out).is_err());
        dump_config(&Config::default(), &path, true, &mut out).unwrap();
        assert_eq!(Config::load(&path).unwrap().server.scan_interval_secs, 300);
    }
}

//! Command-line interface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::ServerConfig;

/// nimbus cloud inventory daemon
#[derive(Parser, Debug)]
#[command(name = "nimbus", version, about)]
pub struct Cli {
    /// Configuration file (default: $NIMBUS_CONFIG, ./nimbus.toml, /etc/nimbus/nimbus.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server and the scanner (default)
    Serve(ServeArgs),
    /// Query one provider once and print its endpoints
    List(ListArgs),
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write the effective configuration as TOML
    Dump {
        /// Destination file, `-` for stdout
        #[arg(default_value = "nimbus.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// One-shot listing of a single provider
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Provider to query (gcp, yc)
    pub provider: String,

    /// Print JSON instead of one endpoint per line
    #[arg(long)]
    pub json: bool,
}

/// Overrides for the `[server]` section
#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Address and port to bind to
    #[arg(long)]
    pub listen: Option<String>,

    /// Snapshot database file
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Enabled provider (repeatable)
    #[arg(long = "provider")]
    pub providers: Vec<String>,

    /// Seconds between scheduled snapshots
    #[arg(long)]
    pub scan_interval: Option<u64>,
}

impl ServeArgs {
    /// Apply the flags that were given on top of the file settings
    pub fn apply(&self, server: &mut ServerConfig) {
        if let Some(listen) = &self.listen {
            server.listen.clone_from(listen);
        }
        if let Some(db_path) = &self.db_path {
            server.db_path.clone_from(db_path);
        }
        if !self.providers.is_empty() {
            server.providers.clone_from(&self.providers);
        }
        if let Some(secs) = self.scan_interval {
            server.scan_interval_secs = secs;
        }
    }
}

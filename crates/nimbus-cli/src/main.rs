//! nimbus CLI
//!
//! Command-line interface for querying a nimbus daemon

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use nimbus_client::HttpClient;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod output;

#[derive(Parser)]
#[command(name = "nimbus-cli", version)]
#[command(about = "Query cloud endpoints and snapshots from a nimbus daemon", long_about = None)]
struct Cli {
    /// Daemon base URL
    #[arg(short, long, env = "NIMBUS_SERVER", default_value = "http://127.0.0.1:3232", global = true)]
    server: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Output::Text, global = true)]
    output: Output,

    /// Log HTTP requests to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Output {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered providers
    Providers,
    /// List live endpoints
    All {
        /// Only query this provider
        #[arg(short, long)]
        provider: Option<String>,
    },
    /// List stored snapshots
    Snapshots,
    /// Capture or inspect a single snapshot
    Snapshot {
        #[command(subcommand)]
        action: SnapshotCommand,
    },
}

#[derive(Subcommand)]
enum SnapshotCommand {
    /// Capture a snapshot now
    New,
    /// Show the snapshot stored at a Unix timestamp
    Get {
        #[arg(allow_negative_numbers = true)]
        timestamp: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let client = HttpClient::new(&cli.server)?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Providers => {
            let providers = client.providers().await?;
            output::providers(&mut out, cli.output, &providers)?;
        }
        Commands::All { provider } => {
            let endpoints = match provider {
                Some(name) => client.provider_all(&name).await?,
                None => client.all().await?,
            };
            output::endpoints(&mut out, cli.output, &endpoints)?;
        }
        Commands::Snapshots => {
            let snapshots = client.snapshots().await?;
            output::snapshots(&mut out, cli.output, &snapshots)?;
        }
        Commands::Snapshot { action } => {
            let snapshot = match action {
                SnapshotCommand::New => client.capture_snapshot().await?,
                SnapshotCommand::Get { timestamp } => client.snapshot(timestamp).await?,
            };
            output::snapshot(&mut out, cli.output, &snapshot)?;
        }
    }

    Ok(())
}

//! Text and JSON rendering

use std::io::Write;

use chrono::DateTime;
use nimbus_api::{Endpoint, Snapshot};
use serde::Serialize;

use crate::Output;

fn json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> eyre::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// RFC 3339 rendering of Unix seconds; raw number when out of range
fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map_or_else(|| timestamp.to_string(), |t| t.to_rfc3339())
}

fn endpoint_line(endpoint: &Endpoint) -> String {
    let ip = endpoint.ip.map(|ip| ip.to_string()).unwrap_or_default();
    format!(
        "{:<6} {:<10} {:<40} {}",
        endpoint.cloud, endpoint.kind, endpoint.name, ip
    )
    .trim_end()
    .to_string()
}

pub fn providers(out: &mut impl Write, format: Output, providers: &[String]) -> eyre::Result<()> {
    match format {
        Output::Json => json(out, providers),
        Output::Text => {
            for name in providers {
                writeln!(out, "{name}")?;
            }
            Ok(())
        }
    }
}

pub fn endpoints(out: &mut impl Write, format: Output, endpoints: &[Endpoint]) -> eyre::Result<()> {
    match format {
        Output::Json => json(out, endpoints),
        Output::Text => {
            for endpoint in endpoints {
                writeln!(out, "{}", endpoint_line(endpoint))?;
            }
            Ok(())
        }
    }
}

pub fn snapshots(out: &mut impl Write, format: Output, snapshots: &[Snapshot]) -> eyre::Result<()> {
    match format {
        Output::Json => json(out, snapshots),
        Output::Text => {
            for snapshot in snapshots {
                writeln!(
                    out,
                    "{}  {:>12}  {} endpoints",
                    format_timestamp(snapshot.timestamp),
                    snapshot.timestamp,
                    snapshot.endpoints.len()
                )?;
            }
            Ok(())
        }
    }
}

pub fn snapshot(out: &mut impl Write, format: Output, snapshot: &Snapshot) -> eyre::Result<()> {
    match format {
        Output::Json => json(out, snapshot),
        Output::Text => {
            writeln!(
                out,
                "snapshot {} ({})",
                snapshot.timestamp,
                format_timestamp(snapshot.timestamp)
            )?;
            endpoints(out, format, &snapshot.endpoints)
        }
    }
}

//! One-shot listing of a single provider, without the daemon

use std::io::Write;

use eyre::{Result, eyre};
use nimbus_api::Endpoint;
use nimbus_provider::collect_from;
use tracing::info;

use crate::cli::ListArgs;
use crate::config::Config;
use crate::factory;

/// Query `args.provider` once and write its endpoints to `out`
///
/// Only the requested provider is built, so the other sections of the
/// configuration may be incomplete.
///
/// # Errors
/// Returns an error if the provider is unknown or misconfigured, or the
/// upstream query fails.
pub async fn run(mut config: Config, args: &ListArgs, out: &mut impl Write) -> Result<()> {
    config.server.providers = vec![args.provider.clone()];
    config.validate()?;

    let registry = factory::build_registry(&config)?;
    let provider = registry
        .get(&args.provider)
        .ok_or_else(|| eyre!("provider {:?} is not configured", args.provider))?;

    let endpoints = collect_from(provider.as_ref()).await?;
    info!(provider = %args.provider, count = endpoints.len(), "endpoints listed");

    render(out, &endpoints, args.json)
}

fn render(out: &mut impl Write, endpoints: &[Endpoint], json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, endpoints)?;
        writeln!(out)?;
        return Ok(());
    }

    for endpoint in endpoints {
        let ip = endpoint.ip.map(|ip| ip.to_string()).unwrap_or_default();
        let line = format!("{}\t{}\t{}\t{}", endpoint.cloud, endpoint.kind, endpoint.name, ip);
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, routing::get};
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;

    async fn fake_compute() -> String {
        let app = Router::new()
            .route(
                "/projects/demo/aggregated/instances",
                get(|| async {
                    Json(json!({"items": {"zones/europe-north1-a": {"instances": [{
                        "kind": "compute#instance",
                        "name": "web-1",
                        "networkInterfaces": [{"networkIP": "10.166.0.2"}]
                    }]}}}))
                }),
            )
            .route(
                "/projects/demo/aggregated/addresses",
                get(|| async { Json(json!({"items": {}})) }),
            )
            .route(
                "/projects/demo/global/addresses",
                get(|| async {
                    Json(json!({"items": [
                        {"kind": "compute#address", "name": "global-lb", "address": "34.120.0.1"}
                    ]}))
                }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn gcp_config(base_url: String) -> Config {
        let mut config = Config::default();
        config.gcp.project = "demo".to_string();
        config.gcp.token = Some("ya29.test".to_string());
        config.gcp.base_url = base_url;
        config
    }

    fn args(provider: &str, json: bool) -> ListArgs {
        ListArgs {
            provider: provider.to_string(),
            json,
        }
    }

    #[tokio::test]
    async fn test_list_gcp_as_text() {
        // yc is left without a folder: only the listed provider is checked
        let config = gcp_config(fake_compute().await);
        let mut out = Vec::new();

        run(config, &args("gcp", false), &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "gcp\tcompute#instance\tweb-1\t10.166.0.2",
                "gcp\tcompute#address\tglobal-lb\t34.120.0.1",
            ]
        );
    }

    #[tokio::test]
    async fn test_list_gcp_as_json() {
        let config = gcp_config(fake_compute().await);
        let mut out = Vec::new();

        run(config, &args("gcp", true), &mut out).await.unwrap();

        let endpoints: Vec<Endpoint> = serde_json::from_slice(&out).unwrap();
        assert_eq!(endpoints.len(), 2);
        assert!(endpoints.iter().all(|e| e.cloud == "gcp"));
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_provider() {
        let mut out = Vec::new();
        let err = run(Config::default(), &args("aws", false), &mut out)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("aws"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_render_addressless_endpoint() {
        let endpoints = vec![Endpoint::new("redis", "rc1a.mdb").with_cloud("yc")];
        let mut out = Vec::new();

        render(&mut out, &endpoints, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "yc\tredis\trc1a.mdb\n");
    }
}

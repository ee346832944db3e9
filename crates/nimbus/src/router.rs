//! HTTP router configuration

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use utoipa::OpenApi;

use crate::api::{endpoints, snapshots, system};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        system::health,
        system::openapi,
        endpoints::available,
        endpoints::all,
        endpoints::provider_all,
        snapshots::list,
        snapshots::get,
        snapshots::capture,
    ),
    components(
        schemas(
            nimbus_api::Endpoint,
            nimbus_api::Snapshot,
            nimbus_api::responses::HealthResponse,
            crate::api::ApiError,
        )
    ),
    tags(
        (name = "nimbus", description = "Cloud endpoint inventory API")
    )
)]
pub struct ApiDoc;

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // System endpoints
        .route("/health", get(system::health))
        .route("/v1/openapi.json", get(system::openapi))
        // Live inventory
        .route("/v1/available", get(endpoints::available))
        .route("/v1/all", get(endpoints::all))
        .route("/v1/{provider}/all", get(endpoints::provider_all))
        // Snapshots
        .route("/v1/snapshots", get(snapshots::list))
        .route("/v1/snapshots/{timestamp}", get(snapshots::get))
        .route("/v1/snapshot/new", post(snapshots::capture))
        // State
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use nimbus_api::{Endpoint, Snapshot};
    use nimbus_core::{InventoryService, ScannerState};
    use nimbus_provider::{Provider, ProviderError, ProviderRegistry};
    use nimbus_store::RedbStore;
    use serde_json::Value;
    use tempfile::TempDir;
    use tokio::sync::watch;
    use tower::ServiceExt;

    use super::*;

    struct MockProvider {
        name: &'static str,
        endpoints: Vec<Endpoint>,
    }

    #[async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn all(&self) -> Result<Vec<Endpoint>, ProviderError> {
            Ok(self.endpoints.clone())
        }
    }

    struct BrokenProvider;

    #[async_trait]
    impl Provider for BrokenProvider {
        fn name(&self) -> &str {
            "broken"
        }

        async fn all(&self) -> Result<Vec<Endpoint>, ProviderError> {
            Err(ProviderError::Upstream {
                status: 403,
                url: "https://compute.example/instances".to_string(),
                message: "permission denied".to_string(),
            })
        }
    }

    struct TestApp {
        router: Router,
        _dir: TempDir,
    }

    impl TestApp {
        fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
            let dir = TempDir::new().unwrap();
            let store = Arc::new(RedbStore::open(dir.path().join("nimbus.db")).unwrap());
            let registry = ProviderRegistry::new(providers).unwrap();
            let service = InventoryService::new(registry, store);
            let (_tx, scanner) = watch::channel(ScannerState::Idle);

            Self {
                router: create_router(Arc::new(AppState::new(service, scanner))),
                _dir: dir,
            }
        }

        fn standard() -> Self {
            let gcp: Arc<dyn Provider> = Arc::new(MockProvider {
                name: "gcp",
                endpoints: vec![
                    Endpoint::new("instance", "web-1").with_ip("10.0.0.2".parse().unwrap()),
                ],
            });
            let yc: Arc<dyn Provider> = Arc::new(MockProvider {
                name: "yc",
                endpoints: vec![Endpoint::new("redis", "rc1a-cache")],
            });
            Self::new(vec![gcp, yc])
        }

        async fn request(&self, method: &str, uri: &str) -> (StatusCode, Value) {
            let response = self
                .router
                .clone()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            let status = response.status();
            let body = response.into_body().collect().await.unwrap().to_bytes();
            let json = if body.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&body).unwrap()
            };
            (status, json)
        }
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::standard();
        let (status, body) = app.request("GET", "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["scanner"], "idle");
    }

    #[tokio::test]
    async fn test_available() {
        let app = TestApp::standard();
        let (status, body) = app.request("GET", "/v1/available").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!(["gcp", "yc"]));
    }

    #[tokio::test]
    async fn test_all() {
        let app = TestApp::standard();
        let (status, body) = app.request("GET", "/v1/all").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!([
                {"cloud": "gcp", "ip": "10.0.0.2", "type": "instance", "name": "web-1"},
                {"cloud": "yc", "type": "redis", "name": "rc1a-cache"}
            ])
        );
    }

    #[tokio::test]
    async fn test_provider_all() {
        let app = TestApp::standard();
        let (status, body) = app.request("GET", "/v1/yc/all").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["cloud"], "yc");
    }

    #[tokio::test]
    async fn test_unknown_provider_is_404() {
        let app = TestApp::standard();
        let (status, body) = app.request("GET", "/v1/aws/all").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "PROVIDER_NOT_FOUND");
        assert_eq!(body["message"], "provider not found: aws");
    }

    #[tokio::test]
    async fn test_failing_provider_is_500() {
        let broken: Arc<dyn Provider> = Arc::new(BrokenProvider);
        let app = TestApp::new(vec![broken]);

        let (status, body) = app.request("GET", "/v1/all").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "PROVIDER_ERROR");

        let (status, _) = app.request("GET", "/v1/broken/all").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = app.request("POST", "/v1/snapshot/new").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let (_, body) = app.request("GET", "/v1/snapshots").await;
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_capture_then_list_and_get() {
        let app = TestApp::standard();

        let (status, body) = app.request("GET", "/v1/snapshots").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));

        let (status, captured) = app.request("POST", "/v1/snapshot/new").await;
        assert_eq!(status, StatusCode::OK);
        let captured: Snapshot = serde_json::from_value(captured).unwrap();
        assert_eq!(captured.endpoints.len(), 2);

        let (status, body) = app.request("GET", "/v1/snapshots").await;
        assert_eq!(status, StatusCode::OK);
        let listed: Vec<Snapshot> = serde_json::from_value(body).unwrap();
        assert_eq!(listed, vec![captured.clone()]);

        let uri = format!("/v1/snapshots/{}", captured.timestamp);
        let (status, body) = app.request("GET", &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_value::<Snapshot>(body).unwrap(), captured);
    }

    #[tokio::test]
    async fn test_snapshot_lookup_errors() {
        let app = TestApp::standard();

        let (status, body) = app.request("GET", "/v1/snapshots/1700000000").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "SNAPSHOT_NOT_FOUND");

        let (status, body) = app.request("GET", "/v1/snapshots/yesterday").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_capture_requires_post() {
        let app = TestApp::standard();
        let (status, _) = app.request("GET", "/v1/snapshot/new").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let app = TestApp::standard();
        let (status, body) = app.request("GET", "/v1/openapi.json").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/v1/all"].is_object());
        assert!(body["paths"]["/v1/snapshot/new"]["post"].is_object());
        assert!(body["components"]["schemas"]["Endpoint"].is_object());
    }
}

//! Health and API description

use std::sync::Arc;

use axum::{Json, extract::State};
use nimbus_api::responses::HealthResponse;
use utoipa::OpenApi;

use crate::router::ApiDoc;
use crate::state::AppState;

/// Liveness plus the current scanner state
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Daemon is running", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        scanner: state.scanner_state().to_string(),
    })
}

/// OpenAPI document for this API
#[utoipa::path(
    get,
    path = "/v1/openapi.json",
    responses(
        (status = 200, description = "OpenAPI document")
    )
)]
pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

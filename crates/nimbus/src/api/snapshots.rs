//! Snapshot handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use nimbus_api::Snapshot;

use crate::api::{ApiError, AppError};
use crate::state::AppState;

/// Every stored snapshot, oldest first
#[utoipa::path(
    get,
    path = "/v1/snapshots",
    responses(
        (status = 200, description = "Stored snapshots", body = Vec<Snapshot>),
        (status = 500, description = "Storage failure", body = ApiError)
    )
)]
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Snapshot>>, AppError> {
    Ok(Json(state.service.list_snapshots().await?))
}

/// One snapshot by Unix timestamp
#[utoipa::path(
    get,
    path = "/v1/snapshots/{timestamp}",
    params(
        ("timestamp" = i64, Path, description = "Unix seconds the snapshot was stored under")
    ),
    responses(
        (status = 200, description = "The snapshot", body = Snapshot),
        (status = 400, description = "Timestamp is not an integer", body = ApiError),
        (status = 404, description = "No snapshot at this timestamp", body = ApiError),
        (status = 500, description = "Storage failure", body = ApiError)
    )
)]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(timestamp): Path<String>,
) -> Result<Json<Snapshot>, AppError> {
    let timestamp: i64 = timestamp
        .parse()
        .map_err(|_| AppError::bad_request(format!("invalid timestamp: {timestamp:?}")))?;

    Ok(Json(state.service.get_snapshot(timestamp).await?))
}

/// Capture a snapshot now
#[utoipa::path(
    post,
    path = "/v1/snapshot/new",
    responses(
        (status = 200, description = "The stored snapshot", body = Snapshot),
        (status = 500, description = "Aggregation or storage failed", body = ApiError)
    )
)]
pub async fn capture(State(state): State<Arc<AppState>>) -> Result<Json<Snapshot>, AppError> {
    Ok(Json(state.service.capture_snapshot_now().await?))
}

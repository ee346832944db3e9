//! Live inventory handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use nimbus_api::Endpoint;

use crate::api::{ApiError, AppError};
use crate::state::AppState;

/// Names of the registered providers
#[utoipa::path(
    get,
    path = "/v1/available",
    responses(
        (status = 200, description = "Registered provider names", body = Vec<String>)
    )
)]
pub async fn available(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.service.list_providers())
}

/// Live endpoints across every provider
#[utoipa::path(
    get,
    path = "/v1/all",
    responses(
        (status = 200, description = "Aggregated endpoints", body = Vec<Endpoint>),
        (status = 500, description = "A provider failed", body = ApiError)
    )
)]
pub async fn all(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Endpoint>>, AppError> {
    Ok(Json(state.service.all_live().await?))
}

/// Live endpoints of one provider
#[utoipa::path(
    get,
    path = "/v1/{provider}/all",
    params(
        ("provider" = String, Path, description = "Provider name")
    ),
    responses(
        (status = 200, description = "Endpoints of the provider", body = Vec<Endpoint>),
        (status = 404, description = "Unknown provider", body = ApiError),
        (status = 500, description = "The provider failed", body = ApiError)
    )
)]
pub async fn provider_all(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
) -> Result<Json<Vec<Endpoint>>, AppError> {
    Ok(Json(state.service.all_from_provider(&provider).await?))
}

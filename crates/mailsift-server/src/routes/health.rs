//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub supported_file_types: Vec<String>,
}

/// Health check endpoint.
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let mut supported_file_types: Vec<String> = state
        .pipeline()
        .registry()
        .supported_types()
        .into_iter()
        .map(|file_type| file_type.to_string())
        .collect();
    supported_file_types.sort();

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        supported_file_types,
    }))
}

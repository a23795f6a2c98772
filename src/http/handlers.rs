use axum::Json;
use axum::extract::State;
use serde::Serialize;
use tracing::error;

use super::AppState;
use crate::service::{self, AnalyzeRequest, AnalyzeResponse, FixRequest, FixResponse};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn analyze(State(state): State<AppState>, Json(request): Json<AnalyzeRequest>) -> Json<AnalyzeResponse> {
    let config = state.config.clone();
    let response = tokio::task::spawn_blocking(move || service::analyze(&config, &request))
        .await
        .unwrap_or_else(|e| {
            error!("analysis task failed: {e}");
            AnalyzeResponse::failed("", format!("internal error: {e}"))
        });
    Json(response)
}

pub async fn fix(State(state): State<AppState>, Json(request): Json<FixRequest>) -> Json<FixResponse> {
    let config = state.config.clone();
    let response = tokio::task::spawn_blocking(move || service::fix(&config, &request))
        .await
        .unwrap_or_else(|e| {
            error!("repair task failed: {e}");
            FixResponse::failed("", format!("internal error: {e}"))
        });
    Json(response)
}

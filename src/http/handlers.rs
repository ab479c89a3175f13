//! Axum HTTP handlers exposing the latest sampling pass

use axum::{extract::State, Json};
use serde::Serialize;

use crate::metrics::Snapshot;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn samples(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.store.snapshot().await)
}

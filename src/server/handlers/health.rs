//! Liveness endpoint.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use super::super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub session_live: bool,
    pub launches: u64,
    pub cached_cities: usize,
}

/// Health check endpoint for container orchestration.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let sessions = state.service.sessions();
    Json(HealthResponse {
        status: "ok",
        session_live: sessions.is_live(),
        launches: sessions.launches(),
        cached_cities: state.service.cache().len(),
    })
}

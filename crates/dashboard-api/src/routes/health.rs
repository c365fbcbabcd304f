//! Liveness endpoint

use axum::{extract::State, Json};

use crate::dto::HealthResponse;
use crate::AppState;

/// GET /health - Version and which collaborators are configured
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::new(
        state.config().lifi.api_url.clone(),
        state.wallet().has_provider(),
    ))
}

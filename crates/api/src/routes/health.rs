use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

const SERVICE_NAME: &str = "questline-api";

/// Liveness payload for the progression service.
///
/// `status` drops to `degraded` when the stats store cannot be reached; the
/// endpoint itself still answers 200 so orchestrators can tell a slow
/// database from a dead process.
#[derive(Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = questline_db::health_check(&state.pool).await.is_ok();
    if !db_healthy {
        tracing::warn!("Health check could not reach the database");
    }

    Json(HealthResponse {
        service: SERVICE_NAME,
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

/// Mounted at the root, outside the authenticated `/api/v1` tree.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

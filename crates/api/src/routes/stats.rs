use axum::routing::{get, post};
use axum::Router;

use crate::handlers::stats;
use crate::state::AppState;

/// Routes mounted at `/stats`.
///
/// ```text
/// GET    /          -> get_stats
/// POST   /reset     -> reset_stats (mentor only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(stats::get_stats))
        .route("/reset", post(stats::reset_stats))
}

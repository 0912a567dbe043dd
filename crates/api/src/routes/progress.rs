use axum::routing::{get, post};
use axum::Router;

use crate::handlers::progress;
use crate::state::AppState;

/// Routes mounted at `/progress`.
///
/// ```text
/// GET    /              -> list_progress
/// GET    /{id}          -> get_progress
/// POST   /{id}/submit   -> submit_progress (mentee only)
/// POST   /{id}/review   -> review_progress (mentor only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(progress::list_progress))
        .route("/{id}", get(progress::get_progress))
        .route("/{id}/submit", post(progress::submit_progress))
        .route("/{id}/review", post(progress::review_progress))
}

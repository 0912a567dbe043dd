use axum::routing::get;
use axum::Router;

use crate::handlers::recognition;
use crate::state::AppState;

/// Recognition catalog routes, merged at the `/api/v1` root.
///
/// ```text
/// GET    /achievements  -> list_achievements
/// GET    /badges        -> list_badges
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/achievements", get(recognition::list_achievements))
        .route("/badges", get(recognition::list_badges))
}

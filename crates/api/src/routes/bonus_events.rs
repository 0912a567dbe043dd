use axum::routing::get;
use axum::Router;

use crate::handlers::bonus_event;
use crate::state::AppState;

/// Routes mounted at `/bonus-events`.
///
/// ```text
/// GET    /              -> list_bonus_events
/// POST   /              -> create_bonus_event (mentor only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(bonus_event::list_bonus_events).post(bonus_event::create_bonus_event),
    )
}

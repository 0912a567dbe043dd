use axum::routing::{get, post};
use axum::Router;

use crate::handlers::quest;
use crate::state::AppState;

/// Routes mounted at `/quests`.
///
/// ```text
/// GET    /              -> list_quests
/// POST   /              -> create_quest (mentor only)
/// GET    /{id}          -> get_quest
/// PUT    /{id}          -> update_quest (mentor only)
/// DELETE /{id}          -> delete_quest (mentor only, soft delete)
/// POST   /{id}/start    -> start_quest (mentee only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(quest::list_quests).post(quest::create_quest))
        .route(
            "/{id}",
            get(quest::get_quest)
                .put(quest::update_quest)
                .delete(quest::delete_quest),
        )
        .route("/{id}/start", post(quest::start_quest))
}

pub mod activity;
pub mod bonus_events;
pub mod health;
pub mod progress;
pub mod quests;
pub mod recognition;
pub mod stats;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /stats                        mentee stats, rank, streak status
/// /stats/reset                  reset progression (mentor, POST)
///
/// /quests                       list, create (mentor)
/// /quests/{id}                  get, update, archive (mentor)
/// /quests/{id}/start            start (mentee, POST)
///
/// /progress                     list with status / quest filters
/// /progress/{id}                get
/// /progress/{id}/submit         submit evidence (mentee, POST)
/// /progress/{id}/review         approve or reject (mentor, POST)
///
/// /achievements                 catalog with earned status
/// /badges                       catalog with earned status
///
/// /bonus-events                 list, create (mentor)
///
/// /activity                     most recent activity entries
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/stats", stats::router())
        .nest("/quests", quests::router())
        .nest("/progress", progress::router())
        // Achievements and badges share the recognition handlers.
        .merge(recognition::router())
        .nest("/bonus-events", bonus_events::router())
        .nest("/activity", activity::router())
}

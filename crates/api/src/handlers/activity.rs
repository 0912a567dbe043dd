//! Handler for the activity feed.

use axum::extract::{Query, State};
use axum::Json;
use questline_core::activity::clamp_limit;
use questline_db::models::activity_log::ActivityLogEntry;
use questline_db::repositories::ActivityLogRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/activity?limit=
///
/// Most recent first. `limit` defaults to 50 and is capped at 200.
pub async fn list_activity(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<ActivityLogEntry>>>> {
    let entries = ActivityLogRepo::list_recent(&state.pool, clamp_limit(params.limit)).await?;
    Ok(Json(DataResponse { data: entries }))
}

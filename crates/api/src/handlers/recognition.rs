//! Handlers for the achievement and badge catalogs.

use axum::extract::State;
use axum::Json;
use questline_core::achievement::RecognitionKind;
use questline_db::models::recognition::RecognitionWithStatus;
use questline_db::repositories::{MenteeStatsRepo, RecognitionRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

async fn list_with_status(
    state: &AppState,
    kind: RecognitionKind,
) -> AppResult<Vec<RecognitionWithStatus>> {
    let stats = MenteeStatsRepo::get(&state.pool).await?;
    Ok(RecognitionRepo::list_with_status(&state.pool, kind, stats.id).await?)
}

/// GET /api/v1/achievements
pub async fn list_achievements(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<RecognitionWithStatus>>>> {
    let data = list_with_status(&state, RecognitionKind::Achievement).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/badges
pub async fn list_badges(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<RecognitionWithStatus>>>> {
    let data = list_with_status(&state, RecognitionKind::Badge).await?;
    Ok(Json(DataResponse { data }))
}

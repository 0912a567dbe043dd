//! Handlers for quest progress: listing, submission and mentor review.

use axum::extract::{Path, Query, State};
use axum::Json;
use questline_core::error::CoreError;
use questline_core::quest::{QuestStatus, ReviewAction};
use questline_core::types::DbId;
use questline_db::models::quest_progress::{ProgressQuery, QuestProgress, SubmitQuest};
use questline_db::repositories::QuestProgressRepo;
use serde::Deserialize;
use validator::Validate;

use super::ensure_valid_id;
use crate::engine::ReviewOutcome;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireMentee, RequireMentor};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /progress/{id}/review`.
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewRequest {
    pub action: ReviewAction,
    #[validate(length(max = 4000))]
    pub feedback: Option<String>,
}

/// GET /api/v1/progress
///
/// Optional filters: `?status=in_progress|submitted|completed&quest_id=`.
pub async fn list_progress(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ProgressQuery>,
) -> AppResult<Json<DataResponse<Vec<QuestProgress>>>> {
    if let Some(status) = params.status.as_deref() {
        let parsed: QuestStatus = status
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Unknown status filter '{status}'")))?;
        if parsed == QuestStatus::Available {
            return Err(AppError::BadRequest(
                "'available' quests have no progress rows".into(),
            ));
        }
    }
    let rows = QuestProgressRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/progress/{id}
pub async fn get_progress(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<QuestProgress>>> {
    ensure_valid_id(id)?;
    let progress = QuestProgressRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "QuestProgress",
            id,
        }))?;
    Ok(Json(DataResponse { data: progress }))
}

/// POST /api/v1/progress/{id}/submit
pub async fn submit_progress(
    RequireMentee(auth): RequireMentee,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitQuest>,
) -> AppResult<Json<DataResponse<QuestProgress>>> {
    ensure_valid_id(id)?;
    input.validate()?;
    let progress = state.engine.submit_quest(id, &input).await?;
    tracing::debug!(user_id = auth.user_id, progress_id = id, "Submit request handled");
    Ok(Json(DataResponse { data: progress }))
}

/// POST /api/v1/progress/{id}/review
///
/// `{"action": "approve" | "reject", "feedback": "..."}`. Approval returns the
/// reward breakdown; rejection returns the progress row back in `in_progress`.
pub async fn review_progress(
    RequireMentor(auth): RequireMentor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<Json<DataResponse<ReviewOutcome>>> {
    ensure_valid_id(id)?;
    input.validate()?;
    let feedback = input
        .feedback
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty());

    let outcome = state.engine.review(id, input.action, feedback).await?;

    tracing::info!(
        user_id = auth.user_id,
        progress_id = id,
        action = ?input.action,
        "Quest reviewed"
    );
    Ok(Json(DataResponse { data: outcome }))
}

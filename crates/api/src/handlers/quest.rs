//! Handlers for the quest catalog.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use questline_core::activity::{action_types, entity_types};
use questline_core::error::CoreError;
use questline_core::quest;
use questline_core::roles::ROLE_MENTOR;
use questline_core::types::DbId;
use questline_db::models::activity_log::CreateActivity;
use questline_db::models::quest::{CreateQuest, Quest, UpdateQuest};
use questline_db::repositories::{ActivityLogRepo, QuestRepo};
use serde_json::json;
use validator::Validate;

use super::ensure_valid_id;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireMentee, RequireMentor};
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/quests
///
/// Archived quests are only listed for mentors passing `?include_inactive=true`.
pub async fn list_quests(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<Quest>>>> {
    let include_inactive = params.include_inactive && auth.role == ROLE_MENTOR;
    let quests = QuestRepo::list(&state.pool, include_inactive).await?;
    Ok(Json(DataResponse { data: quests }))
}

/// GET /api/v1/quests/{id}
pub async fn get_quest(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Quest>>> {
    ensure_valid_id(id)?;
    let quest = QuestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Quest", id }))?;
    Ok(Json(DataResponse { data: quest }))
}

/// POST /api/v1/quests
pub async fn create_quest(
    RequireMentor(auth): RequireMentor,
    State(state): State<AppState>,
    Json(input): Json<CreateQuest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    quest::validate_xp_reward(input.xp_reward)?;
    if let Some(unlock_at_xp) = input.unlock_at_xp {
        quest::validate_unlock_at_xp(unlock_at_xp)?;
    }

    let created = QuestRepo::create(&state.pool, &input).await?;
    ActivityLogRepo::append(
        &state.pool,
        &CreateActivity::new(
            action_types::QUEST_CREATED,
            entity_types::QUEST,
            created.id,
            json!({ "title": created.title, "xp_reward": created.xp_reward }),
        ),
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        quest_id = created.id,
        xp_reward = created.xp_reward,
        "Quest created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// PUT /api/v1/quests/{id}
pub async fn update_quest(
    RequireMentor(auth): RequireMentor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateQuest>,
) -> AppResult<Json<DataResponse<Quest>>> {
    ensure_valid_id(id)?;
    input.validate()?;
    if let Some(xp_reward) = input.xp_reward {
        quest::validate_xp_reward(xp_reward)?;
    }

    let updated = QuestRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Quest", id }))?;
    ActivityLogRepo::append(
        &state.pool,
        &CreateActivity::new(
            action_types::QUEST_UPDATED,
            entity_types::QUEST,
            id,
            json!({ "title": updated.title, "xp_reward": updated.xp_reward }),
        ),
    )
    .await?;

    tracing::info!(user_id = auth.user_id, quest_id = id, "Quest updated");
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/quests/{id}
///
/// Soft delete: the quest is deactivated and keeps its progress history.
pub async fn delete_quest(
    RequireMentor(auth): RequireMentor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ensure_valid_id(id)?;
    if !QuestRepo::archive(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Quest", id }));
    }
    ActivityLogRepo::append(
        &state.pool,
        &CreateActivity::new(action_types::QUEST_ARCHIVED, entity_types::QUEST, id, json!({})),
    )
    .await?;

    tracing::info!(user_id = auth.user_id, quest_id = id, "Quest archived");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/quests/{id}/start
pub async fn start_quest(
    RequireMentee(auth): RequireMentee,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_valid_id(id)?;
    let progress = state.engine.start_quest(id).await?;
    tracing::debug!(user_id = auth.user_id, progress_id = progress.id, "Start request handled");
    Ok((StatusCode::CREATED, Json(DataResponse { data: progress })))
}

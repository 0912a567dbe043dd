//! Handlers for bonus events.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use questline_core::activity::{action_types, entity_types};
use questline_core::bonus::{self, BonusEventType};
use questline_db::models::activity_log::CreateActivity;
use questline_db::models::bonus_event::{BonusEvent, CreateBonusEvent};
use questline_db::repositories::{ActivityLogRepo, BonusEventRepo};
use serde_json::json;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireMentor;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/bonus-events
pub async fn list_bonus_events(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<BonusEvent>>>> {
    let events = BonusEventRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: events }))
}

/// POST /api/v1/bonus-events
///
/// Once any event of a type exists, that type is governed by its events
/// alone and the configured default no longer applies.
pub async fn create_bonus_event(
    RequireMentor(auth): RequireMentor,
    State(state): State<AppState>,
    Json(input): Json<CreateBonusEvent>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let event_type: BonusEventType = input.event_type.parse()?;
    bonus::validate_event(
        input.multiplier,
        input.bonus_xp,
        input.starts_on,
        input.ends_on,
        &input.days_of_week,
    )?;

    let event = BonusEventRepo::create(&state.pool, &input).await?;
    ActivityLogRepo::append(
        &state.pool,
        &CreateActivity::new(
            action_types::BONUS_EVENT_CREATED,
            entity_types::BONUS_EVENT,
            event.id,
            json!({ "name": event.name, "event_type": event_type.as_str() }),
        ),
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        bonus_event_id = event.id,
        event_type = %event_type,
        "Bonus event created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

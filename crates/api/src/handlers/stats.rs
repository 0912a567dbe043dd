//! Handlers for the mentee's stats.

use axum::extract::State;
use axum::Json;
use questline_core::rank::RankProgress;
use questline_core::streak::{self, StreakView};
use questline_db::models::mentee_stats::MenteeStats;
use questline_db::repositories::MenteeStatsRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireMentor;
use crate::response::DataResponse;
use crate::state::AppState;

/// Stored stats plus the derived rank and read-only streak status.
#[derive(Debug, Serialize)]
pub struct StatsView {
    pub stats: MenteeStats,
    pub rank: RankProgress,
    pub streak: StreakView,
}

fn build_view(state: &AppState, stats: MenteeStats) -> StatsView {
    let engine = &state.engine;
    StatsView {
        rank: engine.config().ranks.derive(stats.total_xp),
        streak: streak::status(&stats.streak_state(), engine.clock().today()),
        stats,
    }
}

/// GET /api/v1/stats
///
/// Never writes: a lost streak is reported with an effective value of 0
/// while the stored value is only reset by the next approval.
pub async fn get_stats(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<StatsView>>> {
    let stats = MenteeStatsRepo::get(&state.pool).await?;
    Ok(Json(DataResponse {
        data: build_view(&state, stats),
    }))
}

/// POST /api/v1/stats/reset
pub async fn reset_stats(
    RequireMentor(auth): RequireMentor,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<StatsView>>> {
    let stats = state.engine.reset_stats().await?;
    tracing::info!(user_id = auth.user_id, "Stats reset by mentor");
    Ok(Json(DataResponse {
        data: build_view(&state, stats),
    }))
}

//! Quest progress entity.

use std::str::FromStr;

use questline_core::error::CoreError;
use questline_core::quest::QuestStatus;
use questline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `quest_progress` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestProgress {
    pub id: DbId,
    pub mentee_stats_id: DbId,
    pub quest_id: DbId,
    pub status: String,
    pub started_at: Timestamp,
    pub submitted_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub reviewed_at: Option<Timestamp>,
    pub evidence_links: Vec<String>,
    pub reflection: Option<String>,
    pub mentor_feedback: Option<String>,
    pub rejection_count: i32,
    pub xp_awarded: Option<i64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl QuestProgress {
    pub fn status(&self) -> Result<QuestStatus, CoreError> {
        QuestStatus::from_str(&self.status)
    }
}

/// DTO for submitting evidence on an in-progress quest.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitQuest {
    #[validate(length(min = 1, max = 20))]
    pub evidence_links: Vec<String>,
    pub reflection: Option<String>,
}

/// Filter parameters for listing progress rows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgressQuery {
    pub status: Option<String>,
    pub quest_id: Option<DbId>,
}

//! Quest catalog entity and DTOs.

use questline_core::quest::QuestGate;
use questline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `quests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quest {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub tier: i32,
    pub xp_reward: i64,
    pub unlock_at_xp: i64,
    pub is_lucky_quest: bool,
    pub lucky_multiplier: f64,
    pub is_locked: bool,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Quest {
    pub fn gate(&self) -> QuestGate {
        QuestGate {
            is_active: self.is_active,
            is_locked: self.is_locked,
            unlock_at_xp: self.unlock_at_xp,
        }
    }

    /// Multiplier to apply on approval, if this quest currently carries the lucky flag.
    pub fn active_lucky_multiplier(&self) -> Option<f64> {
        self.is_lucky_quest.then_some(self.lucky_multiplier)
    }
}

/// DTO for creating a new quest.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub category: Option<String>,
    #[validate(range(min = 1))]
    pub tier: Option<i32>,
    #[validate(range(min = 10, max = 1000))]
    pub xp_reward: i64,
    #[validate(range(min = 0))]
    pub unlock_at_xp: Option<i64>,
    pub is_locked: Option<bool>,
    pub sort_order: Option<i32>,
}

/// DTO for updating an existing quest. All fields are optional.
///
/// The lucky flag is owned by the rotator and cannot be patched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateQuest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub category: Option<String>,
    #[validate(range(min = 1))]
    pub tier: Option<i32>,
    #[validate(range(min = 10, max = 1000))]
    pub xp_reward: Option<i64>,
    #[validate(range(min = 0))]
    pub unlock_at_xp: Option<i64>,
    pub is_locked: Option<bool>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

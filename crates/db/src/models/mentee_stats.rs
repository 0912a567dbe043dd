//! The mentee's progression aggregate.

use questline_core::reward::ProgressSnapshot;
use questline_core::streak::StreakState;
use questline_core::types::{Day, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `mentee_stats` table.
///
/// `version` increments on every write; writers compare-and-swap on it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MenteeStats {
    pub id: DbId,
    pub total_xp: i64,
    pub level: i32,
    pub quests_completed: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub streak_freeze_available: bool,
    pub last_streak_date: Option<Day>,
    pub first_quest_today: bool,
    pub last_first_quest_date: Option<Day>,
    pub quests_toward_reward: i32,
    pub total_bonus_xp: i64,
    pub last_activity_at: Option<Timestamp>,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MenteeStats {
    pub fn streak_state(&self) -> StreakState {
        StreakState {
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            freeze_available: self.streak_freeze_available,
            last_streak_date: self.last_streak_date,
        }
    }

    /// The pure-domain view of this row consumed by the reward calculator.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total_xp: self.total_xp,
            level: self.level,
            quests_completed: self.quests_completed,
            streak: self.streak_state(),
            first_quest_today: self.first_quest_today,
            last_first_quest_date: self.last_first_quest_date,
            quests_toward_reward: self.quests_toward_reward,
            total_bonus_xp: self.total_bonus_xp,
        }
    }
}

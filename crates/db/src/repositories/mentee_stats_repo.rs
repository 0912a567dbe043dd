//! Repository for the singleton `mentee_stats` row.

use questline_core::reward::ProgressSnapshot;
use questline_core::types::{DbId, Timestamp};
use sqlx::PgExecutor;

use crate::models::mentee_stats::MenteeStats;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, total_xp, level, quests_completed, current_streak, longest_streak, \
    streak_freeze_available, last_streak_date, first_quest_today, \
    last_first_quest_date, quests_toward_reward, total_bonus_xp, \
    last_activity_at, version, created_at, updated_at";

/// Provides access to the mentee's progression aggregate.
pub struct MenteeStatsRepo;

impl MenteeStatsRepo {
    /// Fetch the mentee's stats row.
    ///
    /// The migrations seed exactly one row; the lowest id wins if more exist.
    pub async fn get<'e, E: PgExecutor<'e>>(executor: E) -> Result<MenteeStats, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM mentee_stats ORDER BY id LIMIT 1");
        sqlx::query_as::<_, MenteeStats>(&query)
            .fetch_one(executor)
            .await
    }

    /// Fetch and row-lock the stats row. Only meaningful inside a transaction.
    pub async fn lock<'e, E: PgExecutor<'e>>(executor: E) -> Result<MenteeStats, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM mentee_stats ORDER BY id LIMIT 1 FOR UPDATE");
        sqlx::query_as::<_, MenteeStats>(&query)
            .fetch_one(executor)
            .await
    }

    /// Write a new progression snapshot if the row is still at `expected_version`.
    ///
    /// Returns `None` when the version moved on, i.e. another writer won.
    pub async fn apply_snapshot<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        expected_version: i64,
        next: &ProgressSnapshot,
        now: Timestamp,
    ) -> Result<Option<MenteeStats>, sqlx::Error> {
        let query = format!(
            "UPDATE mentee_stats SET
                total_xp = $3,
                level = $4,
                quests_completed = $5,
                current_streak = $6,
                longest_streak = $7,
                streak_freeze_available = $8,
                last_streak_date = $9,
                first_quest_today = $10,
                last_first_quest_date = $11,
                quests_toward_reward = $12,
                total_bonus_xp = $13,
                last_activity_at = $14,
                version = version + 1
             WHERE id = $1 AND version = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MenteeStats>(&query)
            .bind(id)
            .bind(expected_version)
            .bind(next.total_xp)
            .bind(next.level)
            .bind(next.quests_completed)
            .bind(next.streak.current_streak)
            .bind(next.streak.longest_streak)
            .bind(next.streak.freeze_available)
            .bind(next.streak.last_streak_date)
            .bind(next.first_quest_today)
            .bind(next.last_first_quest_date)
            .bind(next.quests_toward_reward)
            .bind(next.total_bonus_xp)
            .bind(now)
            .fetch_optional(executor)
            .await
    }

    /// Administrative reset: zero every counter and restore the streak freeze.
    ///
    /// Earned achievements, badges and progress rows are left untouched.
    pub async fn reset<'e, E: PgExecutor<'e>>(executor: E, id: DbId) -> Result<Option<MenteeStats>, sqlx::Error> {
        let query = format!(
            "UPDATE mentee_stats SET
                total_xp = 0,
                level = 1,
                quests_completed = 0,
                current_streak = 0,
                longest_streak = 0,
                streak_freeze_available = TRUE,
                last_streak_date = NULL,
                first_quest_today = FALSE,
                last_first_quest_date = NULL,
                quests_toward_reward = 0,
                total_bonus_xp = 0,
                last_activity_at = NULL,
                version = version + 1
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MenteeStats>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}

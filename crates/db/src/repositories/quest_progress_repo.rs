//! Repository for the `quest_progress` table.
//!
//! Every transition is guarded by a `WHERE status = ...` predicate so a raced
//! transition returns `None` instead of applying twice.

use questline_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::quest_progress::{ProgressQuery, QuestProgress};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, mentee_stats_id, quest_id, status, started_at, submitted_at, \
    completed_at, reviewed_at, evidence_links, reflection, mentor_feedback, \
    rejection_count, xp_awarded, created_at, updated_at";

/// Provides lifecycle operations for quest progress rows.
pub struct QuestProgressRepo;

impl QuestProgressRepo {
    /// Find a progress row by id.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<QuestProgress>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quest_progress WHERE id = $1");
        sqlx::query_as::<_, QuestProgress>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find and row-lock a progress row. Only meaningful inside a transaction.
    pub async fn lock<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<QuestProgress>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quest_progress WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, QuestProgress>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find the mentee's progress on a quest, if any.
    pub async fn find_for_quest<'e, E: PgExecutor<'e>>(
        executor: E,
        mentee_stats_id: DbId,
        quest_id: DbId,
    ) -> Result<Option<QuestProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM quest_progress \
             WHERE mentee_stats_id = $1 AND quest_id = $2"
        );
        sqlx::query_as::<_, QuestProgress>(&query)
            .bind(mentee_stats_id)
            .bind(quest_id)
            .fetch_optional(executor)
            .await
    }

    /// List progress rows, most recently updated first.
    pub async fn list(pool: &PgPool, params: &ProgressQuery) -> Result<Vec<QuestProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM quest_progress
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::BIGINT IS NULL OR quest_id = $2)
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, QuestProgress>(&query)
            .bind(&params.status)
            .bind(params.quest_id)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Create an `in_progress` row. Returns `None` if one already exists.
    pub async fn start<'e, E: PgExecutor<'e>>(
        executor: E,
        mentee_stats_id: DbId,
        quest_id: DbId,
        now: Timestamp,
    ) -> Result<Option<QuestProgress>, sqlx::Error> {
        let query = format!(
            "INSERT INTO quest_progress (mentee_stats_id, quest_id, status, started_at)
             VALUES ($1, $2, 'in_progress', $3)
             ON CONFLICT ON CONSTRAINT uq_quest_progress_mentee_quest DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuestProgress>(&query)
            .bind(mentee_stats_id)
            .bind(quest_id)
            .bind(now)
            .fetch_optional(executor)
            .await
    }

    /// `in_progress -> submitted`. Evidence replaces any earlier submission.
    pub async fn submit<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        evidence_links: &[String],
        reflection: Option<&str>,
        now: Timestamp,
    ) -> Result<Option<QuestProgress>, sqlx::Error> {
        let query = format!(
            "UPDATE quest_progress SET
                status = 'submitted',
                evidence_links = $2,
                reflection = $3,
                submitted_at = $4
             WHERE id = $1 AND status = 'in_progress'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuestProgress>(&query)
            .bind(id)
            .bind(evidence_links)
            .bind(reflection)
            .bind(now)
            .fetch_optional(executor)
            .await
    }

    /// `submitted -> completed`, recording the XP the approval awarded.
    pub async fn complete<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        xp_awarded: i64,
        feedback: Option<&str>,
        now: Timestamp,
    ) -> Result<Option<QuestProgress>, sqlx::Error> {
        let query = format!(
            "UPDATE quest_progress SET
                status = 'completed',
                xp_awarded = $2,
                mentor_feedback = COALESCE($3, mentor_feedback),
                completed_at = $4,
                reviewed_at = $4
             WHERE id = $1 AND status = 'submitted'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuestProgress>(&query)
            .bind(id)
            .bind(xp_awarded)
            .bind(feedback)
            .bind(now)
            .fetch_optional(executor)
            .await
    }

    /// `submitted -> in_progress`. `started_at` is kept.
    pub async fn reject<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        feedback: Option<&str>,
        now: Timestamp,
    ) -> Result<Option<QuestProgress>, sqlx::Error> {
        let query = format!(
            "UPDATE quest_progress SET
                status = 'in_progress',
                mentor_feedback = $2,
                reviewed_at = $3,
                rejection_count = rejection_count + 1
             WHERE id = $1 AND status = 'submitted'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuestProgress>(&query)
            .bind(id)
            .bind(feedback)
            .bind(now)
            .fetch_optional(executor)
            .await
    }

    // -----------------------------------------------------------------------
    // Aggregates for requirement evaluation
    // -----------------------------------------------------------------------

    /// Completed quests per category.
    pub async fn completions_by_category<'e, E: PgExecutor<'e>>(
        executor: E,
        mentee_stats_id: DbId,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT q.category, COUNT(*)::BIGINT
             FROM quest_progress p
             JOIN quests q ON q.id = p.quest_id
             WHERE p.mentee_stats_id = $1 AND p.status = 'completed'
             GROUP BY q.category",
        )
        .bind(mentee_stats_id)
        .fetch_all(executor)
        .await
    }

    /// Completed quests per category, restricted to quests that are still active.
    pub async fn active_completions_by_category<'e, E: PgExecutor<'e>>(
        executor: E,
        mentee_stats_id: DbId,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT q.category, COUNT(*)::BIGINT
             FROM quest_progress p
             JOIN quests q ON q.id = p.quest_id
             WHERE p.mentee_stats_id = $1 AND p.status = 'completed' AND q.is_active
             GROUP BY q.category",
        )
        .bind(mentee_stats_id)
        .fetch_all(executor)
        .await
    }

    /// Completions with `completed_at >= since`.
    pub async fn completions_since<'e, E: PgExecutor<'e>>(
        executor: E,
        mentee_stats_id: DbId,
        since: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM quest_progress
             WHERE mentee_stats_id = $1 AND status = 'completed' AND completed_at >= $2",
        )
        .bind(mentee_stats_id)
        .bind(since)
        .fetch_one(executor)
        .await
    }

    /// Sum of rejections across every progress row.
    pub async fn total_rejections<'e, E: PgExecutor<'e>>(
        executor: E,
        mentee_stats_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(rejection_count), 0)::BIGINT FROM quest_progress
             WHERE mentee_stats_id = $1",
        )
        .bind(mentee_stats_id)
        .fetch_one(executor)
        .await
    }
}

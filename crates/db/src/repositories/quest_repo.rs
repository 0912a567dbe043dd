//! Repository for the `quests` table.

use questline_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::quest::{CreateQuest, Quest, UpdateQuest};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, title, description, category, tier, xp_reward, unlock_at_xp, \
    is_lucky_quest, lucky_multiplier, is_locked, is_active, sort_order, \
    created_at, updated_at";

/// Provides CRUD operations for the quest catalog.
pub struct QuestRepo;

impl QuestRepo {
    /// Insert a new quest, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateQuest) -> Result<Quest, sqlx::Error> {
        let query = format!(
            "INSERT INTO quests
                (title, description, category, tier, xp_reward, unlock_at_xp, is_locked, sort_order)
             VALUES ($1, $2, COALESCE($3, 'general'), COALESCE($4, 1), $5,
                     COALESCE($6, 0), COALESCE($7, FALSE), COALESCE($8, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Quest>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.tier)
            .bind(input.xp_reward)
            .bind(input.unlock_at_xp)
            .bind(input.is_locked)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Find a quest by id, including archived quests.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Quest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quests WHERE id = $1");
        sqlx::query_as::<_, Quest>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List quests ordered by tier, then `sort_order`, then id.
    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Quest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM quests
             WHERE is_active OR $1
             ORDER BY tier, sort_order, id"
        );
        sqlx::query_as::<_, Quest>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Update a quest. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateQuest,
    ) -> Result<Option<Quest>, sqlx::Error> {
        let query = format!(
            "UPDATE quests SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                tier = COALESCE($5, tier),
                xp_reward = COALESCE($6, xp_reward),
                unlock_at_xp = COALESCE($7, unlock_at_xp),
                is_locked = COALESCE($8, is_locked),
                is_active = COALESCE($9, is_active),
                sort_order = COALESCE($10, sort_order),
                is_lucky_quest = is_lucky_quest
                    AND COALESCE($9, is_active)
                    AND NOT COALESCE($8, is_locked)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Quest>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.tier)
            .bind(input.xp_reward)
            .bind(input.unlock_at_xp)
            .bind(input.is_locked)
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a quest. Archived quests also lose the lucky flag.
    ///
    /// Returns `true` if a row was archived, `false` if it did not exist
    /// or was already inactive.
    pub async fn archive(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE quests SET is_active = FALSE, is_lucky_quest = FALSE \
             WHERE id = $1 AND is_active",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count active quests per category, for mastery requirements.
    pub async fn active_counts_by_category<'e, E: PgExecutor<'e>>(
        executor: E,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT category, COUNT(*)::BIGINT FROM quests WHERE is_active GROUP BY category",
        )
        .fetch_all(executor)
        .await
    }

    // -----------------------------------------------------------------------
    // Lucky rotation
    // -----------------------------------------------------------------------

    /// Clear the lucky flag from every quest.
    pub async fn clear_lucky<'e, E: PgExecutor<'e>>(executor: E) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE quests SET is_lucky_quest = FALSE, lucky_multiplier = 1.0 WHERE is_lucky_quest",
        )
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Ids of quests eligible to become the lucky quest.
    pub async fn lucky_candidate_ids<'e, E: PgExecutor<'e>>(
        executor: E,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM quests WHERE is_active AND NOT is_locked ORDER BY id",
        )
        .fetch_all(executor)
        .await
    }

    /// Flag a quest as the lucky quest.
    pub async fn set_lucky<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        multiplier: f64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE quests SET is_lucky_quest = TRUE, lucky_multiplier = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(multiplier)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

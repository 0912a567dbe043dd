//! Repository for the append-only `activity_log` table.

use sqlx::{PgExecutor, PgPool};

use crate::models::activity_log::{ActivityLogEntry, CreateActivity};

/// Column list for `activity_log` SELECT queries.
const COLUMNS: &str = "id, action_type, entity_type, entity_id, details, created_at";

/// Provides append and read operations for the activity feed.
pub struct ActivityLogRepo;

impl ActivityLogRepo {
    /// Append one entry.
    pub async fn append<'e, E: PgExecutor<'e>>(
        executor: E,
        input: &CreateActivity,
    ) -> Result<ActivityLogEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO activity_log (action_type, entity_type, entity_id, details)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActivityLogEntry>(&query)
            .bind(&input.action_type)
            .bind(&input.entity_type)
            .bind(input.entity_id)
            .bind(&input.details)
            .fetch_one(executor)
            .await
    }

    /// Most recent entries first. `limit` must already be clamped.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<ActivityLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activity_log ORDER BY created_at DESC, id DESC LIMIT $1"
        );
        sqlx::query_as::<_, ActivityLogEntry>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Count entries with a given action type.
    pub async fn count_by_action<'e, E: PgExecutor<'e>>(
        executor: E,
        action_type: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM activity_log WHERE action_type = $1")
            .bind(action_type)
            .fetch_one(executor)
            .await
    }
}

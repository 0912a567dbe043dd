//! Repository for achievements, badges and their earned markers.

use questline_core::achievement::RecognitionKind;
use questline_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::recognition::{Recognition, RecognitionWithStatus};

/// Column list shared across definition queries.
const COLUMNS: &str = "\
    id, code, name, description, icon, requirement_type, requirement_value, \
    requirement_category, xp_bonus, created_at, updated_at";

/// Table names for one recognition kind.
struct Tables {
    definitions: &'static str,
    earned: &'static str,
    foreign_key: &'static str,
}

fn tables(kind: RecognitionKind) -> Tables {
    match kind {
        RecognitionKind::Achievement => Tables {
            definitions: "achievements",
            earned: "earned_achievements",
            foreign_key: "achievement_id",
        },
        RecognitionKind::Badge => Tables {
            definitions: "badges",
            earned: "earned_badges",
            foreign_key: "badge_id",
        },
    }
}

/// Provides catalog reads and idempotent grants for achievements and badges.
pub struct RecognitionRepo;

impl RecognitionRepo {
    /// List every definition of `kind` with the mentee's earned marker.
    pub async fn list_with_status(
        pool: &PgPool,
        kind: RecognitionKind,
        mentee_stats_id: DbId,
    ) -> Result<Vec<RecognitionWithStatus>, sqlx::Error> {
        let t = tables(kind);
        let query = format!(
            "SELECT d.id, d.code, d.name, d.description, d.icon, d.requirement_type,
                    d.requirement_value, d.requirement_category, d.xp_bonus,
                    (e.id IS NOT NULL) AS earned, e.earned_at
             FROM {defs} d
             LEFT JOIN {earned} e ON e.{fk} = d.id AND e.mentee_stats_id = $1
             ORDER BY d.id",
            defs = t.definitions,
            earned = t.earned,
            fk = t.foreign_key,
        );
        sqlx::query_as::<_, RecognitionWithStatus>(&query)
            .bind(mentee_stats_id)
            .fetch_all(pool)
            .await
    }

    /// Definitions of `kind` the mentee has not earned yet.
    pub async fn list_unearned<'e, E: PgExecutor<'e>>(
        executor: E,
        kind: RecognitionKind,
        mentee_stats_id: DbId,
    ) -> Result<Vec<Recognition>, sqlx::Error> {
        let t = tables(kind);
        let query = format!(
            "SELECT {COLUMNS} FROM {defs} d
             WHERE NOT EXISTS (
                 SELECT 1 FROM {earned} e
                 WHERE e.{fk} = d.id AND e.mentee_stats_id = $1
             )
             ORDER BY d.id",
            defs = t.definitions,
            earned = t.earned,
            fk = t.foreign_key,
        );
        sqlx::query_as::<_, Recognition>(&query)
            .bind(mentee_stats_id)
            .fetch_all(executor)
            .await
    }

    /// Record that the mentee earned a definition.
    ///
    /// Returns `true` only when a new row was inserted; an existing grant
    /// (including one inserted concurrently) yields `false`.
    pub async fn grant<'e, E: PgExecutor<'e>>(
        executor: E,
        kind: RecognitionKind,
        mentee_stats_id: DbId,
        definition_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let t = tables(kind);
        let query = format!(
            "INSERT INTO {earned} (mentee_stats_id, {fk}) VALUES ($1, $2) \
             ON CONFLICT (mentee_stats_id, {fk}) DO NOTHING",
            earned = t.earned,
            fk = t.foreign_key,
        );
        let result = sqlx::query(&query)
            .bind(mentee_stats_id)
            .bind(definition_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Number of earned rows of `kind` for the mentee.
    pub async fn count_earned<'e, E: PgExecutor<'e>>(
        executor: E,
        kind: RecognitionKind,
        mentee_stats_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let t = tables(kind);
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM {earned} WHERE mentee_stats_id = $1",
            earned = t.earned,
        );
        sqlx::query_scalar::<_, i64>(&query)
            .bind(mentee_stats_id)
            .fetch_one(executor)
            .await
    }
}

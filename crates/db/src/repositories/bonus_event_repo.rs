//! Repository for the `bonus_events` table.

use sqlx::{PgExecutor, PgPool};

use crate::models::bonus_event::{BonusEvent, CreateBonusEvent};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, name, event_type, multiplier, bonus_xp, starts_on, ends_on, \
    days_of_week, is_active, created_at, updated_at";

/// Provides access to the bonus event catalog.
pub struct BonusEventRepo;

impl BonusEventRepo {
    /// Insert a new bonus event, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateBonusEvent) -> Result<BonusEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO bonus_events
                (name, event_type, multiplier, bonus_xp, starts_on, ends_on, days_of_week, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BonusEvent>(&query)
            .bind(&input.name)
            .bind(&input.event_type)
            .bind(input.multiplier)
            .bind(input.bonus_xp)
            .bind(input.starts_on)
            .bind(input.ends_on)
            .bind(&input.days_of_week)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// List every bonus event, active or not. Inactive rows still matter to
    /// the resolver: their presence switches a type off its default.
    pub async fn list<'e, E: PgExecutor<'e>>(executor: E) -> Result<Vec<BonusEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bonus_events ORDER BY id");
        sqlx::query_as::<_, BonusEvent>(&query)
            .fetch_all(executor)
            .await
    }
}

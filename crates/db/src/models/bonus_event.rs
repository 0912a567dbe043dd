//! Configurable bonus events (weekend multipliers, first-quest-of-day bonuses).

use questline_core::bonus::{weekday_from_iso, BonusEventRule, BonusEventType};
use questline_core::error::CoreError;
use questline_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `bonus_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BonusEvent {
    pub id: DbId,
    pub name: String,
    pub event_type: String,
    pub multiplier: Option<f64>,
    pub bonus_xp: Option<i64>,
    pub starts_on: Option<Day>,
    pub ends_on: Option<Day>,
    pub days_of_week: Vec<i16>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BonusEvent {
    /// Convert the row into the rule shape the bonus resolver works with.
    pub fn to_rule(&self) -> Result<BonusEventRule, CoreError> {
        let event_type: BonusEventType = self.event_type.parse()?;
        let days_of_week = self
            .days_of_week
            .iter()
            .map(|&n| {
                weekday_from_iso(n).ok_or_else(|| {
                    CoreError::Internal(format!("bonus event {} has invalid weekday {n}", self.id))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BonusEventRule {
            event_type,
            multiplier: self.multiplier,
            bonus_xp: self.bonus_xp,
            starts_on: self.starts_on,
            ends_on: self.ends_on,
            days_of_week,
            is_active: self.is_active,
        })
    }
}

/// DTO for creating a bonus event.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBonusEvent {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub event_type: String,
    pub multiplier: Option<f64>,
    pub bonus_xp: Option<i64>,
    pub starts_on: Option<Day>,
    pub ends_on: Option<Day>,
    #[serde(default)]
    pub days_of_week: Vec<i16>,
    pub is_active: Option<bool>,
}

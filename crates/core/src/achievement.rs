//! Achievement and badge requirements.
//!
//! Requirements are stored as a `(requirement_type, requirement_value,
//! requirement_category)` triple and parsed into [`Requirement`] before
//! evaluation. Evaluation is pure: the caller gathers an
//! [`EvaluationContext`] from freshly updated aggregates and the
//! just-approved completion, then grants whatever [`evaluate`] returns.

use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

use crate::error::CoreError;
use crate::reward::{BonusKind, BonusLine};
use crate::types::DbId;

/// Local hour at which the night-owl window opens.
pub const NIGHT_OWL_START_HOUR: u32 = 22;

/// Local hour at which the night-owl window closes (exclusive).
pub const NIGHT_OWL_END_HOUR: u32 = 5;

/// Known requirement type strings.
pub mod requirement_types {
    pub const TOTAL_XP: &str = "total_xp";
    pub const LEVEL: &str = "level";
    pub const QUESTS_COMPLETED: &str = "quests_completed";
    pub const STREAK: &str = "streak";
    pub const CATEGORY_COMPLETIONS: &str = "category_completions";
    pub const CATEGORY_MASTERY: &str = "category_mastery";
    pub const NIGHT_OWL: &str = "night_owl";
    pub const DAILY_HUSTLE: &str = "daily_hustle";
    pub const FLAWLESS: &str = "flawless";
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequirementError {
    #[error("Unknown requirement type '{0}'")]
    UnknownType(String),

    #[error("Requirement '{0}' needs a positive requirement_value")]
    MissingValue(&'static str),

    #[error("Requirement '{0}' needs a requirement_category")]
    MissingCategory(&'static str),
}

impl From<RequirementError> for CoreError {
    fn from(err: RequirementError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

/// A typed requirement predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Requirement {
    TotalXp { min: i64 },
    Level { min: i64 },
    QuestsCompleted { min: i64 },
    Streak { min: i64 },
    CategoryCompletions { category: String, min: i64 },
    /// Every active quest in the category has been completed.
    CategoryMastery { category: String },
    /// The completion happened between 22:00 and 05:00 local time.
    NightOwl,
    /// At least `min` completions since local midnight.
    DailyHustle { min: i64 },
    /// No rejection ever, across at least `min_completions` completions.
    Flawless { min_completions: i64 },
}

impl Requirement {
    /// Parse the stored triple into a typed requirement.
    pub fn parse(
        requirement_type: &str,
        value: Option<i64>,
        category: Option<&str>,
    ) -> Result<Self, RequirementError> {
        use requirement_types as t;

        let positive = |name: &'static str| {
            value
                .filter(|v| *v > 0)
                .ok_or(RequirementError::MissingValue(name))
        };
        let named_category = |name: &'static str| {
            category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .ok_or(RequirementError::MissingCategory(name))
        };

        Ok(match requirement_type {
            t::TOTAL_XP => Self::TotalXp { min: positive(t::TOTAL_XP)? },
            t::LEVEL => Self::Level { min: positive(t::LEVEL)? },
            t::QUESTS_COMPLETED => Self::QuestsCompleted {
                min: positive(t::QUESTS_COMPLETED)?,
            },
            t::STREAK => Self::Streak { min: positive(t::STREAK)? },
            t::CATEGORY_COMPLETIONS => Self::CategoryCompletions {
                category: named_category(t::CATEGORY_COMPLETIONS)?,
                min: positive(t::CATEGORY_COMPLETIONS)?,
            },
            t::CATEGORY_MASTERY => Self::CategoryMastery {
                category: named_category(t::CATEGORY_MASTERY)?,
            },
            t::NIGHT_OWL => Self::NightOwl,
            t::DAILY_HUSTLE => Self::DailyHustle {
                min: value.filter(|v| *v > 0).unwrap_or(3),
            },
            t::FLAWLESS => Self::Flawless {
                min_completions: positive(t::FLAWLESS)?,
            },
            other => return Err(RequirementError::UnknownType(other.to_string())),
        })
    }

    /// Whether the requirement holds for `ctx`.
    pub fn is_met(&self, ctx: &EvaluationContext) -> bool {
        match self {
            Self::TotalXp { min } => ctx.total_xp >= *min,
            Self::Level { min } => i64::from(ctx.level) >= *min,
            Self::QuestsCompleted { min } => i64::from(ctx.quests_completed) >= *min,
            Self::Streak { min } => i64::from(ctx.current_streak) >= *min,
            Self::CategoryCompletions { category, min } => {
                ctx.category_completions.get(category).copied().unwrap_or(0) >= *min
            }
            Self::CategoryMastery { category } => {
                let total = ctx.category_totals.get(category).copied().unwrap_or(0);
                let done = ctx
                    .active_category_completions
                    .get(category)
                    .copied()
                    .unwrap_or(0);
                total > 0 && done >= total
            }
            Self::NightOwl => {
                let hour = ctx.completed_at.hour();
                hour >= NIGHT_OWL_START_HOUR || hour < NIGHT_OWL_END_HOUR
            }
            Self::DailyHustle { min } => ctx.completions_today >= *min,
            Self::Flawless { min_completions } => {
                ctx.total_rejections == 0 && i64::from(ctx.quests_completed) >= *min_completions
            }
        }
    }
}

/// Aggregates observed right after the approval's stats were persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationContext {
    pub total_xp: i64,
    pub level: i32,
    pub quests_completed: i32,
    pub current_streak: i32,
    /// Completed quests per category.
    pub category_completions: HashMap<String, i64>,
    /// Completed quests per category, counting only quests still active.
    /// Mastery compares this against `category_totals`.
    pub active_category_completions: HashMap<String, i64>,
    /// Active quests per category.
    pub category_totals: HashMap<String, i64>,
    /// Local wall-clock time of the approval being evaluated.
    pub completed_at: NaiveDateTime,
    /// Completions approved since local midnight, including this one.
    pub completions_today: i64,
    /// Rejections across all progress rows, ever.
    pub total_rejections: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionKind {
    Achievement,
    Badge,
}

impl RecognitionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Achievement => "achievement",
            Self::Badge => "badge",
        }
    }
}

impl fmt::Display for RecognitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An achievement or badge definition ready for evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecognitionDefinition {
    pub id: DbId,
    pub kind: RecognitionKind,
    pub code: String,
    pub name: String,
    pub requirement: Requirement,
    pub xp_bonus: i64,
}

impl RecognitionDefinition {
    /// Breakdown line shown next to the reward bonuses.
    ///
    /// Achievements and badges share the `achievement` line type; the label
    /// carries the definition's name.
    pub fn breakdown_line(&self) -> BonusLine {
        BonusLine {
            kind: BonusKind::Achievement,
            label: self.name.clone(),
            xp: self.xp_bonus.max(0),
        }
    }
}

/// Return the definitions from `unearned` whose requirement holds.
pub fn evaluate<'a>(
    unearned: &'a [RecognitionDefinition],
    ctx: &EvaluationContext,
) -> Vec<&'a RecognitionDefinition> {
    unearned
        .iter()
        .filter(|def| def.requirement.is_met(ctx))
        .collect()
}

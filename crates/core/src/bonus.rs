//! Bonus rules consulted by the reward calculator.
//!
//! Defaults come from configuration. Persisted bonus events of a given type
//! take over that type entirely once at least one exists in the catalog: the
//! bonus then applies only on days where an active event's window and weekday
//! filter match. This lets the mentor tune or switch off a bonus without a
//! redeploy.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Day;

/// Default multiplier applied on weekend days.
pub const DEFAULT_WEEKEND_MULTIPLIER: f64 = 2.0;

/// Default flat bonus for the first approved quest of a day.
pub const DEFAULT_FIRST_DAILY_BONUS: i64 = 25;

/// Default streak bonus steps as `(min_streak, bonus_xp)`.
pub const DEFAULT_STREAK_STEPS: &[(i32, i64)] = &[(2, 100), (3, 200)];

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusEventType {
    FirstDaily,
    Weekend,
}

impl BonusEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstDaily => "first_daily",
            Self::Weekend => "weekend",
        }
    }
}

impl fmt::Display for BonusEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BonusEventType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_daily" => Ok(Self::FirstDaily),
            "weekend" => Ok(Self::Weekend),
            other => Err(CoreError::Validation(format!(
                "Unknown bonus event type '{other}'. Must be one of: first_daily, weekend"
            ))),
        }
    }
}

/// A declarative bonus rule as stored in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct BonusEventRule {
    pub event_type: BonusEventType,
    pub multiplier: Option<f64>,
    pub bonus_xp: Option<i64>,
    pub starts_on: Option<Day>,
    pub ends_on: Option<Day>,
    /// Empty means every day.
    pub days_of_week: Vec<Weekday>,
    pub is_active: bool,
}

impl BonusEventRule {
    /// Whether this rule is in effect on `day`.
    pub fn applies_on(&self, day: Day) -> bool {
        self.is_active
            && self.starts_on.map_or(true, |start| day >= start)
            && self.ends_on.map_or(true, |end| day <= end)
            && (self.days_of_week.is_empty() || self.days_of_week.contains(&day.weekday()))
    }
}

/// Validate the optional fields of a bonus event before it is stored.
pub fn validate_event(
    multiplier: Option<f64>,
    bonus_xp: Option<i64>,
    starts_on: Option<Day>,
    ends_on: Option<Day>,
    days_of_week: &[i16],
) -> Result<(), CoreError> {
    if let Some(m) = multiplier {
        if !m.is_finite() || m < 1.0 {
            return Err(CoreError::Validation(format!(
                "Bonus multiplier must be at least 1.0, got {m}"
            )));
        }
    }
    if let Some(xp) = bonus_xp {
        if xp < 0 {
            return Err(CoreError::Validation(format!(
                "Bonus XP must not be negative, got {xp}"
            )));
        }
    }
    if let (Some(start), Some(end)) = (starts_on, ends_on) {
        if end < start {
            return Err(CoreError::Validation(format!(
                "Bonus window ends ({end}) before it starts ({start})"
            )));
        }
    }
    if let Some(bad) = days_of_week.iter().find(|d| !(1..=7).contains(*d)) {
        return Err(CoreError::Validation(format!(
            "Day of week must be an ISO number 1-7, got {bad}"
        )));
    }
    Ok(())
}

/// Convert an ISO weekday number (Monday = 1) to [`Weekday`].
pub fn weekday_from_iso(n: i16) -> Option<Weekday> {
    match n {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Streak bonus table
// ---------------------------------------------------------------------------

/// Monotone step function from streak length to bonus XP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakBonusTable {
    steps: Vec<(i32, i64)>,
}

impl Default for StreakBonusTable {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STREAK_STEPS.to_vec(),
        }
    }
}

impl StreakBonusTable {
    /// Steps must have strictly increasing streak lengths and non-decreasing,
    /// non-negative bonuses.
    pub fn new(steps: Vec<(i32, i64)>) -> Result<Self, CoreError> {
        if let Some((min, bonus)) = steps.iter().find(|(min, bonus)| *min < 1 || *bonus < 0) {
            return Err(CoreError::Validation(format!(
                "Invalid streak step {min}:{bonus}; streak must be >= 1 and bonus >= 0"
            )));
        }
        if steps
            .windows(2)
            .any(|w| w[1].0 <= w[0].0 || w[1].1 < w[0].1)
        {
            return Err(CoreError::Validation(
                "Streak steps must increase in length and never decrease in bonus".into(),
            ));
        }
        Ok(Self { steps })
    }

    /// Parse `"2:100,3:200"`.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let steps = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|entry| {
                let parsed = entry
                    .split_once(':')
                    .and_then(|(a, b)| Some((a.trim().parse().ok()?, b.trim().parse().ok()?)));
                parsed.ok_or_else(|| {
                    CoreError::Validation(format!("Streak step '{entry}' must be MIN_STREAK:BONUS"))
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;
        Self::new(steps)
    }

    /// Bonus for a streak of `streak` days; 0 below the first step.
    pub fn bonus_for(&self, streak: i32) -> i64 {
        self.steps
            .iter()
            .rev()
            .find(|(min, _)| streak >= *min)
            .map_or(0, |(_, bonus)| *bonus)
    }
}

// ---------------------------------------------------------------------------
// Resolved rule set
// ---------------------------------------------------------------------------

/// Configured fallbacks used when the catalog has no event of a type.
#[derive(Debug, Clone, PartialEq)]
pub struct BonusDefaults {
    pub weekend_multiplier: f64,
    pub first_daily_bonus: i64,
    pub streak_table: StreakBonusTable,
}

impl Default for BonusDefaults {
    fn default() -> Self {
        Self {
            weekend_multiplier: DEFAULT_WEEKEND_MULTIPLIER,
            first_daily_bonus: DEFAULT_FIRST_DAILY_BONUS,
            streak_table: StreakBonusTable::default(),
        }
    }
}

/// Bonus rules resolved for one specific day.
#[derive(Debug, Clone, PartialEq)]
pub struct BonusRuleSet {
    /// Weekend multiplier in effect today, if any.
    pub weekend_multiplier: Option<f64>,
    /// First-daily bonus in effect today, if any.
    pub first_daily_bonus: Option<i64>,
    pub streak_table: StreakBonusTable,
}

impl BonusRuleSet {
    /// Resolve the rules for `day` from defaults and the event catalog.
    pub fn resolve(
        defaults: &BonusDefaults,
        events: &[BonusEventRule],
        day: Day,
        is_weekend: bool,
    ) -> Self {
        let weekend_multiplier = if is_weekend {
            resolve_type(events, BonusEventType::Weekend, day, |e| {
                e.multiplier.unwrap_or(defaults.weekend_multiplier)
            })
            .unwrap_or(Some(defaults.weekend_multiplier))
            .filter(|m| *m > 1.0)
        } else {
            None
        };

        let first_daily_bonus = resolve_type(events, BonusEventType::FirstDaily, day, |e| {
            e.bonus_xp.unwrap_or(defaults.first_daily_bonus)
        })
        .unwrap_or(Some(defaults.first_daily_bonus))
        .filter(|xp| *xp > 0);

        Self {
            weekend_multiplier,
            first_daily_bonus,
            streak_table: defaults.streak_table.clone(),
        }
    }
}

/// `None` when the catalog has no event of `event_type` (use the default);
/// `Some(None)` when events exist but none applies today; otherwise the
/// largest value among applicable events.
fn resolve_type<T: PartialOrd + Copy>(
    events: &[BonusEventRule],
    event_type: BonusEventType,
    day: Day,
    value: impl Fn(&BonusEventRule) -> T,
) -> Option<Option<T>> {
    let mut of_type = events.iter().filter(|e| e.event_type == event_type).peekable();
    of_type.peek()?;
    Some(
        of_type
            .filter(|e| e.applies_on(day))
            .map(value)
            .fold(None, |best: Option<T>, v| match best {
                Some(b) if b >= v => Some(b),
                _ => Some(v),
            }),
    )
}

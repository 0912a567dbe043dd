//! Tunable progression settings.
//!
//! All fields have defaults matching the documented rules. The API loads
//! overrides from the environment through [`ProgressionConfig::from_env`].

use crate::bonus::{BonusDefaults, StreakBonusTable, DEFAULT_FIRST_DAILY_BONUS, DEFAULT_WEEKEND_MULTIPLIER};
use crate::clock::{parse_weekdays, Calendar};
use crate::error::CoreError;
use crate::quest::LUCKY_MULTIPLIER;
use crate::rank::{RankTable, DEFAULT_TOP_RANK_SPAN};
use crate::reward::DEFAULT_REWARD_INTERVAL;

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionConfig {
    pub ranks: RankTable,
    pub bonuses: BonusDefaults,
    pub reward_interval: i32,
    pub lucky_multiplier: f64,
    pub calendar: Calendar,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            ranks: RankTable::default(),
            bonuses: BonusDefaults::default(),
            reward_interval: DEFAULT_REWARD_INTERVAL,
            lucky_multiplier: LUCKY_MULTIPLIER,
            calendar: Calendar::default(),
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, CoreError> {
    raw.trim()
        .parse()
        .map_err(|_| CoreError::Validation(format!("{key} has an invalid value '{raw}'")))
}

impl ProgressionConfig {
    /// Load overrides from process environment variables.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from a key lookup, falling back to defaults.
    ///
    /// | Key                  | Default                                         |
    /// |----------------------|-------------------------------------------------|
    /// | `RANK_THRESHOLDS`    | `ROOKIE:0,APPRENTICE:500,PRO:1500,ELITE:3500,LEGEND:7000` |
    /// | `TOP_RANK_SPAN`      | `5000`                                          |
    /// | `STREAK_BONUSES`     | `2:100,3:200`                                   |
    /// | `FIRST_DAILY_BONUS`  | `25`                                            |
    /// | `WEEKEND_MULTIPLIER` | `2.0`                                           |
    /// | `REWARD_INTERVAL`    | `10`                                            |
    /// | `LUCKY_MULTIPLIER`   | `1.5`                                           |
    /// | `UTC_OFFSET_MINUTES` | `0`                                             |
    /// | `WEEKEND_DAYS`       | `sat,sun`                                       |
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let top_rank_span = match lookup("TOP_RANK_SPAN") {
            Some(raw) => parse_number("TOP_RANK_SPAN", &raw)?,
            None => DEFAULT_TOP_RANK_SPAN,
        };
        let ranks = match lookup("RANK_THRESHOLDS") {
            Some(raw) => RankTable::parse(&raw, top_rank_span)?,
            None => RankTable::new(RankTable::default().tiers().to_vec(), top_rank_span)?,
        };

        let streak_table = match lookup("STREAK_BONUSES") {
            Some(raw) => StreakBonusTable::parse(&raw)?,
            None => StreakBonusTable::default(),
        };
        let first_daily_bonus: i64 = match lookup("FIRST_DAILY_BONUS") {
            Some(raw) => parse_number("FIRST_DAILY_BONUS", &raw)?,
            None => DEFAULT_FIRST_DAILY_BONUS,
        };
        let weekend_multiplier: f64 = match lookup("WEEKEND_MULTIPLIER") {
            Some(raw) => parse_number("WEEKEND_MULTIPLIER", &raw)?,
            None => DEFAULT_WEEKEND_MULTIPLIER,
        };
        if first_daily_bonus < 0 || !weekend_multiplier.is_finite() || weekend_multiplier < 1.0 {
            return Err(CoreError::Validation(
                "FIRST_DAILY_BONUS must be >= 0 and WEEKEND_MULTIPLIER must be >= 1.0".into(),
            ));
        }

        let reward_interval: i32 = match lookup("REWARD_INTERVAL") {
            Some(raw) => parse_number("REWARD_INTERVAL", &raw)?,
            None => DEFAULT_REWARD_INTERVAL,
        };
        if reward_interval < 1 {
            return Err(CoreError::Validation("REWARD_INTERVAL must be at least 1".into()));
        }

        let lucky_multiplier: f64 = match lookup("LUCKY_MULTIPLIER") {
            Some(raw) => parse_number("LUCKY_MULTIPLIER", &raw)?,
            None => LUCKY_MULTIPLIER,
        };
        if !lucky_multiplier.is_finite() || lucky_multiplier <= 1.0 {
            return Err(CoreError::Validation("LUCKY_MULTIPLIER must be greater than 1.0".into()));
        }

        let utc_offset_minutes: i32 = match lookup("UTC_OFFSET_MINUTES") {
            Some(raw) => parse_number("UTC_OFFSET_MINUTES", &raw)?,
            None => 0,
        };
        let weekend_days = match lookup("WEEKEND_DAYS") {
            Some(raw) => parse_weekdays(&raw)?,
            None => Calendar::default().weekend_days,
        };

        Ok(Self {
            ranks,
            bonuses: BonusDefaults {
                weekend_multiplier,
                first_daily_bonus,
                streak_table,
            },
            reward_interval,
            lucky_multiplier,
            calendar: Calendar::new(utc_offset_minutes, weekend_days)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Weekday;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_lookup_yields_defaults() {
        let config = ProgressionConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ProgressionConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = ProgressionConfig::from_lookup(lookup(&[
            ("RANK_THRESHOLDS", "NOVICE:0,MASTER:1000"),
            ("STREAK_BONUSES", "2:50,5:300"),
            ("FIRST_DAILY_BONUS", "40"),
            ("REWARD_INTERVAL", "5"),
            ("UTC_OFFSET_MINUTES", "-300"),
            ("WEEKEND_DAYS", "fri,sat"),
        ]))
        .unwrap();
        assert_eq!(config.ranks.tiers().len(), 2);
        assert_eq!(config.bonuses.streak_table.bonus_for(5), 300);
        assert_eq!(config.bonuses.first_daily_bonus, 40);
        assert_eq!(config.reward_interval, 5);
        assert_eq!(config.calendar.weekend_days, vec![Weekday::Fri, Weekday::Sat]);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(ProgressionConfig::from_lookup(lookup(&[("REWARD_INTERVAL", "0")])).is_err());
        assert!(ProgressionConfig::from_lookup(lookup(&[("LUCKY_MULTIPLIER", "1.0")])).is_err());
        assert!(ProgressionConfig::from_lookup(lookup(&[("WEEKEND_MULTIPLIER", "0.5")])).is_err());
        assert!(ProgressionConfig::from_lookup(lookup(&[("TOP_RANK_SPAN", "abc")])).is_err());
        assert!(ProgressionConfig::from_lookup(lookup(&[("RANK_THRESHOLDS", "A:0,B:0")])).is_err());
        assert!(
            ProgressionConfig::from_lookup(lookup(&[("UTC_OFFSET_MINUTES", "2000000000")])).is_err()
        );
    }
}

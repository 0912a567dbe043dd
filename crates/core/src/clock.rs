//! Injectable clock and calendar.
//!
//! The progression rules never read the system time directly. Handlers
//! hold an `Arc<dyn Clock>` so tests can pin "today" to a known weekday.

use chrono::{
    Datelike, FixedOffset, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc, Weekday,
};

use crate::error::CoreError;
use crate::types::{Day, Timestamp};

/// Local calendar used to turn UTC instants into whole days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    /// Offset of the mentee's local day from UTC.
    pub utc_offset: FixedOffset,
    /// Days that count as the weekend for the weekend bonus.
    pub weekend_days: Vec<Weekday>,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
            weekend_days: vec![Weekday::Sat, Weekday::Sun],
        }
    }
}

impl Calendar {
    /// Build a calendar from an offset in minutes east of UTC.
    pub fn new(utc_offset_minutes: i32, weekend_days: Vec<Weekday>) -> Result<Self, CoreError> {
        let utc_offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "UTC offset of {utc_offset_minutes} minutes is out of range"
                ))
            })?;
        Ok(Self {
            utc_offset,
            weekend_days,
        })
    }

    /// Convert a UTC instant to local wall-clock time.
    pub fn local(&self, instant: Timestamp) -> NaiveDateTime {
        instant.with_timezone(&self.utc_offset).naive_local()
    }

    pub fn is_weekend(&self, day: Day) -> bool {
        self.weekend_days.contains(&day.weekday())
    }

    /// UTC instant of the most recent local midnight at or before `instant`.
    pub fn start_of_local_day(&self, instant: Timestamp) -> Timestamp {
        let local = self.local(instant);
        instant - (local - local.date().and_time(NaiveTime::MIN))
    }
}

/// Source of the current time plus the calendar used to interpret it.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> Timestamp;

    fn calendar(&self) -> &Calendar;

    /// Current local wall-clock time.
    fn local_now(&self) -> NaiveDateTime {
        self.calendar().local(self.now())
    }

    /// Current local calendar day.
    fn today(&self) -> Day {
        self.local_now().date()
    }

    fn is_weekend(&self, day: Day) -> bool {
        self.calendar().is_weekend(day)
    }
}

/// Wall clock backed by [`Utc::now`].
#[derive(Debug, Clone, Default)]
pub struct SystemClock {
    calendar: Calendar,
}

impl SystemClock {
    pub fn new(calendar: Calendar) -> Self {
        Self { calendar }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }

    fn calendar(&self) -> &Calendar {
        &self.calendar
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Timestamp,
    calendar: Calendar,
}

impl FixedClock {
    pub fn at(now: Timestamp) -> Self {
        Self {
            now,
            calendar: Calendar::default(),
        }
    }

    /// Noon UTC on `day` with the default calendar.
    pub fn on(day: Day) -> Self {
        let midnight = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
        Self::at(midnight + TimeDelta::hours(12))
    }

    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now
    }

    fn calendar(&self) -> &Calendar {
        &self.calendar
    }
}

/// Parse a comma-separated weekday list such as `"sat,sun"`.
pub fn parse_weekdays(raw: &str) -> Result<Vec<Weekday>, CoreError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Weekday>()
                .map_err(|_| CoreError::Validation(format!("Unknown weekday '{s}'")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> Day {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fixed_clock_reports_its_day() {
        let clock = FixedClock::on(day(2024, 6, 15));
        assert_eq!(clock.today(), day(2024, 6, 15));
    }

    #[test]
    fn default_calendar_weekend_is_saturday_and_sunday() {
        let clock = FixedClock::on(day(2024, 6, 15));
        assert!(clock.is_weekend(day(2024, 6, 15)));
        assert!(clock.is_weekend(day(2024, 6, 16)));
        assert!(!clock.is_weekend(day(2024, 6, 17)));
    }

    #[test]
    fn start_of_local_day_honours_offset() {
        let calendar = Calendar::new(-300, vec![]).unwrap();
        let instant = Utc.with_ymd_and_hms(2024, 6, 17, 3, 0, 0).unwrap();
        // 03:00 UTC is 22:00 on the 16th at UTC-5, so the day began at 05:00 UTC on the 16th.
        assert_eq!(
            calendar.start_of_local_day(instant),
            Utc.with_ymd_and_hms(2024, 6, 16, 5, 0, 0).unwrap()
        );
        assert_eq!(
            Calendar::default().start_of_local_day(instant),
            Utc.with_ymd_and_hms(2024, 6, 17, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn custom_weekend_days() {
        let calendar = Calendar::new(0, vec![Weekday::Fri, Weekday::Sat]).unwrap();
        assert!(calendar.is_weekend(day(2024, 6, 14)));
        assert!(!calendar.is_weekend(day(2024, 6, 16)));
    }

    #[test]
    fn positive_offset_rolls_into_next_day() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 15, 23, 30, 0).unwrap();
        let calendar = Calendar::new(120, vec![]).unwrap();
        let clock = FixedClock::at(instant).with_calendar(calendar);
        assert_eq!(clock.today(), day(2024, 6, 16));
        assert_eq!(clock.local_now().time(), NaiveTime::from_hms_opt(1, 30, 0).unwrap());
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        assert!(Calendar::new(24 * 60, vec![]).is_err());
        // Large enough to overflow when converted to seconds.
        assert!(Calendar::new(i32::MAX, vec![]).is_err());
        assert!(Calendar::new(i32::MIN, vec![]).is_err());
    }

    #[test]
    fn parse_weekdays_accepts_short_and_long_names() {
        let days = parse_weekdays("sat, Sunday").unwrap();
        assert_eq!(days, vec![Weekday::Sat, Weekday::Sun]);
    }

    #[test]
    fn parse_weekdays_rejects_garbage() {
        assert!(parse_weekdays("sat,someday").is_err());
    }
}

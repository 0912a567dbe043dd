//! Daily streak tracking with a single-use freeze token.
//!
//! [`advance`] is the mutating rule applied once per approval.
//! [`status`] is the read-only dashboard view; it never changes stored state.

use serde::Serialize;

use crate::types::Day;

/// Stored streak fields of the mentee aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakState {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub freeze_available: bool,
    pub last_streak_date: Option<Day>,
}

/// How the streak moved during an approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakOutcome {
    /// First completion ever.
    Started,
    /// Already counted today; nothing changes.
    SameDay,
    /// Completed on the day after the last streak day.
    Continued,
    /// One missed day bridged by consuming the freeze.
    FreezeUsed,
    /// Gap too large; streak restarts at 1.
    Reset,
    /// Last streak date lies in the future. Treated as `SameDay`.
    ClockSkew,
}

/// Result of [`advance`]: the next stored state plus what happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakAdvance {
    pub state: StreakState,
    pub outcome: StreakOutcome,
    pub freeze_consumed: bool,
}

/// Read-only streak label for dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakStatus {
    /// No completion has ever been recorded.
    None,
    Active,
    AtRisk,
    Frozen,
    Lost,
}

impl StreakStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Active => "active",
            Self::AtRisk => "at_risk",
            Self::Frozen => "frozen",
            Self::Lost => "lost",
        }
    }
}

/// Dashboard view of the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakView {
    pub status: StreakStatus,
    /// Streak as it should be displayed: 0 once lost, even though the stored
    /// value is only reset by the next approval.
    pub effective_streak: i32,
    pub longest_streak: i32,
    pub freeze_available: bool,
    pub days_since_last: Option<i64>,
}

fn days_between(last: Day, today: Day) -> i64 {
    today.signed_duration_since(last).num_days()
}

/// Apply one approval on `today` to the stored streak.
pub fn advance(state: StreakState, today: Day) -> StreakAdvance {
    let mut next = state;
    let mut freeze_consumed = false;

    let outcome = match state.last_streak_date {
        None => {
            next.current_streak = 1;
            StreakOutcome::Started
        }
        Some(last) => match days_between(last, today) {
            d if d < 0 => StreakOutcome::ClockSkew,
            0 => StreakOutcome::SameDay,
            1 => {
                next.current_streak = state.current_streak + 1;
                StreakOutcome::Continued
            }
            2 if state.freeze_available => {
                next.current_streak = state.current_streak + 1;
                next.freeze_available = false;
                freeze_consumed = true;
                StreakOutcome::FreezeUsed
            }
            _ => {
                next.current_streak = 1;
                StreakOutcome::Reset
            }
        },
    };

    // A skewed date is left alone so a later correct clock still counts
    // consecutive days from the stored value.
    if outcome != StreakOutcome::ClockSkew {
        next.last_streak_date = Some(today);
    }
    next.longest_streak = state.longest_streak.max(next.current_streak);

    StreakAdvance {
        state: next,
        outcome,
        freeze_consumed,
    }
}

/// Compute the dashboard status without mutating anything.
pub fn status(state: &StreakState, today: Day) -> StreakView {
    let days_since_last = state.last_streak_date.map(|last| days_between(last, today).max(0));

    let status = match days_since_last {
        None => StreakStatus::None,
        Some(0) => StreakStatus::Active,
        Some(1) => StreakStatus::AtRisk,
        Some(2) if state.freeze_available => StreakStatus::Frozen,
        Some(_) => StreakStatus::Lost,
    };

    let effective_streak = match status {
        StreakStatus::Lost | StreakStatus::None => 0,
        _ => state.current_streak,
    };

    StreakView {
        status,
        effective_streak,
        longest_streak: state.longest_streak,
        freeze_available: state.freeze_available,
        days_since_last,
    }
}

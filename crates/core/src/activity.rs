//! Activity log constants and payload builders.
//!
//! Every state-changing action appends one row to `activity_log`. The
//! `details` payload is a JSON object whose shape depends on the action.

use serde_json::{json, Value};

use crate::reward::{BonusLine, RewardOutcome};
use crate::streak::StreakOutcome;
use crate::types::DbId;

/// Default number of entries returned by the activity feed.
pub const DEFAULT_FEED_LIMIT: i64 = 50;

/// Maximum number of entries returned by the activity feed.
pub const MAX_FEED_LIMIT: i64 = 200;

/// Known action types.
pub mod action_types {
    pub const QUEST_CREATED: &str = "quest_created";
    pub const QUEST_UPDATED: &str = "quest_updated";
    pub const QUEST_ARCHIVED: &str = "quest_archived";
    pub const QUEST_STARTED: &str = "quest_started";
    pub const QUEST_SUBMITTED: &str = "quest_submitted";
    pub const QUEST_APPROVED: &str = "quest_approved";
    pub const QUEST_REJECTED: &str = "quest_rejected";
    pub const ACHIEVEMENT_UNLOCKED: &str = "achievement_unlocked";
    pub const BADGE_EARNED: &str = "badge_earned";
    pub const LUCKY_QUEST_ROTATED: &str = "lucky_quest_rotated";
    pub const BONUS_EVENT_CREATED: &str = "bonus_event_created";
    pub const STATS_RESET: &str = "stats_reset";
}

/// Entity type names used in the `entity_type` column.
pub mod entity_types {
    pub const QUEST: &str = "quest";
    pub const QUEST_PROGRESS: &str = "quest_progress";
    pub const ACHIEVEMENT: &str = "achievement";
    pub const BADGE: &str = "badge";
    pub const BONUS_EVENT: &str = "bonus_event";
    pub const MENTEE_STATS: &str = "mentee_stats";
}

/// Clamp a user-provided feed limit to `[1, MAX_FEED_LIMIT]`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_FEED_LIMIT).clamp(1, MAX_FEED_LIMIT)
}

fn streak_outcome_str(outcome: StreakOutcome) -> &'static str {
    match outcome {
        StreakOutcome::Started => "started",
        StreakOutcome::SameDay => "same_day",
        StreakOutcome::Continued => "continued",
        StreakOutcome::FreezeUsed => "freeze_used",
        StreakOutcome::Reset => "reset",
        StreakOutcome::ClockSkew => "clock_skew",
    }
}

/// Details payload for an approval.
pub fn approval_details(quest_id: DbId, quest_title: &str, outcome: &RewardOutcome) -> Value {
    json!({
        "quest_id": quest_id,
        "quest_title": quest_title,
        "base_xp": outcome.base_xp,
        "xp_awarded": outcome.xp_awarded,
        "bonus_breakdown": outcome.bonus_breakdown,
        "new_total_xp": outcome.next.total_xp,
        "new_level": outcome.new_level,
        "leveled_up": outcome.leveled_up,
        "streak": outcome.streak.state.current_streak,
        "streak_outcome": streak_outcome_str(outcome.streak.outcome),
        "freeze_consumed": outcome.streak.freeze_consumed,
        "reward_earned": outcome.reward_earned,
    })
}

/// Details payload for a newly granted achievement or badge.
pub fn recognition_details(code: &str, name: &str, line: &BonusLine) -> Value {
    json!({
        "code": code,
        "name": name,
        "xp_bonus": line.xp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reward::BonusKind;

    #[test]
    fn clamp_limit_uses_default_when_none() {
        assert_eq!(clamp_limit(None), DEFAULT_FEED_LIMIT);
    }

    #[test]
    fn clamp_limit_respects_bounds() {
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-3)), 1);
        assert_eq!(clamp_limit(Some(10_000)), MAX_FEED_LIMIT);
        assert_eq!(clamp_limit(Some(20)), 20);
    }

    #[test]
    fn recognition_details_shape() {
        let line = BonusLine {
            kind: BonusKind::Achievement,
            label: "Night Owl".into(),
            xp: 75,
        };
        let details = recognition_details("night_owl", "Night Owl", &line);
        assert_eq!(details["code"], "night_owl");
        assert_eq!(details["xp_bonus"], 75);
    }
}

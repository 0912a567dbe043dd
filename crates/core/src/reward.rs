//! Reward calculation for a single approved submission.
//!
//! Bonuses are applied in a fixed order over a running total: lucky quest
//! multiplier, weekend multiplier, streak step bonus, first-daily flat bonus.
//! Multiplicative steps come first so later flat bonuses are never scaled.
//! The breakdown preserves that order.

use serde::Serialize;

use crate::bonus::BonusRuleSet;
use crate::error::CoreError;
use crate::rank::RankTable;
use crate::streak::{self, StreakAdvance, StreakOutcome, StreakState};
use crate::types::Day;

/// Default number of completions between milestone rewards.
pub const DEFAULT_REWARD_INTERVAL: i32 = 10;

/// Aggregate mentee progress fields read and written by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub total_xp: i64,
    pub level: i32,
    pub quests_completed: i32,
    pub streak: StreakState,
    pub first_quest_today: bool,
    pub last_first_quest_date: Option<Day>,
    pub quests_toward_reward: i32,
    pub total_bonus_xp: i64,
}

/// The quest-side inputs of a reward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuestReward {
    pub base_xp: i64,
    /// Multiplier when the quest is the current lucky quest.
    pub lucky_multiplier: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    LuckyQuest,
    Weekend,
    Streak,
    FirstDaily,
    /// Achievement or badge unlocked by the approval.
    Achievement,
}

/// One line of the bonus breakdown shown to the mentee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BonusLine {
    #[serde(rename = "type")]
    pub kind: BonusKind,
    pub label: String,
    pub xp: i64,
}

/// Static rules plus the bonus rules resolved for today.
#[derive(Debug, Clone)]
pub struct RewardRules<'a> {
    pub ranks: &'a RankTable,
    pub bonuses: BonusRuleSet,
    pub reward_interval: i32,
}

/// Everything the approval produces before achievements run.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardOutcome {
    pub base_xp: i64,
    pub bonus_breakdown: Vec<BonusLine>,
    pub xp_awarded: i64,
    pub old_level: i32,
    pub new_level: i32,
    pub leveled_up: bool,
    pub streak: StreakAdvance,
    pub first_daily_granted: bool,
    pub reward_earned: bool,
    /// Stored values to persist.
    pub next: ProgressSnapshot,
}

/// Round to the nearest integer with halves rounded up.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Bonus produced by scaling `running` with `multiplier`. Never negative.
fn multiplier_bonus(running: i64, multiplier: f64) -> i64 {
    if multiplier > 1.0 {
        round_half_up(running as f64 * (multiplier - 1.0)).max(0)
    } else {
        0
    }
}

/// Compute the reward for approving a quest on `today`.
pub fn calculate(
    stats: &ProgressSnapshot,
    quest: QuestReward,
    today: Day,
    rules: &RewardRules<'_>,
) -> Result<RewardOutcome, CoreError> {
    if quest.base_xp < 0 {
        return Err(CoreError::Validation(format!(
            "Base XP must not be negative, got {}",
            quest.base_xp
        )));
    }

    let mut running = quest.base_xp;
    let mut breakdown = Vec::new();

    if let Some(multiplier) = quest.lucky_multiplier.filter(|m| *m > 1.0) {
        let bonus = multiplier_bonus(running, multiplier);
        breakdown.push(BonusLine {
            kind: BonusKind::LuckyQuest,
            label: format!("Lucky quest x{multiplier}"),
            xp: bonus,
        });
        running += bonus;
    }

    if let Some(multiplier) = rules.bonuses.weekend_multiplier {
        let bonus = multiplier_bonus(running, multiplier);
        breakdown.push(BonusLine {
            kind: BonusKind::Weekend,
            label: format!("Weekend x{multiplier}"),
            xp: bonus,
        });
        running += bonus;
    }

    let streak = streak::advance(stats.streak, today);
    let streak_counted = !matches!(
        streak.outcome,
        StreakOutcome::SameDay | StreakOutcome::ClockSkew
    );
    let streak_bonus = if streak_counted {
        rules.bonuses.streak_table.bonus_for(streak.state.current_streak)
    } else {
        0
    };
    if streak_bonus > 0 {
        breakdown.push(BonusLine {
            kind: BonusKind::Streak,
            label: format!("{}-day streak", streak.state.current_streak),
            xp: streak_bonus,
        });
        running += streak_bonus;
    }

    let first_daily_available = stats.last_first_quest_date != Some(today);
    let first_daily_bonus = rules
        .bonuses
        .first_daily_bonus
        .filter(|_| first_daily_available);
    if let Some(bonus) = first_daily_bonus {
        breakdown.push(BonusLine {
            kind: BonusKind::FirstDaily,
            label: "First quest of the day".to_string(),
            xp: bonus,
        });
        running += bonus;
    }
    let first_daily_granted = first_daily_bonus.is_some();

    let xp_awarded = running;
    let new_total_xp = stats.total_xp + xp_awarded;
    let new_level = rules.ranks.level_for(new_total_xp);
    let quests_toward_reward = stats.quests_toward_reward + 1;
    let interval = rules.reward_interval.max(1);

    let next = ProgressSnapshot {
        total_xp: new_total_xp,
        level: new_level,
        quests_completed: stats.quests_completed + 1,
        streak: streak.state,
        first_quest_today: first_daily_granted
            || (stats.first_quest_today && !first_daily_available),
        last_first_quest_date: if first_daily_granted {
            Some(today)
        } else {
            stats.last_first_quest_date
        },
        quests_toward_reward,
        total_bonus_xp: stats.total_bonus_xp + (xp_awarded - quest.base_xp),
    };

    Ok(RewardOutcome {
        base_xp: quest.base_xp,
        bonus_breakdown: breakdown,
        xp_awarded,
        old_level: stats.level,
        new_level,
        leveled_up: new_level > stats.level,
        streak,
        first_daily_granted,
        reward_earned: quests_toward_reward % interval == 0,
        next,
    })
}

/// Add achievement or badge bonus XP on top of already persisted progress.
pub fn apply_top_up(stats: &ProgressSnapshot, extra_xp: i64, ranks: &RankTable) -> ProgressSnapshot {
    let extra = extra_xp.max(0);
    let total_xp = stats.total_xp + extra;
    ProgressSnapshot {
        total_xp,
        level: ranks.level_for(total_xp),
        total_bonus_xp: stats.total_bonus_xp + extra,
        ..*stats
    }
}

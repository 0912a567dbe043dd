//! Mentor review and the approval reward pipeline.

use questline_core::achievement::{RecognitionDefinition, RecognitionKind};
use questline_core::activity::{self, action_types, entity_types};
use questline_core::bonus::{BonusEventRule, BonusRuleSet};
use questline_core::error::CoreError;
use questline_core::quest::{self, ReviewAction};
use questline_core::reward::{self, BonusLine, QuestReward, RewardRules};
use questline_core::streak::StreakOutcome;
use questline_core::types::DbId;
use questline_db::models::activity_log::CreateActivity;
use questline_db::models::bonus_event::BonusEvent;
use questline_db::models::quest_progress::QuestProgress;
use questline_db::repositories::{
    ActivityLogRepo, BonusEventRepo, MenteeStatsRepo, QuestProgressRepo, QuestRepo,
};
use serde::Serialize;

use super::{not_found, raced, ProgressionEngine};
use crate::error::{AppError, AppResult};

/// An achievement or badge unlocked by an approval.
#[derive(Debug, Clone, Serialize)]
pub struct UnlockedRecognition {
    pub id: DbId,
    pub kind: RecognitionKind,
    pub code: String,
    pub name: String,
    pub xp_bonus: i64,
}

impl From<&RecognitionDefinition> for UnlockedRecognition {
    fn from(def: &RecognitionDefinition) -> Self {
        Self {
            id: def.id,
            kind: def.kind,
            code: def.code.clone(),
            name: def.name.clone(),
            xp_bonus: def.xp_bonus,
        }
    }
}

/// Result of approving a submitted quest.
///
/// `xp_awarded` covers the quest reward (base plus reward bonuses).
/// Recognition XP is reported separately in `recognition_xp`; its lines are
/// appended to `bonus_breakdown` and it is included in `new_total_xp`.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalResult {
    pub progress: QuestProgress,
    pub xp_awarded: i64,
    pub base_xp: i64,
    pub bonus_breakdown: Vec<BonusLine>,
    pub recognition_xp: i64,
    pub new_total_xp: i64,
    pub new_level: i32,
    pub leveled_up: bool,
    pub new_streak: i32,
    pub achievements_unlocked: Vec<UnlockedRecognition>,
    pub reward_earned: bool,
}

/// Result of a review, tagged by the action taken.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReviewOutcome {
    Approved(ApprovalResult),
    Rejected { progress: QuestProgress },
}

impl ProgressionEngine {
    /// Apply a mentor review to a submitted quest.
    pub async fn review(
        &self,
        progress_id: DbId,
        action: ReviewAction,
        feedback: Option<&str>,
    ) -> AppResult<ReviewOutcome> {
        match action {
            ReviewAction::Approve => Ok(ReviewOutcome::Approved(
                self.approve_quest(progress_id, feedback).await?,
            )),
            ReviewAction::Reject => Ok(ReviewOutcome::Rejected {
                progress: self.reject_quest(progress_id, feedback).await?,
            }),
        }
    }

    /// `submitted -> completed`, awarding XP.
    ///
    /// The primary transaction locks the progress and stats rows, computes the
    /// reward, writes stats with a version compare-and-swap, completes the
    /// progress row and logs the approval. Recognition and lucky rotation
    /// follow as separate steps whose failures are logged, not returned.
    pub async fn approve_quest(&self, progress_id: DbId, feedback: Option<&str>) -> AppResult<ApprovalResult> {
        let now = self.clock.now();
        let today = self.clock.today();

        let mut tx = self.pool.begin().await?;

        let progress = QuestProgressRepo::lock(&mut *tx, progress_id)
            .await?
            .ok_or_else(|| not_found("QuestProgress", progress_id))?;
        quest::validate_review(progress.status()?)?;

        let quest = QuestRepo::find_by_id(&mut *tx, progress.quest_id)
            .await?
            .ok_or_else(|| not_found("Quest", progress.quest_id))?;
        let stats = MenteeStatsRepo::lock(&mut *tx).await?;

        let events = BonusEventRepo::list(&mut *tx)
            .await?
            .iter()
            .map(BonusEvent::to_rule)
            .collect::<Result<Vec<BonusEventRule>, CoreError>>()?;
        let bonuses = BonusRuleSet::resolve(
            &self.config.bonuses,
            &events,
            today,
            self.clock.is_weekend(today),
        );
        let rules = RewardRules {
            ranks: &self.config.ranks,
            bonuses,
            reward_interval: self.config.reward_interval,
        };

        let outcome = reward::calculate(
            &stats.snapshot(),
            QuestReward {
                base_xp: quest.xp_reward,
                lucky_multiplier: quest.active_lucky_multiplier(),
            },
            today,
            &rules,
        )?;

        if outcome.streak.outcome == StreakOutcome::ClockSkew {
            tracing::warn!(
                progress_id,
                last_streak_date = ?stats.last_streak_date,
                %today,
                "Last streak date is in the future; streak left unchanged"
            );
        }

        let updated = MenteeStatsRepo::apply_snapshot(&mut *tx, stats.id, stats.version, &outcome.next, now)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::ConcurrencyConflict(
                    "Mentee stats were updated by another request".into(),
                ))
            })?;

        let completed = QuestProgressRepo::complete(&mut *tx, progress_id, outcome.xp_awarded, feedback, now)
            .await?
            .ok_or_else(|| raced("Quest progress"))?;

        ActivityLogRepo::append(
            &mut *tx,
            &CreateActivity::new(
                action_types::QUEST_APPROVED,
                entity_types::QUEST_PROGRESS,
                progress_id,
                activity::approval_details(quest.id, &quest.title, &outcome),
            ),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(
            progress_id,
            quest_id = quest.id,
            base_xp = outcome.base_xp,
            xp_awarded = outcome.xp_awarded,
            new_total_xp = updated.total_xp,
            new_level = updated.level,
            streak = updated.current_streak,
            freeze_consumed = outcome.streak.freeze_consumed,
            "Quest approved"
        );

        // --- Recognition top-up (separate, retriable) ---
        let (unlocked, final_stats) = match self.grant_recognitions(now).await {
            Ok(top_up) => (top_up.unlocked, top_up.stats),
            Err(e) => {
                tracing::error!(
                    progress_id,
                    error = %e,
                    "Recognition evaluation failed; the approval stands"
                );
                (Vec::new(), updated)
            }
        };

        // --- Lucky rotation (best effort) ---
        if let Err(e) = self.rotate_lucky_quest().await {
            tracing::warn!(progress_id, error = %e, "Lucky quest rotation failed");
        }

        let recognition_xp: i64 = unlocked.iter().map(|d| d.xp_bonus.max(0)).sum();
        let mut bonus_breakdown = outcome.bonus_breakdown;
        bonus_breakdown.extend(unlocked.iter().map(RecognitionDefinition::breakdown_line));

        Ok(ApprovalResult {
            progress: completed,
            xp_awarded: outcome.xp_awarded,
            base_xp: outcome.base_xp,
            bonus_breakdown,
            recognition_xp,
            new_total_xp: final_stats.total_xp,
            new_level: final_stats.level,
            leveled_up: final_stats.level > outcome.old_level,
            new_streak: outcome.streak.state.current_streak,
            achievements_unlocked: unlocked.iter().map(UnlockedRecognition::from).collect(),
            reward_earned: outcome.reward_earned,
        })
    }
}

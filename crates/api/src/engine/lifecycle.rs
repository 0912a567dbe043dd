//! Quest lifecycle transitions other than approval.
//!
//! Each transition locks the progress row, re-validates with the pure state
//! machine, applies a status-guarded UPDATE and appends to the activity log,
//! all in one transaction.

use questline_core::activity::{action_types, entity_types};
use questline_core::quest::{self, TransitionError};
use questline_core::types::DbId;
use questline_db::models::activity_log::CreateActivity;
use questline_db::models::mentee_stats::MenteeStats;
use questline_db::models::quest_progress::{QuestProgress, SubmitQuest};
use questline_db::repositories::{ActivityLogRepo, MenteeStatsRepo, QuestProgressRepo, QuestRepo};
use serde_json::json;

use super::{not_found, raced, ProgressionEngine};
use crate::error::AppResult;

impl ProgressionEngine {
    /// `available -> in_progress`.
    pub async fn start_quest(&self, quest_id: DbId) -> AppResult<QuestProgress> {
        let now = self.clock.now();
        let mut tx = self.pool.begin().await?;

        let quest = QuestRepo::find_by_id(&mut *tx, quest_id)
            .await?
            .ok_or_else(|| not_found("Quest", quest_id))?;
        let stats = MenteeStatsRepo::get(&mut *tx).await?;
        let existing = QuestProgressRepo::find_for_quest(&mut *tx, stats.id, quest_id).await?;
        let existing_status = existing.as_ref().map(QuestProgress::status).transpose()?;

        quest::validate_start(existing_status, quest.gate(), stats.total_xp)?;

        // A concurrent start loses on the unique constraint.
        let progress = QuestProgressRepo::start(&mut *tx, stats.id, quest_id, now)
            .await?
            .ok_or(TransitionError::AlreadyStarted)?;

        ActivityLogRepo::append(
            &mut *tx,
            &CreateActivity::new(
                action_types::QUEST_STARTED,
                entity_types::QUEST_PROGRESS,
                progress.id,
                json!({ "quest_id": quest.id, "quest_title": quest.title }),
            ),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(progress_id = progress.id, quest_id, "Quest started");
        Ok(progress)
    }

    /// `in_progress -> submitted`.
    pub async fn submit_quest(&self, progress_id: DbId, input: &SubmitQuest) -> AppResult<QuestProgress> {
        let now = self.clock.now();
        let evidence = quest::normalize_evidence(&input.evidence_links);
        let reflection = input
            .reflection
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());

        let mut tx = self.pool.begin().await?;
        let progress = QuestProgressRepo::lock(&mut *tx, progress_id)
            .await?
            .ok_or_else(|| not_found("QuestProgress", progress_id))?;

        quest::validate_submit(progress.status()?, &evidence)?;

        let submitted = QuestProgressRepo::submit(&mut *tx, progress_id, &evidence, reflection, now)
            .await?
            .ok_or_else(|| raced("Quest progress"))?;

        ActivityLogRepo::append(
            &mut *tx,
            &CreateActivity::new(
                action_types::QUEST_SUBMITTED,
                entity_types::QUEST_PROGRESS,
                progress_id,
                json!({
                    "quest_id": submitted.quest_id,
                    "evidence_count": evidence.len(),
                    "has_reflection": reflection.is_some(),
                }),
            ),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(
            progress_id,
            quest_id = submitted.quest_id,
            evidence_count = evidence.len(),
            "Quest submitted"
        );
        Ok(submitted)
    }

    /// `submitted -> in_progress`, recording mentor feedback.
    pub async fn reject_quest(&self, progress_id: DbId, feedback: Option<&str>) -> AppResult<QuestProgress> {
        let now = self.clock.now();
        let mut tx = self.pool.begin().await?;

        let progress = QuestProgressRepo::lock(&mut *tx, progress_id)
            .await?
            .ok_or_else(|| not_found("QuestProgress", progress_id))?;
        quest::validate_review(progress.status()?)?;

        let rejected = QuestProgressRepo::reject(&mut *tx, progress_id, feedback, now)
            .await?
            .ok_or_else(|| raced("Quest progress"))?;

        ActivityLogRepo::append(
            &mut *tx,
            &CreateActivity::new(
                action_types::QUEST_REJECTED,
                entity_types::QUEST_PROGRESS,
                progress_id,
                json!({
                    "quest_id": rejected.quest_id,
                    "feedback": feedback,
                    "rejection_count": rejected.rejection_count,
                }),
            ),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(
            progress_id,
            quest_id = rejected.quest_id,
            rejection_count = rejected.rejection_count,
            "Quest rejected"
        );
        Ok(rejected)
    }

    /// Administrative reset of the mentee's stats.
    pub async fn reset_stats(&self) -> AppResult<MenteeStats> {
        let mut tx = self.pool.begin().await?;
        let stats = MenteeStatsRepo::lock(&mut *tx).await?;

        let reset = MenteeStatsRepo::reset(&mut *tx, stats.id)
            .await?
            .ok_or_else(|| not_found("MenteeStats", stats.id))?;

        ActivityLogRepo::append(
            &mut *tx,
            &CreateActivity::new(
                action_types::STATS_RESET,
                entity_types::MENTEE_STATS,
                stats.id,
                json!({
                    "previous_total_xp": stats.total_xp,
                    "previous_level": stats.level,
                    "previous_quests_completed": stats.quests_completed,
                }),
            ),
        )
        .await?;
        tx.commit().await?;

        tracing::warn!(
            mentee_stats_id = stats.id,
            previous_total_xp = stats.total_xp,
            "Mentee stats reset"
        );
        Ok(reset)
    }
}

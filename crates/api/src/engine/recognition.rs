//! Achievement and badge evaluation with the XP top-up.
//!
//! Runs after the approval commits. The step is idempotent: only unearned
//! definitions are considered, grants use `ON CONFLICT DO NOTHING`, and only
//! rows actually inserted contribute XP. Re-running it after a failure or
//! concurrently with another evaluation never double-grants.

use std::collections::HashMap;

use questline_core::achievement::{evaluate, EvaluationContext, RecognitionDefinition, RecognitionKind};
use questline_core::activity::{self, action_types, entity_types};
use questline_core::error::CoreError;
use questline_core::reward;
use questline_core::types::Timestamp;
use questline_db::models::activity_log::CreateActivity;
use questline_db::models::mentee_stats::MenteeStats;
use questline_db::models::recognition::Recognition;
use questline_db::repositories::{
    ActivityLogRepo, MenteeStatsRepo, QuestProgressRepo, QuestRepo, RecognitionRepo,
};

use super::ProgressionEngine;
use crate::error::{AppError, AppResult};

/// Outcome of one evaluation pass.
#[derive(Debug, Clone)]
pub struct RecognitionTopUp {
    /// Definitions granted by this pass, achievements first.
    pub unlocked: Vec<RecognitionDefinition>,
    /// Stats after the top-up was applied.
    pub stats: MenteeStats,
}

impl ProgressionEngine {
    /// Evaluate unearned achievements and badges for a completion at `completed_at`.
    pub async fn grant_recognitions(&self, completed_at: Timestamp) -> AppResult<RecognitionTopUp> {
        let calendar = self.clock.calendar();
        let day_start = calendar.start_of_local_day(completed_at);

        let mut tx = self.pool.begin().await?;
        let stats = MenteeStatsRepo::lock(&mut *tx).await?;

        let ctx = EvaluationContext {
            total_xp: stats.total_xp,
            level: stats.level,
            quests_completed: stats.quests_completed,
            current_streak: stats.current_streak,
            category_completions: QuestProgressRepo::completions_by_category(&mut *tx, stats.id)
                .await?
                .into_iter()
                .collect::<HashMap<_, _>>(),
            active_category_completions: QuestProgressRepo::active_completions_by_category(
                &mut *tx, stats.id,
            )
            .await?
            .into_iter()
            .collect::<HashMap<_, _>>(),
            category_totals: QuestRepo::active_counts_by_category(&mut *tx)
                .await?
                .into_iter()
                .collect::<HashMap<_, _>>(),
            completed_at: calendar.local(completed_at),
            completions_today: QuestProgressRepo::completions_since(&mut *tx, stats.id, day_start)
                .await?,
            total_rejections: QuestProgressRepo::total_rejections(&mut *tx, stats.id).await?,
        };

        let mut unlocked = Vec::new();
        for kind in [RecognitionKind::Achievement, RecognitionKind::Badge] {
            let rows = RecognitionRepo::list_unearned(&mut *tx, kind, stats.id).await?;
            let definitions = parse_definitions(kind, &rows);

            for definition in evaluate(&definitions, &ctx) {
                let inserted = RecognitionRepo::grant(&mut *tx, kind, stats.id, definition.id).await?;
                if !inserted {
                    continue;
                }
                let (action, entity) = match kind {
                    RecognitionKind::Achievement => {
                        (action_types::ACHIEVEMENT_UNLOCKED, entity_types::ACHIEVEMENT)
                    }
                    RecognitionKind::Badge => (action_types::BADGE_EARNED, entity_types::BADGE),
                };
                ActivityLogRepo::append(
                    &mut *tx,
                    &CreateActivity::new(
                        action,
                        entity,
                        definition.id,
                        activity::recognition_details(
                            &definition.code,
                            &definition.name,
                            &definition.breakdown_line(),
                        ),
                    ),
                )
                .await?;
                unlocked.push(definition.clone());
            }
        }

        let extra_xp: i64 = unlocked.iter().map(|d| d.xp_bonus.max(0)).sum();
        let stats = if extra_xp > 0 {
            let next = reward::apply_top_up(&stats.snapshot(), extra_xp, &self.config.ranks);
            MenteeStatsRepo::apply_snapshot(&mut *tx, stats.id, stats.version, &next, self.clock.now())
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::ConcurrencyConflict(
                        "Mentee stats changed during recognition top-up".into(),
                    ))
                })?
        } else {
            stats
        };
        tx.commit().await?;

        for definition in &unlocked {
            tracing::info!(
                kind = %definition.kind,
                code = %definition.code,
                xp_bonus = definition.xp_bonus,
                "Recognition unlocked"
            );
        }

        Ok(RecognitionTopUp { unlocked, stats })
    }
}

/// Parse stored definitions, skipping any whose requirement is not understood.
fn parse_definitions(kind: RecognitionKind, rows: &[Recognition]) -> Vec<RecognitionDefinition> {
    rows.iter()
        .filter_map(|row| match row.to_definition(kind) {
            Ok(definition) => Some(definition),
            Err(e) => {
                tracing::warn!(
                    %kind,
                    code = %row.code,
                    requirement_type = %row.requirement_type,
                    error = %e,
                    "Skipping definition with an unusable requirement"
                );
                None
            }
        })
        .collect()
}

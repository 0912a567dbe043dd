//! Lucky quest rotation.

use questline_core::activity::{action_types, entity_types};
use questline_core::lucky::pick_lucky;
use questline_core::types::DbId;
use questline_db::models::activity_log::CreateActivity;
use questline_db::repositories::{ActivityLogRepo, QuestRepo};
use serde_json::json;

use super::ProgressionEngine;
use crate::error::AppResult;

impl ProgressionEngine {
    /// Move the lucky flag to a uniformly random active, unlocked quest.
    ///
    /// Clearing and setting happen in one transaction, so readers see either
    /// the old lucky quest or the new one. Returns the chosen quest, or `None`
    /// when no quest is eligible.
    pub async fn rotate_lucky_quest(&self) -> AppResult<Option<DbId>> {
        let multiplier = self.config.lucky_multiplier;
        let mut tx = self.pool.begin().await?;

        QuestRepo::clear_lucky(&mut *tx).await?;
        let candidates = QuestRepo::lucky_candidate_ids(&mut *tx).await?;
        let chosen = pick_lucky(&candidates, &mut rand::rng());

        if let Some(quest_id) = chosen {
            QuestRepo::set_lucky(&mut *tx, quest_id, multiplier).await?;
            ActivityLogRepo::append(
                &mut *tx,
                &CreateActivity::new(
                    action_types::LUCKY_QUEST_ROTATED,
                    entity_types::QUEST,
                    quest_id,
                    json!({ "multiplier": multiplier, "candidates": candidates.len() }),
                ),
            )
            .await?;
        }
        tx.commit().await?;

        tracing::debug!(lucky_quest_id = ?chosen, candidates = candidates.len(), "Lucky quest rotated");
        Ok(chosen)
    }
}

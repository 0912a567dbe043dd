//! Activity log entity and DTO.
//!
//! Entries are immutable once written (no `updated_at`); a trigger rejects
//! UPDATE and DELETE on the table.

use questline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single activity log entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityLogEntry {
    pub id: DbId,
    pub action_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub details: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for appending an entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateActivity {
    pub action_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub details: serde_json::Value,
}

impl CreateActivity {
    pub fn new(action_type: &str, entity_type: &str, entity_id: DbId, details: serde_json::Value) -> Self {
        Self {
            action_type: action_type.to_string(),
            entity_type: Some(entity_type.to_string()),
            entity_id: Some(entity_id),
            details,
        }
    }
}

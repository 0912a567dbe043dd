//! Achievement and badge definitions plus earned markers.
//!
//! Both catalogs share a row shape; [`RecognitionKind`] selects the tables.

use questline_core::achievement::{RecognitionDefinition, RecognitionKind, Requirement, RequirementError};
use questline_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `achievements` or `badges`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Recognition {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub requirement_type: String,
    pub requirement_value: Option<i64>,
    pub requirement_category: Option<String>,
    pub xp_bonus: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Recognition {
    pub fn to_definition(&self, kind: RecognitionKind) -> Result<RecognitionDefinition, RequirementError> {
        let requirement = Requirement::parse(
            &self.requirement_type,
            self.requirement_value,
            self.requirement_category.as_deref(),
        )?;
        Ok(RecognitionDefinition {
            id: self.id,
            kind,
            code: self.code.clone(),
            name: self.name.clone(),
            requirement,
            xp_bonus: self.xp_bonus,
        })
    }
}

/// A definition joined with the mentee's earned marker, for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecognitionWithStatus {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub requirement_type: String,
    pub requirement_value: Option<i64>,
    pub requirement_category: Option<String>,
    pub xp_bonus: i64,
    pub earned: bool,
    pub earned_at: Option<Timestamp>,
}

pub mod activity;
pub mod bonus_event;
pub mod progress;
pub mod quest;
pub mod recognition;
pub mod stats;

use questline_core::types::DbId;

use crate::error::{AppError, AppResult};

/// Reject non-positive path ids before touching the database.
pub(crate) fn ensure_valid_id(id: DbId) -> AppResult<()> {
    if id <= 0 {
        return Err(AppError::BadRequest(format!("id must be positive, got {id}")));
    }
    Ok(())
}

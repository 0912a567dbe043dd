use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The requested transition is not valid for the entity's current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A concurrent writer changed the row between read and write.
    /// The whole operation is safe to retry.
    #[error("Concurrent update detected: {0}")]
    ConcurrencyConflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

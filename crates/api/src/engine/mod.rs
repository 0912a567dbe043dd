//! Progression engine.
//!
//! Owns every write that touches quest progress or mentee stats:
//!
//! - [`lifecycle`] -- start, submit and reject transitions.
//! - [`approval`] -- the reward pipeline run when a mentor approves.
//! - [`recognition`] -- achievement and badge evaluation with the XP top-up.
//! - [`lucky`] -- rotation of the lucky quest flag.
//!
//! An approval runs three steps in order. The primary award is one
//! transaction; the recognition top-up and the lucky rotation each run in
//! their own transaction afterwards and never roll back the award.

pub mod approval;
pub mod lifecycle;
pub mod lucky;
pub mod recognition;

use std::sync::Arc;

use questline_core::clock::Clock;
use questline_core::config::ProgressionConfig;
use questline_core::error::CoreError;
use questline_core::types::DbId;
use sqlx::PgPool;

use crate::error::AppError;

pub use approval::{ApprovalResult, ReviewOutcome, UnlockedRecognition};
pub use recognition::RecognitionTopUp;

/// Shared handle to the pool, progression settings and clock.
pub struct ProgressionEngine {
    pool: PgPool,
    config: Arc<ProgressionConfig>,
    clock: Arc<dyn Clock>,
}

impl ProgressionEngine {
    pub fn new(pool: PgPool, config: Arc<ProgressionConfig>, clock: Arc<dyn Clock>) -> Self {
        Self { pool, config, clock }
    }

    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

/// A guarded UPDATE matched no row even though the pre-check passed.
fn raced(what: &str) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "{what} was changed by a concurrent request"
    )))
}

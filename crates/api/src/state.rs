use std::sync::Arc;

use questline_core::clock::Clock;

use crate::config::ServerConfig;
use crate::engine::ProgressionEngine;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: questline_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Reward pipeline, lifecycle transitions and lucky rotation.
    pub engine: Arc<ProgressionEngine>,
}

impl AppState {
    pub fn new(pool: questline_db::DbPool, config: ServerConfig, clock: Arc<dyn Clock>) -> Self {
        let engine = ProgressionEngine::new(pool.clone(), Arc::new(config.progression.clone()), clock);
        Self {
            pool,
            config: Arc::new(config),
            engine: Arc::new(engine),
        }
    }
}

//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// `?limit=` for feeds. Clamped with `questline_core::activity::clamp_limit`.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

/// Query parameters for list endpoints that support an `include_inactive` flag.
#[derive(Debug, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}

//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches, where the
//!   entity is editable

pub mod activity_log;
pub mod bonus_event;
pub mod mentee_stats;
pub mod quest;
pub mod quest_progress;
pub mod recognition;

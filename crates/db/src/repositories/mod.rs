//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Methods
//! that only ever run standalone take `&PgPool`; methods that also run
//! inside the approval transaction take any `PgExecutor`, so callers pass
//! either `&pool` or `&mut *tx`.

pub mod activity_log_repo;
pub mod bonus_event_repo;
pub mod mentee_stats_repo;
pub mod quest_progress_repo;
pub mod quest_repo;
pub mod recognition_repo;

pub use activity_log_repo::ActivityLogRepo;
pub use bonus_event_repo::BonusEventRepo;
pub use mentee_stats_repo::MenteeStatsRepo;
pub use quest_progress_repo::QuestProgressRepo;
pub use quest_repo::QuestRepo;
pub use recognition_repo::RecognitionRepo;

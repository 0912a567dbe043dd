//! Quest catalog rules and the quest progress state machine.
//!
//! This module lives in `core` so both the repository layer and the HTTP
//! handlers validate transitions the same way. The repository additionally
//! guards every update with a `WHERE status = ...` predicate so a raced
//! transition fails instead of applying twice.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;

/// Minimum XP a quest may award.
pub const MIN_XP_REWARD: i64 = 10;

/// Maximum XP a quest may award.
pub const MAX_XP_REWARD: i64 = 1000;

/// Multiplier assigned to the quest picked by the lucky rotator.
pub const LUCKY_MULTIPLIER: f64 = 1.5;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Progress status. `Available` means no progress row exists yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    Available,
    InProgress,
    Submitted,
    Completed,
}

impl QuestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::InProgress => "in_progress",
            Self::Submitted => "submitted",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "in_progress" => Ok(Self::InProgress),
            "submitted" => Ok(Self::Submitted),
            "completed" => Ok(Self::Completed),
            other => Err(CoreError::Internal(format!(
                "Unknown quest progress status '{other}'"
            ))),
        }
    }
}

/// Mentor decision on a submitted quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Quest has already been started")]
    AlreadyStarted,

    #[error("Quest is not available: {0}")]
    QuestUnavailable(String),

    #[error("No active progress for this quest")]
    NoActiveProgress,

    #[error("Quest has already been submitted and is awaiting review")]
    AlreadySubmitted,

    #[error("Quest has already been completed")]
    AlreadyCompleted,

    #[error("Quest progress is '{0}', only submitted quests can be reviewed")]
    NotSubmitted(QuestStatus),

    #[error("At least one evidence link is required")]
    MissingEvidence,
}

impl From<TransitionError> for CoreError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::MissingEvidence => CoreError::Validation(err.to_string()),
            other => CoreError::Conflict(other.to_string()),
        }
    }
}

/// Catalog facts that decide whether a quest may be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestGate {
    pub is_active: bool,
    pub is_locked: bool,
    pub unlock_at_xp: i64,
}

/// `start`: only when no progress exists and the quest is open to the mentee.
pub fn validate_start(
    existing: Option<QuestStatus>,
    gate: QuestGate,
    total_xp: i64,
) -> Result<(), TransitionError> {
    if existing.is_some_and(|s| s != QuestStatus::Available) {
        return Err(TransitionError::AlreadyStarted);
    }
    if !gate.is_active {
        return Err(TransitionError::QuestUnavailable("quest is inactive".into()));
    }
    if gate.is_locked {
        return Err(TransitionError::QuestUnavailable("quest is locked".into()));
    }
    if total_xp < gate.unlock_at_xp {
        return Err(TransitionError::QuestUnavailable(format!(
            "requires {} XP, mentee has {total_xp}",
            gate.unlock_at_xp
        )));
    }
    Ok(())
}

/// `submit`: only from `in_progress`, with at least one evidence link.
pub fn validate_submit(current: QuestStatus, evidence_links: &[String]) -> Result<(), TransitionError> {
    match current {
        QuestStatus::InProgress => {}
        QuestStatus::Available => return Err(TransitionError::NoActiveProgress),
        QuestStatus::Submitted => return Err(TransitionError::AlreadySubmitted),
        QuestStatus::Completed => return Err(TransitionError::AlreadyCompleted),
    }
    if evidence_links.iter().all(|link| link.trim().is_empty()) {
        return Err(TransitionError::MissingEvidence);
    }
    Ok(())
}

/// `approve` / `reject`: only from `submitted`.
pub fn validate_review(current: QuestStatus) -> Result<(), TransitionError> {
    if current == QuestStatus::Submitted {
        Ok(())
    } else {
        Err(TransitionError::NotSubmitted(current))
    }
}

// ---------------------------------------------------------------------------
// Catalog validation
// ---------------------------------------------------------------------------

/// Validate that a quest's XP reward is within the allowed range.
pub fn validate_xp_reward(xp_reward: i64) -> Result<(), CoreError> {
    if (MIN_XP_REWARD..=MAX_XP_REWARD).contains(&xp_reward) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "xp_reward must be between {MIN_XP_REWARD} and {MAX_XP_REWARD}, got {xp_reward}"
        )))
    }
}

/// Validate the unlock threshold of a quest.
pub fn validate_unlock_at_xp(unlock_at_xp: i64) -> Result<(), CoreError> {
    if unlock_at_xp < 0 {
        return Err(CoreError::Validation(format!(
            "unlock_at_xp must not be negative, got {unlock_at_xp}"
        )));
    }
    Ok(())
}

/// Drop blank entries from a list of already-sanitized evidence links.
pub fn normalize_evidence(links: &[String]) -> Vec<String> {
    links
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

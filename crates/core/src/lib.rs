//! Questline domain core.
//!
//! Pure progression rules with no database or HTTP dependencies: rank
//! derivation, streak tracking, bonus rules, reward calculation,
//! achievement requirements, the quest progress state machine and lucky
//! quest selection. Every function here is deterministic given its inputs
//! (the clock and random source are injected).

pub mod achievement;
pub mod activity;
pub mod bonus;
pub mod clock;
pub mod config;
pub mod error;
pub mod lucky;
pub mod quest;
pub mod rank;
pub mod reward;
pub mod roles;
pub mod streak;
pub mod types;

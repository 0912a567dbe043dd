//! Well-known role name constants.
//!
//! Tokens are issued by the external identity provider with one of these
//! role names in the `role` claim.

/// Reviews submissions, manages the quest catalog and resets stats.
pub const ROLE_MENTOR: &str = "mentor";

/// Starts and submits quests.
pub const ROLE_MENTEE: &str = "mentee";

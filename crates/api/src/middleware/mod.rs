//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the caller from a JWT Bearer token.
//! - [`rbac::RequireMentor`] -- Requires the `mentor` role.
//! - [`rbac::RequireMentee`] -- Requires the `mentee` role.

pub mod auth;
pub mod rbac;

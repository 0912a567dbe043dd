//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token validation, plus issuance for tooling and tests.

pub mod jwt;

//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! match. Mentors curate and review; the mentee starts and submits quests.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use questline_core::error::CoreError;
use questline_core::roles::{ROLE_MENTEE, ROLE_MENTOR};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `mentor` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn mentor_only(RequireMentor(user): RequireMentor) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireMentor(pub AuthUser);

impl FromRequestParts<AppState> for RequireMentor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_MENTOR {
            return Err(AppError::Core(CoreError::Forbidden(
                "Mentor role required".into(),
            )));
        }
        Ok(RequireMentor(user))
    }
}

/// Requires the `mentee` role. Rejects with 403 Forbidden otherwise.
pub struct RequireMentee(pub AuthUser);

impl FromRequestParts<AppState> for RequireMentee {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_MENTEE {
            return Err(AppError::Core(CoreError::Forbidden(
                "Mentee role required".into(),
            )));
        }
        Ok(RequireMentee(user))
    }
}

//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use medfin_db::UserRepository;
use medfin_db::entities::users;
use medfin_shared::AppError;
use medfin_shared::types::UserId;
use tracing::warn;

use crate::{AppState, error::ApiError};

/// Header carrying the authenticated user id, set by the upstream proxy.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user performing a write.
///
/// Authentication happens upstream; this only resolves the forwarded id to a
/// known user.
#[derive(Debug, Clone)]
pub struct ActingUser(pub users::Model);

impl ActingUser {
    /// The user's id.
    #[must_use]
    pub fn id(&self) -> UserId {
        UserId::new(self.0.id)
    }
}

impl FromRequestParts<AppState> for ActingUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| unauthorized("Authentication required"))?;

        let id = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| unauthorized("Malformed user id"))?;

        let user = UserRepository::new(state.conn())
            .find_by_id(UserId::new(id))
            .await?;
        match user {
            Some(user) => Ok(Self(user)),
            None => {
                warn!(user_id = id, "Request from unknown user");
                Err(unauthorized("Unknown user"))
            }
        }
    }
}

fn unauthorized(message: &str) -> ApiError {
    ApiError(AppError::Unauthorized(message.to_string()))
}

//! Bearer-token extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use std::convert::Infallible;
use tracing::debug;
use wonder_core::WonderError;
use wonder_store::User;

use crate::error::ApiError;
use crate::state::SharedState;

/// The caller, resolved from a required `Authorization: Bearer` header.
pub struct CurrentUser(pub User);

/// The caller if a valid bearer token was sent. Bad tokens are ignored.
pub struct MaybeUser(pub Option<User>);

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<SharedState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| WonderError::Unauthorized("Not authenticated".to_string()))?;
        let user = state.store.resolve_token(token).await?;
        Ok(CurrentUser(user))
    }
}

impl FromRequestParts<SharedState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(MaybeUser(None));
        };
        match state.store.resolve_token(token).await {
            Ok(user) => Ok(MaybeUser(Some(user))),
            Err(error) => {
                debug!(%error, "ignoring unusable bearer token");
                Ok(MaybeUser(None))
            }
        }
    }
}

/// Users may only read their own records.
pub fn ensure_owner(current: &User, user_id: &str, what: &str) -> Result<(), WonderError> {
    if current.id == user_id {
        Ok(())
    } else {
        Err(WonderError::Forbidden(format!(
            "Not authorized to access this user's {}",
            what
        )))
    }
}

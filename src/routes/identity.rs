//! Bearer-token identity extraction

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::crypto::decode_token;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{Role, Store, User, UserId};

/// The authenticated caller, as claimed by its bearer token
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<Arc<AppState<S>>> for Identity
where
    S: Store + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::NotAuthenticated)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::NotAuthenticated)?;

        let claims =
            decode_token(token, &state.jwt_secret).map_err(|_| ApiError::NotAuthenticated)?;

        Ok(Identity {
            user_id: UserId(claims.sub),
            role: claims.role,
        })
    }
}

/// Load the caller's current user record. Role decisions are made against
/// this fresh record, not against the token's claims.
pub fn resolve_actor<S: Store>(state: &AppState<S>, identity: Identity) -> Result<User, ApiError> {
    state
        .store
        .get_user(identity.user_id)?
        .ok_or(ApiError::UserNotFound)
}

//! Registration, login, and profile endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::identity::{resolve_actor, Identity};
use super::users::UserProfile;
use crate::crypto::{hash_password, issue_token, verify_password};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{Avatar, NewUser, Role, Store};

/// Minimum password length
const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<Avatar>,
}

/// POST /auth/register
pub async fn register<S>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<UserProfile>, ApiError>
where
    S: Store,
{
    if req.username.trim().is_empty() {
        return Err(ApiError::Validation("username must not be empty".to_string()));
    }
    if !req.email.contains('@') {
        return Err(ApiError::Validation("email is not valid".to_string()));
    }
    if req.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if state.store.find_by_username(&req.username)?.is_some() {
        return Err(ApiError::UsernameTaken);
    }
    if state.store.find_by_email(&req.email)?.is_some() {
        return Err(ApiError::EmailTaken);
    }

    let password_hash =
        hash_password(&req.password).map_err(|e| ApiError::Internal(e.to_string()))?;

    let user = state.store.create_user(NewUser {
        username: req.username.clone(),
        email: req.email,
        password_hash,
        first_name: Some(req.first_name.unwrap_or_else(|| req.username.clone())),
        last_name: Some(req.last_name.unwrap_or_default()),
        avatar: Some(req.avatar.unwrap_or(Avatar::Female)),
        role: Role::User,
    })?;

    // Fresh accounts start with the three fixed lists already in place
    state.store.ensure_default_lists(user.id)?;

    Ok(Json(user.into()))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub login: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// POST /auth/login
pub async fn login<S>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError>
where
    S: Store,
{
    let user = state
        .store
        .find_by_login(&req.login)?
        .ok_or(ApiError::InvalidCredentials)?;

    let valid = verify_password(&req.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let access_token = issue_token(&user, &state.jwt_secret, state.token_ttl_hours)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(LoginResponse { access_token }))
}

/// GET /auth/me
pub async fn me<S>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
) -> Result<Json<UserProfile>, ApiError>
where
    S: Store,
{
    let user = resolve_actor(&state, identity)?;
    Ok(Json(user.into()))
}

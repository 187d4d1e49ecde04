//! User management endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::{resolve_actor, Identity};
use super::Ack;
use crate::error::ApiError;
use crate::policy;
use crate::state::AppState;
use crate::store::{Avatar, ProfileUpdate, Role, Store, User, UserId};

/// A user as exposed over the API; the credential hash never leaves the store
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<Avatar>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id.0,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            avatar: user.avatar,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// GET /users
pub async fn list<S>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
) -> Result<Json<Vec<UserProfile>>, ApiError>
where
    S: Store,
{
    let actor = resolve_actor(&state, identity)?;
    policy::require_role(&actor, policy::ADMIN_ONLY)?;

    let users = state.store.list_users()?;
    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<Avatar>,
    pub role: Option<Role>,
}

/// PATCH /users/:id
pub async fn update<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<u64>,
    identity: Identity,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>, ApiError>
where
    S: Store,
{
    let target = UserId(id);
    let actor = resolve_actor(&state, identity)?;
    policy::require_self_or_admin(&actor, target)?;

    // Role changes are admin territory even on one's own account
    if let Some(role) = req.role {
        policy::require_role(&actor, policy::ADMIN_ONLY)?;
        state.store.set_role(target, role)?;
    }

    let update = ProfileUpdate {
        first_name: req.first_name,
        last_name: req.last_name,
        avatar: req.avatar,
    };

    let user = if update.is_empty() {
        state.store.get_user(target)?.ok_or(ApiError::UserNotFound)?
    } else {
        state.store.update_profile(target, update)?
    };

    Ok(Json(user.into()))
}

/// DELETE /users/:id
pub async fn remove<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<u64>,
    identity: Identity,
) -> Result<Json<Ack>, ApiError>
where
    S: Store,
{
    let actor = resolve_actor(&state, identity)?;
    policy::require_role(&actor, policy::ADMIN_ONLY)?;

    state.store.delete_user(UserId(id))?;
    Ok(Json(Ack { ok: true }))
}

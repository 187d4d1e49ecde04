//! Idempotent startup seeding

use crate::config::Config;
use crate::crypto::hash_password;
use crate::error::ApiError;
use crate::store::{Avatar, NewUser, Role, Store, StoreResult};

/// Guarantee the configured admin account exists. Called once at startup;
/// does nothing when the account is already present.
pub fn seed_admin<S: Store>(store: &S, config: &Config) -> StoreResult<()> {
    if store.find_by_username(&config.admin_username)?.is_some() {
        return Ok(());
    }

    let password_hash = hash_password(&config.admin_password)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let admin = store.create_user(NewUser {
        username: config.admin_username.clone(),
        email: config.admin_email.clone(),
        password_hash,
        first_name: Some("Admin".to_string()),
        last_name: Some("User".to_string()),
        avatar: Some(Avatar::Male),
        role: Role::Admin,
    })?;
    store.ensure_default_lists(admin.id)?;

    tracing::info!(username = %config.admin_username, "Seeded admin account");
    Ok(())
}

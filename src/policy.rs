//! Role predicates consulted inline by the resource handlers

use crate::error::ApiError;
use crate::store::{Role, User, UserId};

/// Operations reserved for admins: user management, request review
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Operations open to the curation roles: catalog mutation
pub const CATALOG_EDITORS: &[Role] = &[Role::Admin, Role::Editor];

/// Permit if the user's role is in the allowed set
pub fn require_role(user: &User, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Permit if the actor is an admin or is the target user
pub fn require_self_or_admin(actor: &User, target: UserId) -> Result<(), ApiError> {
    if actor.role == Role::Admin || actor.id == target {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with_role(id: u64, role: Role) -> User {
        User {
            id: UserId(id),
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            password_hash: "hashed".to_string(),
            first_name: None,
            last_name: None,
            avatar: None,
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_role() {
        let editor = user_with_role(1, Role::Editor);
        assert!(require_role(&editor, CATALOG_EDITORS).is_ok());
        assert!(matches!(
            require_role(&editor, ADMIN_ONLY),
            Err(ApiError::Forbidden)
        ));

        let admin = user_with_role(2, Role::Admin);
        assert!(require_role(&admin, ADMIN_ONLY).is_ok());
        assert!(require_role(&admin, CATALOG_EDITORS).is_ok());

        let user = user_with_role(3, Role::User);
        assert!(matches!(
            require_role(&user, CATALOG_EDITORS),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn test_require_self_or_admin() {
        let user = user_with_role(1, Role::User);
        assert!(require_self_or_admin(&user, UserId(1)).is_ok());
        assert!(matches!(
            require_self_or_admin(&user, UserId(2)),
            Err(ApiError::Forbidden)
        ));

        let admin = user_with_role(9, Role::Admin);
        assert!(require_self_or_admin(&admin, UserId(2)).is_ok());
    }
}

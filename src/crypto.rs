//! Password hashing and access-token utilities

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::store::{Role, User};

/// Default bcrypt cost factor
pub const BCRYPT_COST: u32 = 12;

/// Hash a password with bcrypt
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, BCRYPT_COST)
}

/// Verify a password against a bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}

/// Claims carried by an access token. The role is a hint for clients;
/// handlers re-resolve the user before any access-control decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: u64,
    pub role: Role,
    pub exp: usize,
}

/// Sign an access token for the given user
pub fn issue_token(
    user: &User,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + chrono::Duration::hours(ttl_hours)).timestamp() as usize;
    let claims = Claims {
        sub: user.id.0,
        role: user.role,
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and validate an access token
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UserId;

    fn test_user() -> User {
        User {
            id: UserId(7),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hashed".to_string(),
            first_name: None,
            last_name: None,
            avatar: None,
            role: Role::Editor,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_and_verify() {
        let password = "correct horse battery staple";
        let hash = hash_password(password).unwrap();

        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn test_token_round_trip() {
        let user = test_user();
        let token = issue_token(&user, "secret", 1).unwrap();
        let claims = decode_token(&token, "secret").unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, Role::Editor);
    }

    #[test]
    fn test_token_wrong_secret_rejected() {
        let user = test_user();
        let token = issue_token(&user, "secret", 1).unwrap();
        assert!(decode_token(&token, "other").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let user = test_user();
        let token = issue_token(&user, "secret", -1).unwrap();
        assert!(decode_token(&token, "secret").is_err());
    }
}

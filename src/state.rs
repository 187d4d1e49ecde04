//! Shared application state

use crate::store::Store;

/// Application state handed to every handler
pub struct AppState<S> {
    /// Backing store for users, titles, lists, and requests
    pub store: S,

    /// Secret used to sign and verify access tokens
    pub jwt_secret: String,

    /// Access-token lifetime in hours
    pub token_ttl_hours: i64,
}

impl<S: Store> AppState<S> {
    pub fn new(store: S, jwt_secret: impl Into<String>, token_ttl_hours: i64) -> Self {
        Self {
            store,
            jwt_secret: jwt_secret.into(),
            token_ttl_hours,
        }
    }
}

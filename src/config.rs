//! Service configuration

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// Path of the SQLite database file
    pub database_path: String,

    /// Secret used to sign access tokens
    pub jwt_secret: String,

    /// Access-token lifetime in hours
    pub token_ttl_hours: i64,

    /// Username of the seeded admin account
    pub admin_username: String,

    /// Email of the seeded admin account
    pub admin_email: String,

    /// Password of the seeded admin account
    pub admin_password: String,
}

impl Config {
    /// Build a config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            database_path: env::var("WATCHWHEEL_DB").unwrap_or(defaults.database_path),
            jwt_secret: env::var("WATCHWHEEL_JWT_SECRET").unwrap_or(defaults.jwt_secret),
            token_ttl_hours: env::var("WATCHWHEEL_TOKEN_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.token_ttl_hours),
            admin_username: env::var("WATCHWHEEL_ADMIN_USERNAME").unwrap_or(defaults.admin_username),
            admin_email: env::var("WATCHWHEEL_ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            admin_password: env::var("WATCHWHEEL_ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            database_path: "watchwheel.db".to_string(),
            jwt_secret: "dev-secret-change-me".to_string(),
            token_ttl_hours: 24,
            admin_username: "admin".to_string(),
            admin_email: "admin@admin.com".to_string(),
            admin_password: "admin123".to_string(),
        }
    }
}

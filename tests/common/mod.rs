//! Common helpers for the integration suites

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};
use watchwheel::{bootstrap, routes, AppState, Config, InMemoryStore};

/// Credentials of the seeded admin (Config defaults)
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Create a test server backed by a fresh in-memory store with the
/// admin account seeded
pub fn create_test_server() -> TestServer {
    let config = Config::default();
    let store = InMemoryStore::new();
    bootstrap::seed_admin(&store, &config).expect("seed admin");

    let state = Arc::new(AppState::new(
        store,
        config.jwt_secret.clone(),
        config.token_ttl_hours,
    ));
    let app = routes::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Register a user (email derived from the username) and return the profile
pub async fn register(server: &TestServer, username: &str, password: &str) -> Value {
    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": password,
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    response.json()
}

/// Log in and return the access token
pub async fn login(server: &TestServer, login: &str, password: &str) -> String {
    let response = server
        .post("/auth/login")
        .json(&json!({ "login": login, "password": password }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    body["access_token"]
        .as_str()
        .expect("No access token")
        .to_string()
}

/// Register a user and return its access token
pub async fn register_and_login(server: &TestServer, username: &str, password: &str) -> String {
    register(server, username, password).await;
    login(server, username, password).await
}

/// Access token of the seeded admin
pub async fn admin_token(server: &TestServer) -> String {
    login(server, ADMIN_USERNAME, ADMIN_PASSWORD).await
}

/// Register a user and promote it to editor through the real approval flow
pub async fn make_editor(server: &TestServer, username: &str, password: &str) -> String {
    let token = register_and_login(server, username, password).await;

    let response = server
        .post("/requests/become-editor")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let request_id = body["id"].as_u64().expect("request id");

    let admin = admin_token(server).await;
    let response = server
        .post(&format!("/admin/requests/{request_id}/approve"))
        .authorization_bearer(&admin)
        .await;
    assert_eq!(response.status_code(), 200);

    token
}

/// Create a title as the given editor/admin and return its id
pub async fn create_title(server: &TestServer, token: &str, name: &str, kind: &str) -> u64 {
    let response = server
        .post("/titles")
        .authorization_bearer(token)
        .json(&json!({ "name": name, "kind": kind }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    body["id"].as_u64().expect("title id")
}

//! Tests for registration, login, and the profile endpoint

mod common;

use common::{create_test_server, login, register, register_and_login};
use serde_json::{json, Value};

/// Test: registration fills in the documented defaults
#[tokio::test]
async fn test_register_defaults() {
    let server = create_test_server();

    let profile = register(&server, "alice", "password1").await;

    assert_eq!(profile["username"], "alice");
    assert_eq!(profile["email"], "alice@example.com");
    assert_eq!(profile["role"], "USER");
    assert_eq!(profile["firstName"], "alice");
    assert_eq!(profile["lastName"], "");
    assert_eq!(profile["avatar"], "female");
    assert!(profile.get("passwordHash").is_none());
}

/// Test: explicit profile fields are kept
#[tokio::test]
async fn test_register_with_profile_fields() {
    let server = create_test_server();

    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": "bob",
            "email": "bob@example.com",
            "password": "password1",
            "firstName": "Bob",
            "lastName": "Kaufman",
            "avatar": "male",
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    let profile: Value = response.json();
    assert_eq!(profile["firstName"], "Bob");
    assert_eq!(profile["lastName"], "Kaufman");
    assert_eq!(profile["avatar"], "male");
}

/// Test: duplicate username and email are conflicts
#[tokio::test]
async fn test_register_duplicates() {
    let server = create_test_server();
    register(&server, "alice", "password1").await;

    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "other@example.com",
            "password": "password1",
        }))
        .await;
    assert_eq!(response.status_code(), 409);

    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": "other",
            "email": "alice@example.com",
            "password": "password1",
        }))
        .await;
    assert_eq!(response.status_code(), 409);
}

/// Test: short passwords are rejected
#[tokio::test]
async fn test_register_short_password() {
    let server = create_test_server();

    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "short",
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

/// Test: login works with username or email
#[tokio::test]
async fn test_login_by_username_or_email() {
    let server = create_test_server();
    register(&server, "alice", "password1").await;

    login(&server, "alice", "password1").await;
    login(&server, "alice@example.com", "password1").await;
}

/// Test: wrong password and unknown user both fail with 401
#[tokio::test]
async fn test_login_failures() {
    let server = create_test_server();
    register(&server, "alice", "password1").await;

    let response = server
        .post("/auth/login")
        .json(&json!({ "login": "alice", "password": "wrong password" }))
        .await;
    assert_eq!(response.status_code(), 401);

    let response = server
        .post("/auth/login")
        .json(&json!({ "login": "nobody", "password": "password1" }))
        .await;
    assert_eq!(response.status_code(), 401);
}

/// Test: /auth/me returns the fresh profile
#[tokio::test]
async fn test_me() {
    let server = create_test_server();
    let token = register_and_login(&server, "alice", "password1").await;

    let response = server.get("/auth/me").authorization_bearer(&token).await;
    assert_eq!(response.status_code(), 200);
    let profile: Value = response.json();
    assert_eq!(profile["username"], "alice");
    assert_eq!(profile["role"], "USER");
}

/// Test: protected endpoints reject missing and malformed tokens
#[tokio::test]
async fn test_me_requires_token() {
    let server = create_test_server();

    let response = server.get("/auth/me").await;
    assert_eq!(response.status_code(), 401);

    let response = server
        .get("/auth/me")
        .authorization_bearer("not-a-real-token")
        .await;
    assert_eq!(response.status_code(), 401);
}

//! Tests for the catalog endpoints

mod common;

use common::{admin_token, create_test_server, create_title, make_editor, register_and_login};
use serde_json::{json, Value};

/// Test: the catalog is readable without authentication
#[tokio::test]
async fn test_list_is_public() {
    let server = create_test_server();
    let admin = admin_token(&server).await;
    create_title(&server, &admin, "Inception", "MOVIE").await;

    let response = server.get("/titles").await;
    assert_eq!(response.status_code(), 200);
    let titles: Value = response.json();
    assert_eq!(titles.as_array().unwrap().len(), 1);
    assert_eq!(titles[0]["name"], "Inception");
}

/// Test: kind filter narrows the catalog; ALL does not
#[tokio::test]
async fn test_list_kind_filter() {
    let server = create_test_server();
    let admin = admin_token(&server).await;
    create_title(&server, &admin, "Inception", "MOVIE").await;
    create_title(&server, &admin, "The Wire", "SERIES").await;

    let titles: Value = server.get("/titles?kind=SERIES").await.json();
    let titles = titles.as_array().unwrap();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0]["kind"], "SERIES");

    let titles: Value = server.get("/titles?kind=ALL").await.json();
    assert_eq!(titles.as_array().unwrap().len(), 2);
}

/// Test: newest titles come first
#[tokio::test]
async fn test_list_ordering() {
    let server = create_test_server();
    let admin = admin_token(&server).await;
    create_title(&server, &admin, "First", "MOVIE").await;
    create_title(&server, &admin, "Second", "MOVIE").await;

    let titles: Value = server.get("/titles").await.json();
    let names: Vec<&str> = titles
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Second", "First"]);
}

/// Test: plain users cannot create titles
#[tokio::test]
async fn test_create_requires_editor() {
    let server = create_test_server();
    let token = register_and_login(&server, "alice", "password1").await;

    let response = server
        .post("/titles")
        .authorization_bearer(&token)
        .json(&json!({ "name": "Inception", "kind": "MOVIE" }))
        .await;
    assert_eq!(response.status_code(), 403);

    let response = server
        .post("/titles")
        .json(&json!({ "name": "Inception", "kind": "MOVIE" }))
        .await;
    assert_eq!(response.status_code(), 401);
}

/// Test: an approved editor can create titles, and they carry the creator
#[tokio::test]
async fn test_editor_creates_title() {
    let server = create_test_server();
    let editor = make_editor(&server, "ed", "password1").await;

    let response = server
        .post("/titles")
        .authorization_bearer(&editor)
        .json(&json!({
            "name": "Inception",
            "kind": "MOVIE",
            "description": "A heist inside dreams",
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let title: Value = response.json();
    assert_eq!(title["name"], "Inception");
    assert_eq!(title["description"], "A heist inside dreams");
    assert!(title["createdBy"].is_u64());

    let mine: Value = server
        .get("/titles/mine")
        .authorization_bearer(&editor)
        .await
        .json();
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

/// Test: an empty name is rejected
#[tokio::test]
async fn test_create_empty_name() {
    let server = create_test_server();
    let admin = admin_token(&server).await;

    let response = server
        .post("/titles")
        .authorization_bearer(&admin)
        .json(&json!({ "name": "  ", "kind": "MOVIE" }))
        .await;
    assert_eq!(response.status_code(), 400);
}

/// Test: updates are partial; untouched fields survive
#[tokio::test]
async fn test_partial_update() {
    let server = create_test_server();
    let admin = admin_token(&server).await;

    let response = server
        .post("/titles")
        .authorization_bearer(&admin)
        .json(&json!({
            "name": "Inceptoin",
            "kind": "MOVIE",
            "description": "A heist inside dreams",
        }))
        .await;
    let title: Value = response.json();
    let id = title["id"].as_u64().unwrap();

    let response = server
        .patch(&format!("/titles/{id}"))
        .authorization_bearer(&admin)
        .json(&json!({ "name": "Inception" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let updated: Value = response.json();
    assert_eq!(updated["name"], "Inception");
    assert_eq!(updated["kind"], "MOVIE");
    assert_eq!(updated["description"], "A heist inside dreams");
}

/// Test: any editor may update a title created by someone else
#[tokio::test]
async fn test_update_not_restricted_to_creator() {
    let server = create_test_server();
    let admin = admin_token(&server).await;
    let id = create_title(&server, &admin, "Inception", "MOVIE").await;
    let editor = make_editor(&server, "ed", "password1").await;

    let response = server
        .patch(&format!("/titles/{id}"))
        .authorization_bearer(&editor)
        .json(&json!({ "description": "Re-described" }))
        .await;
    assert_eq!(response.status_code(), 200);
}

/// Test: updating or deleting a missing title is a 404
#[tokio::test]
async fn test_update_and_delete_missing() {
    let server = create_test_server();
    let admin = admin_token(&server).await;

    let response = server
        .patch("/titles/9999")
        .authorization_bearer(&admin)
        .json(&json!({ "name": "Nothing" }))
        .await;
    assert_eq!(response.status_code(), 404);

    let response = server
        .delete("/titles/9999")
        .authorization_bearer(&admin)
        .await;
    assert_eq!(response.status_code(), 404);
}

/// Test: deleting a title removes it from every user's lists
#[tokio::test]
async fn test_delete_cascades_to_lists() {
    let server = create_test_server();
    let admin = admin_token(&server).await;
    let id = create_title(&server, &admin, "Inception", "MOVIE").await;

    let alice = register_and_login(&server, "alice", "password1").await;
    let bob = register_and_login(&server, "bob", "password1").await;

    for (token, kind) in [(&alice, "WISHLIST"), (&bob, "WATCHED")] {
        let response = server
            .post(&format!("/lists/{kind}/add"))
            .authorization_bearer(token)
            .json(&json!({ "titleId": id }))
            .await;
        assert_eq!(response.status_code(), 200);
    }

    let response = server
        .delete(&format!("/titles/{id}"))
        .authorization_bearer(&admin)
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["ok"], true);

    for token in [&alice, &bob] {
        let lists: Value = server.get("/lists").authorization_bearer(token).await.json();
        for list in lists.as_array().unwrap() {
            assert!(list["items"].as_array().unwrap().is_empty());
        }
    }
}

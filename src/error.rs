//! Service error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("User not found")]
    UserNotFound,

    #[error("Title not found")]
    TitleNotFound,

    #[error("List not found")]
    ListNotFound,

    #[error("Not in list")]
    EntryNotFound,

    #[error("Request not found")]
    RequestNotFound,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Already in list")]
    AlreadyInList,

    #[error("Editor role already granted")]
    AlreadyEditor,

    #[error("A pending request already exists")]
    RequestAlreadyPending,

    #[error("Request is no longer pending")]
    RequestNotPending,

    #[error("Only admins can adjudicate requests")]
    NotAdjudicator,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Forbidden")]
    Forbidden,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            ApiError::TitleNotFound => (StatusCode::NOT_FOUND, "Title not found"),
            ApiError::ListNotFound => (StatusCode::NOT_FOUND, "List not found"),
            ApiError::EntryNotFound => (StatusCode::NOT_FOUND, "Not in list"),
            ApiError::RequestNotFound => (StatusCode::NOT_FOUND, "Request not found"),
            ApiError::UsernameTaken => (StatusCode::CONFLICT, "Username already exists"),
            ApiError::EmailTaken => (StatusCode::CONFLICT, "Email already exists"),
            ApiError::AlreadyInList => (StatusCode::CONFLICT, "Already in list"),
            ApiError::AlreadyEditor => {
                (StatusCode::BAD_REQUEST, "Editor role already granted")
            }
            ApiError::RequestAlreadyPending => {
                (StatusCode::BAD_REQUEST, "A pending request already exists")
            }
            ApiError::RequestNotPending => {
                (StatusCode::BAD_REQUEST, "Request is no longer pending")
            }
            ApiError::NotAdjudicator => {
                (StatusCode::BAD_REQUEST, "Only admins can adjudicate requests")
            }
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            ApiError::NotAuthenticated => (StatusCode::UNAUTHORIZED, "Not authenticated"),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "success": false, "reason": message });
        (status, axum::Json(body)).into_response()
    }
}

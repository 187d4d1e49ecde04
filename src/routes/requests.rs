//! Editor-elevation request endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::identity::{resolve_actor, Identity};
use crate::error::ApiError;
use crate::policy;
use crate::state::AppState;
use crate::store::{EditorRequest, RequestId, RequestStatus, Role, Store};

/// POST /requests/become-editor
pub async fn create<S>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
) -> Result<Json<EditorRequest>, ApiError>
where
    S: Store,
{
    let actor = resolve_actor(&state, identity)?;
    if matches!(actor.role, Role::Editor | Role::Admin) {
        return Err(ApiError::AlreadyEditor);
    }

    let request = state.store.create_request(actor.id)?;
    Ok(Json(request))
}

/// GET /requests/my
pub async fn mine<S>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
) -> Result<Json<Vec<EditorRequest>>, ApiError>
where
    S: Store,
{
    let requests = state.store.requests_by_user(identity.user_id)?;
    Ok(Json(requests))
}

/// A pending request joined with its requester, for the review queue
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequestView {
    #[serde(flatten)]
    pub request: EditorRequest,
    pub requester_username: String,
}

/// GET /admin/requests
pub async fn list_pending<S>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
) -> Result<Json<Vec<PendingRequestView>>, ApiError>
where
    S: Store,
{
    let actor = resolve_actor(&state, identity)?;
    policy::require_role(&actor, policy::ADMIN_ONLY)?;

    let pending = state.store.pending_requests()?;
    let mut views = Vec::with_capacity(pending.len());
    for request in pending {
        let requester = state
            .store
            .get_user(request.requested_by)?
            .ok_or_else(|| ApiError::Internal("request references missing user".to_string()))?;
        views.push(PendingRequestView {
            request,
            requester_username: requester.username,
        });
    }

    Ok(Json(views))
}

/// POST /admin/requests/:id/approve
pub async fn approve<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<u64>,
    identity: Identity,
) -> Result<Json<EditorRequest>, ApiError>
where
    S: Store,
{
    let id = RequestId(id);
    let request = state
        .store
        .get_request(id)?
        .ok_or(ApiError::RequestNotFound)?;
    if request.status != RequestStatus::Pending {
        return Err(ApiError::RequestNotPending);
    }

    let admin = resolve_actor(&state, identity)?;
    if admin.role != Role::Admin {
        return Err(ApiError::NotAdjudicator);
    }

    // Decide first; a racing second adjudication loses at the store and
    // never reaches the role grant
    let resolved = state
        .store
        .resolve_request(id, RequestStatus::Approved, admin.id, None)?;
    state.store.set_role(request.requested_by, Role::Editor)?;

    Ok(Json(resolved))
}

#[derive(Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

/// POST /admin/requests/:id/reject
pub async fn reject<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<u64>,
    identity: Identity,
    body: Option<Json<RejectRequest>>,
) -> Result<Json<EditorRequest>, ApiError>
where
    S: Store,
{
    let id = RequestId(id);
    let request = state
        .store
        .get_request(id)?
        .ok_or(ApiError::RequestNotFound)?;
    if request.status != RequestStatus::Pending {
        return Err(ApiError::RequestNotPending);
    }

    let admin = resolve_actor(&state, identity)?;
    if admin.role != Role::Admin {
        return Err(ApiError::NotAdjudicator);
    }

    let reason = body.and_then(|Json(body)| body.reason);
    let resolved = state
        .store
        .resolve_request(id, RequestStatus::Rejected, admin.id, reason)?;

    Ok(Json(resolved))
}

//! Personal-list endpoints

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::Identity;
use super::{Ack, KindQuery};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{ListEntry, ListKind, Store, TitleId};

/// One personal list with its memberships, as returned to clients
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    pub id: u64,
    pub kind: ListKind,
    pub created_at: DateTime<Utc>,
    pub items: Vec<ListEntry>,
}

/// GET /lists
///
/// A `kind` filter narrows each list's items in memory; the three lists
/// themselves are always present in the response.
pub async fn my_lists<S>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Query(query): Query<KindQuery>,
) -> Result<Json<Vec<ListView>>, ApiError>
where
    S: Store,
{
    state.store.ensure_default_lists(identity.user_id)?;

    let lists = state.store.lists_for_user(identity.user_id)?;
    let filter = query.title_kind();

    let mut views = Vec::with_capacity(lists.len());
    for list in lists {
        let mut items = state.store.entries_for_list(list.id)?;
        if let Some(kind) = filter {
            items.retain(|entry| entry.title.kind == kind);
        }
        views.push(ListView {
            id: list.id.0,
            kind: list.kind,
            created_at: list.created_at,
            items,
        });
    }

    Ok(Json(views))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRequest {
    pub title_id: u64,
}

/// POST /lists/:kind/add
pub async fn add<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(kind): Path<ListKind>,
    identity: Identity,
    Json(req): Json<EntryRequest>,
) -> Result<Json<ListEntry>, ApiError>
where
    S: Store,
{
    state.store.ensure_default_lists(identity.user_id)?;

    let list = state
        .store
        .find_list(identity.user_id, kind)?
        .ok_or(ApiError::ListNotFound)?;
    let title = state
        .store
        .get_title(TitleId(req.title_id))?
        .ok_or(ApiError::TitleNotFound)?;

    let entry = state.store.add_entry(list.id, title.id)?;
    Ok(Json(entry))
}

/// POST /lists/:kind/remove
pub async fn remove<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(kind): Path<ListKind>,
    identity: Identity,
    Json(req): Json<EntryRequest>,
) -> Result<Json<Ack>, ApiError>
where
    S: Store,
{
    let list = state
        .store
        .find_list(identity.user_id, kind)?
        .ok_or(ApiError::ListNotFound)?;

    state.store.remove_entry(list.id, TitleId(req.title_id))?;
    Ok(Json(Ack { ok: true }))
}

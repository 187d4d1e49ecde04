//! Catalog endpoints

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::identity::{resolve_actor, Identity};
use super::{Ack, KindQuery};
use crate::error::ApiError;
use crate::policy;
use crate::state::AppState;
use crate::store::{NewTitle, Store, Title, TitleId, TitleKind, TitlePatch};

/// GET /titles
///
/// Public read; the catalog is browsable without an account.
pub async fn list<S>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<KindQuery>,
) -> Result<Json<Vec<Title>>, ApiError>
where
    S: Store,
{
    let titles = state.store.list_titles(query.title_kind())?;
    Ok(Json(titles))
}

/// GET /titles/mine
pub async fn mine<S>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
) -> Result<Json<Vec<Title>>, ApiError>
where
    S: Store,
{
    let titles = state.store.list_titles_by_creator(identity.user_id)?;
    Ok(Json(titles))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTitleRequest {
    pub name: String,
    pub kind: TitleKind,
    pub description: Option<String>,
    pub poster_url: Option<String>,
}

/// POST /titles
pub async fn create<S>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Json(req): Json<CreateTitleRequest>,
) -> Result<Json<Title>, ApiError>
where
    S: Store,
{
    let actor = resolve_actor(&state, identity)?;
    policy::require_role(&actor, policy::CATALOG_EDITORS)?;

    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".to_string()));
    }

    let title = state.store.create_title(
        NewTitle {
            name: req.name,
            kind: req.kind,
            description: req.description,
            poster_url: req.poster_url,
        },
        actor.id,
    )?;

    Ok(Json(title))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTitleRequest {
    pub name: Option<String>,
    pub kind: Option<TitleKind>,
    pub description: Option<String>,
    pub poster_url: Option<String>,
}

/// PATCH /titles/:id
///
/// Any editor or admin may update any title, not just their own.
pub async fn update<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<u64>,
    identity: Identity,
    Json(req): Json<UpdateTitleRequest>,
) -> Result<Json<Title>, ApiError>
where
    S: Store,
{
    let actor = resolve_actor(&state, identity)?;
    policy::require_role(&actor, policy::CATALOG_EDITORS)?;

    if let Some(name) = &req.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("name must not be empty".to_string()));
        }
    }

    let title = state.store.update_title(
        TitleId(id),
        TitlePatch {
            name: req.name,
            kind: req.kind,
            description: req.description,
            poster_url: req.poster_url,
        },
    )?;

    Ok(Json(title))
}

/// DELETE /titles/:id
pub async fn remove<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<u64>,
    identity: Identity,
) -> Result<Json<Ack>, ApiError>
where
    S: Store,
{
    let actor = resolve_actor(&state, identity)?;
    policy::require_role(&actor, policy::CATALOG_EDITORS)?;

    state.store.delete_title(TitleId(id))?;
    Ok(Json(Ack { ok: true }))
}

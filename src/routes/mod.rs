//! HTTP routes for the catalog service

mod auth;
mod identity;
mod lists;
mod requests;
mod titles;
mod users;

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use identity::Identity;

use crate::state::AppState;
use crate::store::{Store, TitleKind};

/// Plain acknowledgment body for delete-style operations
#[derive(Serialize)]
pub struct Ack {
    pub ok: bool,
}

/// Catalog-kind filter accepted by listing endpoints
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KindFilter {
    Movie,
    Series,
    All,
}

/// `?kind=` query accepted by title and list reads
#[derive(Debug, Default, Deserialize)]
pub struct KindQuery {
    pub kind: Option<KindFilter>,
}

impl KindQuery {
    /// The title kind to restrict to, if any; `ALL` and absent mean no filter
    fn title_kind(&self) -> Option<TitleKind> {
        match self.kind {
            Some(KindFilter::Movie) => Some(TitleKind::Movie),
            Some(KindFilter::Series) => Some(TitleKind::Series),
            Some(KindFilter::All) | None => None,
        }
    }
}

/// Create the router with all routes
pub fn create_router<S>(state: Arc<AppState<S>>) -> Router
where
    S: Store + 'static,
{
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/users", get(users::list))
        .route("/users/:id", patch(users::update).delete(users::remove))
        .route("/titles", get(titles::list).post(titles::create))
        .route("/titles/mine", get(titles::mine))
        .route("/titles/:id", patch(titles::update).delete(titles::remove))
        .route("/lists", get(lists::my_lists))
        .route("/lists/:kind/add", post(lists::add))
        .route("/lists/:kind/remove", post(lists::remove))
        .route("/requests/become-editor", post(requests::create))
        .route("/requests/my", get(requests::mine))
        .route("/admin/requests", get(requests::list_pending))
        .route("/admin/requests/:id/approve", post(requests::approve))
        .route("/admin/requests/:id/reject", post(requests::reject))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

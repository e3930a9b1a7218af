//! Short-link record store with click analytics.
//!
//! [`LinkStore`] owns every link. Creating a link assigns it a unique code
//! (generated or caller-chosen), and resolving a code records exactly one
//! click against it. Read-only views live in [`query`], the persisted JSON
//! form in [`snapshot`], and a small JSON API over all of it in [`handlers`].

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod analytics;
pub mod code;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod query;
pub mod snapshot;
pub mod store;

pub use error::{SnapshotError, StoreError};
pub use models::{AnalyticsEvent, Device, LinkRecord, LinkSummary};
pub use store::LinkStore;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub store: LinkStore,
    pub config: config::AppConfig,
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route(
            "/links",
            get(handlers::links::list_links).post(handlers::links::create_link),
        )
        .route("/links/:code", get(handlers::links::get_link))
        .route("/links/:code/analytics", get(handlers::links::analytics))
        .route("/resolve/:code", post(handlers::resolve::resolve));

    Router::new()
        .route("/health", get(|| async { axum::http::StatusCode::OK }))
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

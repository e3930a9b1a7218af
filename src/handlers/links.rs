use crate::{
    error::StoreError,
    models::{Activity, DeviceCount, LinkRecord, LinkSummary, Totals},
    query, AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How many clicks the analytics view lists when the caller does not say.
const DEFAULT_ACTIVITY_LIMIT: usize = 500;

// ── Request / response types ───────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkBody {
    url: String,
    custom_slug: Option<String>,
}

#[derive(Deserialize)]
pub struct ActivityParams {
    limit: Option<usize>,
}

/// A link together with its public short URL.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkView {
    pub link: LinkRecord,
    pub short_url: String,
}

#[derive(Serialize)]
pub struct LinkList {
    pub links: Vec<LinkView>,
    pub totals: Totals,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsView {
    pub link: LinkView,
    pub summary: LinkSummary,
    pub devices: Vec<DeviceCount>,
    pub recent: Vec<Activity>,
}

fn view(state: &AppState, link: LinkRecord) -> LinkView {
    LinkView {
        short_url: query::short_url(&state.config.base_url, &link.code),
        link,
    }
}

// ── Handlers ───────────────────────────────────────────────────────────────

/// POST /api/links
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateLinkBody>,
) -> Result<(StatusCode, Json<LinkView>), StoreError> {
    // A blank slug means "generate one for me".
    let custom_slug = body
        .custom_slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let link = state.store.create_link(&body.url, custom_slug).await?;
    Ok((StatusCode::CREATED, Json(view(&state, link))))
}

/// GET /api/links
pub async fn list_links(State(state): State<Arc<AppState>>) -> Json<LinkList> {
    let (links, totals) = state.store.list_with_totals().await;

    Json(LinkList {
        links: links.into_iter().map(|l| view(&state, l)).collect(),
        totals,
    })
}

/// GET /api/links/:code
pub async fn get_link(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<LinkView>, StoreError> {
    let link = state.store.get_by_code(&code).await?;
    Ok(Json(view(&state, link)))
}

/// GET /api/links/:code/analytics
///
/// Every figure is derived from one copy of the record, so the summary, the
/// device histogram and the activity list always agree with each other.
pub async fn analytics(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Query(params): Query<ActivityParams>,
) -> Result<Json<AnalyticsView>, StoreError> {
    let link = state.store.get_by_code(&code).await?;

    let summary = query::summarize(&link);
    let devices = query::device_breakdown(&link);
    let recent = query::recent_activity(&link, params.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT));

    Ok(Json(AnalyticsView {
        link: view(&state, link),
        summary,
        devices,
        recent,
    }))
}

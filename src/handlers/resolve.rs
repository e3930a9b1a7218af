use crate::{error::StoreError, models::LinkRecord, AppState};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub original_url: String,
    pub link: LinkRecord,
}

/// POST /api/resolve/:code
///
/// Records one click using the request's User-Agent and hands back the
/// destination. The caller performs the navigation itself; this endpoint
/// never issues an HTTP redirect.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Resolution>, StoreError> {
    // Keep non-UTF-8 agents rather than dropping them; only a missing header is "unknown".
    let user_agent = headers
        .get("user-agent")
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

    let link = state
        .store
        .resolve(&code, user_agent.as_deref())
        .await
        .map_err(|e| {
            tracing::debug!("Resolve of '{}' failed: {}", code, e);
            e
        })?;

    Ok(Json(Resolution {
        original_url: link.original_url.clone(),
        link,
    }))
}

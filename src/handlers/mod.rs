use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::StoreError;

pub mod links;
pub mod resolve;

// ── Error responses ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl StoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            StoreError::InvalidUrl(_) | StoreError::InvalidSlug(_) => StatusCode::BAD_REQUEST,
            StoreError::SlugTaken(_) => StatusCode::CONFLICT,
            StoreError::CodeSpaceExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Store error: {}", self);
        }

        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

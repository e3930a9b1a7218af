use thiserror::Error;

/// Failures reported by [`LinkStore`](crate::store::LinkStore) operations.
///
/// Every variant is a local validation or lookup failure. None of them leave
/// the store in a partially-updated state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("custom slug may only contain letters, numbers, and hyphens: {0:?}")]
    InvalidSlug(String),

    #[error("short code '{0}' is already taken")]
    SlugTaken(String),

    #[error("no free short code found after {attempts} attempt(s)")]
    CodeSpaceExhausted { attempts: u32 },

    #[error("short link '{0}' not found")]
    NotFound(String),
}

impl StoreError {
    /// Stable machine-readable name, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::InvalidUrl(_) => "InvalidUrl",
            StoreError::InvalidSlug(_) => "InvalidSlug",
            StoreError::SlugTaken(_) => "SlugTaken",
            StoreError::CodeSpaceExhausted { .. } => "CodeSpaceExhausted",
            StoreError::NotFound(_) => "NotFound",
        }
    }
}

/// Failures at the boundary with the on-disk JSON snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot record '{code}' is inconsistent: {reason}")]
    Inconsistent { code: String, reason: String },

    #[error("snapshot contains short code '{0}' more than once")]
    DuplicateCode(String),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

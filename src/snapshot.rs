use std::{collections::HashSet, path::Path};

use crate::{
    code,
    error::SnapshotError,
    models::LinkRecord,
    store::{normalize_url, LinkStore},
};

// ── JSON form ──────────────────────────────────────────────────────────────

/// Serialise records (newest first) to the persisted JSON array.
pub fn to_json(records: &[LinkRecord]) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(records)?)
}

/// Parse and validate a persisted JSON array.
pub fn from_json(json: &str) -> Result<Vec<LinkRecord>, SnapshotError> {
    let records: Vec<LinkRecord> = serde_json::from_str(json)?;
    validate(&records)?;
    Ok(records)
}

/// Reject snapshots that would break store invariants if loaded.
pub fn validate(records: &[LinkRecord]) -> Result<(), SnapshotError> {
    let mut codes = HashSet::with_capacity(records.len());
    let mut ids = HashSet::with_capacity(records.len());

    for record in records {
        let inconsistent = |reason: String| SnapshotError::Inconsistent {
            code: record.code.clone(),
            reason,
        };

        code::validate_slug(&record.code).map_err(|e| inconsistent(e.to_string()))?;

        if let Some(slug) = &record.custom_slug {
            if slug != &record.code {
                return Err(inconsistent(format!(
                    "customSlug '{slug}' differs from shortCode"
                )));
            }
        }

        match normalize_url(&record.original_url) {
            Ok(url) if url == record.original_url => {}
            Ok(url) => return Err(inconsistent(format!("originalUrl is not normalised ({url})"))),
            Err(e) => return Err(inconsistent(e.to_string())),
        }

        if record.click_count != record.events.len() as u64 {
            return Err(inconsistent(format!(
                "clicks is {} but {} analytics event(s) are recorded",
                record.click_count,
                record.events.len()
            )));
        }

        if !ids.insert(record.id.as_str()) {
            return Err(inconsistent(format!("id '{}' is used twice", record.id)));
        }
        if !codes.insert(record.code.as_str()) {
            return Err(SnapshotError::DuplicateCode(record.code.clone()));
        }
    }

    Ok(())
}

// ── Files ──────────────────────────────────────────────────────────────────

/// Load `path` into `store`, replacing its contents.
///
/// A missing file is not an error: the store is left as it is and `0` is
/// returned.
pub async fn load(store: &LinkStore, path: &Path) -> Result<usize, SnapshotError> {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No saved links at {}", path.display());
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };

    let records = from_json(&json)?;
    store.restore(records).await
}

/// Write every link in `store` to `path`.
///
/// The JSON goes to a sibling temp file first and is renamed over `path`, so
/// a reader never sees a half-written snapshot.
pub async fn save(store: &LinkStore, path: &Path) -> Result<usize, SnapshotError> {
    let records = store.list_links().await;
    let json = to_json(&records)?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;

    tracing::info!("Saved {} link(s) to {}", records.len(), path.display());
    Ok(records.len())
}

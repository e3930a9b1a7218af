use std::collections::HashMap;

use tokio::sync::RwLock;
use url::Url;
use uuid::Uuid;

use crate::{
    analytics,
    code::{self, CodeGenerator, RandomCodeGenerator},
    error::{Result, SnapshotError, StoreError},
    models::{self, LinkRecord},
    snapshot,
};

/// Retry cap for generated codes when the caller does not configure one.
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 10;

// ── State ──────────────────────────────────────────────────────────────────

/// Everything guarded by the store lock.
///
/// `records` is kept in creation order and `by_code` maps every live code
/// (generated or custom) to its index in `records`.
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) records: Vec<LinkRecord>,
    pub(crate) by_code: HashMap<String, usize>,
}

impl StoreState {
    fn insert(&mut self, record: LinkRecord) {
        self.by_code.insert(record.code.clone(), self.records.len());
        self.records.push(record);
    }
}

// ── Store ──────────────────────────────────────────────────────────────────

/// Owner of every link record.
///
/// All mutations take the write half of a single `RwLock` and finish their
/// read-modify-write before releasing it, so the uniqueness check and the
/// insert of `create_link`, and the append plus increment of `resolve`, are
/// each observed as one step. Readers clone out of the read half and
/// therefore always see committed records.
pub struct LinkStore {
    state: RwLock<StoreState>,
    generator: Box<dyn CodeGenerator>,
    max_code_attempts: u32,
}

impl LinkStore {
    /// An empty store with random six-character codes.
    pub fn new() -> Self {
        Self::with_generator(RandomCodeGenerator, DEFAULT_MAX_CODE_ATTEMPTS)
    }

    /// An empty store drawing candidate codes from `generator`, giving up
    /// after `max_code_attempts` collisions in a row (at least one attempt is
    /// always made).
    pub fn with_generator(generator: impl CodeGenerator + 'static, max_code_attempts: u32) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            generator: Box::new(generator),
            max_code_attempts: max_code_attempts.max(1),
        }
    }

    pub(crate) async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, StoreState> {
        self.state.read().await
    }

    /// Create a link for `original_url`, using `custom_slug` as its code when
    /// given and a fresh generated code otherwise.
    pub async fn create_link(
        &self,
        original_url: &str,
        custom_slug: Option<&str>,
    ) -> Result<LinkRecord> {
        let original_url = normalize_url(original_url)?;
        if let Some(slug) = custom_slug {
            code::validate_slug(slug)?;
        }

        let mut state = self.state.write().await;

        let code = match custom_slug {
            Some(slug) => {
                if state.by_code.contains_key(slug) {
                    tracing::debug!("Custom slug '{}' is already taken", slug);
                    return Err(StoreError::SlugTaken(slug.to_owned()));
                }
                slug.to_owned()
            }
            None => self.free_code(&state)?,
        };

        let record = LinkRecord {
            id: Uuid::new_v4().to_string(),
            original_url,
            custom_slug: custom_slug.map(str::to_owned),
            code,
            created_at: models::now(),
            click_count: 0,
            events: Vec::new(),
        };
        state.insert(record.clone());

        tracing::info!("Created link '{}' -> {}", record.code, record.original_url);
        Ok(record)
    }

    /// Look up `code` and record one click against it.
    ///
    /// `signature` is the caller's User-Agent, if it sent one. Returns the
    /// record as it stands after the click.
    pub async fn resolve(&self, code: &str, signature: Option<&str>) -> Result<LinkRecord> {
        let mut state = self.state.write().await;

        let idx = *state
            .by_code
            .get(code)
            .ok_or_else(|| StoreError::NotFound(code.to_owned()))?;

        let record = &mut state.records[idx];
        analytics::record_click(record, signature, models::now());

        tracing::debug!("Resolved '{}' (click #{})", record.code, record.click_count);
        Ok(record.clone())
    }

    /// Replace the whole store with `records`, given newest first as
    /// [`list_links`](Self::list_links) returns them.
    ///
    /// The records are validated before the lock is taken; on error the
    /// current contents are left untouched.
    pub async fn restore(&self, records: Vec<LinkRecord>) -> Result<usize, SnapshotError> {
        snapshot::validate(&records)?;

        let mut fresh = StoreState::default();
        for record in records.into_iter().rev() {
            fresh.insert(record);
        }
        let count = fresh.records.len();

        *self.state.write().await = fresh;
        tracing::info!("Restored {} link(s)", count);
        Ok(count)
    }

    /// Draw candidates until one is unused, up to the configured cap.
    fn free_code(&self, state: &StoreState) -> Result<String> {
        for attempt in 1..=self.max_code_attempts {
            let candidate = self.generator.generate();
            if !state.by_code.contains_key(&candidate) {
                return Ok(candidate);
            }
            tracing::warn!(
                "Generated code '{}' collided (attempt {}/{})",
                candidate,
                attempt,
                self.max_code_attempts
            );
        }

        tracing::error!(
            "No free short code after {} attempt(s)",
            self.max_code_attempts
        );
        Err(StoreError::CodeSpaceExhausted {
            attempts: self.max_code_attempts,
        })
    }
}

impl Default for LinkStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── URL normalisation ──────────────────────────────────────────────────────

/// Trim `raw`, prefix `https://` when it carries no scheme, and check that the
/// result is an absolute http(s) URL with a host.
///
/// The returned string is the prefixed input, not the parser's canonical
/// form, so `example.com` becomes `https://example.com` with no trailing slash.
pub fn normalize_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidUrl("URL must not be empty".into()));
    }

    let candidate = if has_scheme(trimmed) {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let parsed =
        Url::parse(&candidate).map_err(|e| StoreError::InvalidUrl(format!("{candidate}: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(StoreError::InvalidUrl(format!(
            "{candidate}: only http and https URLs can be shortened"
        )));
    }
    if !parsed.has_host() {
        return Err(StoreError::InvalidUrl(format!("{candidate}: missing host")));
    }

    Ok(candidate)
}

/// `true` if `s` starts with `scheme://` where scheme is `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
fn has_scheme(s: &str) -> bool {
    let Some((scheme, _)) = s.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

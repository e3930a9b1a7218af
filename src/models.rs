use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

// ── Records ────────────────────────────────────────────────────────────────

/// A shortened link and its click log.
///
/// Serialises to the persisted JSON shape, so `code` appears as `shortCode`,
/// `click_count` as `clicks` and `events` as `analytics`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub id: String,
    pub original_url: String,
    #[serde(rename = "shortCode")]
    pub code: String,
    /// Equal to `code` when the caller chose it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_slug: Option<String>,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "clicks")]
    pub click_count: u64,
    #[serde(rename = "analytics")]
    pub events: Vec<AnalyticsEvent>,
}

impl LinkRecord {
    pub fn is_custom(&self) -> bool {
        self.custom_slug.is_some()
    }
}

/// One resolution of a short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub device: Device,
    #[serde(rename = "userAgent")]
    pub raw_signature: String,
}

/// Coarse device category derived from a User-Agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Mobile,
    Tablet,
    Desktop,
    Unknown,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Mobile => "mobile",
            Device::Tablet => "tablet",
            Device::Desktop => "desktop",
            Device::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Derived views ──────────────────────────────────────────────────────────

/// Summary statistics shown on the analytics panel of a single link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSummary {
    pub total_clicks: u64,
    pub distinct_device_count: usize,
    pub avg_daily_clicks: u64,
}

/// Store-wide counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub links: usize,
    pub total_clicks: u64,
}

/// One row of the device histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceCount {
    pub device: Device,
    pub count: u64,
    /// Whole-number percentage of all clicks.
    pub percent: u64,
}

/// An event paired with its 1-based position in the click log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub click_number: usize,
    #[serde(flatten)]
    pub event: AnalyticsEvent,
}

/// Current time truncated to the precision the snapshot format keeps.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// `YYYY-MM-DDTHH:MM:SS.sssZ`, the shape browsers produce with `toISOString()`.
pub(crate) mod iso_millis {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Only the exact shape `serialize` writes is accepted, so reading and
    /// re-writing a timestamp never changes its text or its instant.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let bytes = raw.as_bytes();
        if bytes.len() != 24 || bytes[19] != b'.' || bytes[23] != b'Z' {
            return Err(serde::de::Error::custom(format!(
                "timestamp {raw:?} is not in YYYY-MM-DDTHH:MM:SS.sssZ form"
            )));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.3fZ")
            .map(|naive| naive.and_utc())
            .map_err(|e| serde::de::Error::custom(format!("timestamp {raw:?}: {e}")))
    }
}

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::{
    error::{Result, StoreError},
    models::{Activity, Device, DeviceCount, LinkRecord, LinkSummary, Totals},
    store::LinkStore,
};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

// ── Store reads ────────────────────────────────────────────────────────────

impl LinkStore {
    /// Every link, most recently created first.
    pub async fn list_links(&self) -> Vec<LinkRecord> {
        let state = self.read().await;
        state.records.iter().rev().cloned().collect()
    }

    /// Fetch one link by code without recording a click.
    pub async fn get_by_code(&self, code: &str) -> Result<LinkRecord> {
        let state = self.read().await;
        state
            .by_code
            .get(code)
            .map(|&idx| state.records[idx].clone())
            .ok_or_else(|| StoreError::NotFound(code.to_owned()))
    }

    /// Number of links and the sum of their clicks.
    pub async fn totals(&self) -> Totals {
        totals_of(&self.read().await.records)
    }

    /// [`list_links`](Self::list_links) and [`totals`](Self::totals) taken
    /// from the same read guard, so the counters match the listed records.
    pub async fn list_with_totals(&self) -> (Vec<LinkRecord>, Totals) {
        let state = self.read().await;
        let links = state.records.iter().rev().cloned().collect();
        (links, totals_of(&state.records))
    }

    pub async fn len(&self) -> usize {
        self.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.read().await.records.is_empty()
    }
}

fn totals_of(records: &[LinkRecord]) -> Totals {
    Totals {
        links: records.len(),
        total_clicks: records.iter().map(|r| r.click_count).sum(),
    }
}

// ── Per-record aggregates ──────────────────────────────────────────────────

/// Summary statistics for `record` as of now.
pub fn summarize(record: &LinkRecord) -> LinkSummary {
    summarize_at(record, Utc::now())
}

/// Summary statistics for `record` as of `now`.
///
/// Average daily clicks divide by the number of started days since creation,
/// never less than one, and round half up.
pub fn summarize_at(record: &LinkRecord, now: DateTime<Utc>) -> LinkSummary {
    let total = record.click_count;

    let elapsed_ms = (now - record.created_at).num_milliseconds();
    let days = if elapsed_ms <= 0 {
        1
    } else {
        ((elapsed_ms + DAY_MS - 1) / DAY_MS).max(1) as u64
    };

    let distinct_device_count = record
        .events
        .iter()
        .map(|e| e.device)
        .collect::<std::collections::BTreeSet<_>>()
        .len();

    LinkSummary {
        total_clicks: total,
        distinct_device_count,
        avg_daily_clicks: (2 * total + days) / (2 * days),
    }
}

/// Tally clicks per device, sort descending by count, and attach a
/// percentage-of-total column.
pub fn device_breakdown(record: &LinkRecord) -> Vec<DeviceCount> {
    let mut counts: BTreeMap<Device, u64> = BTreeMap::new();
    for event in &record.events {
        *counts.entry(event.device).or_insert(0) += 1;
    }

    let total = record.events.len() as u64;
    let mut rows: Vec<DeviceCount> = counts
        .into_iter()
        .map(|(device, count)| DeviceCount {
            device,
            count,
            percent: if total > 0 { count * 100 / total } else { 0 },
        })
        .collect();
    // Stable sort keeps the enum order for ties.
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// The newest `limit` clicks, newest first, numbered from the first click.
pub fn recent_activity(record: &LinkRecord, limit: usize) -> Vec<Activity> {
    record
        .events
        .iter()
        .enumerate()
        .rev()
        .take(limit)
        .map(|(idx, event)| Activity {
            click_number: idx + 1,
            event: event.clone(),
        })
        .collect()
}

/// Public short URL for `code` under `base_url`.
pub fn short_url(base_url: &str, code: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalyticsEvent;
    use chrono::{Duration, TimeZone};

    fn record_with(devices: &[Device]) -> LinkRecord {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        LinkRecord {
            id: "id".into(),
            original_url: "https://example.com".into(),
            code: "abc123".into(),
            custom_slug: None,
            created_at: created,
            click_count: devices.len() as u64,
            events: devices
                .iter()
                .enumerate()
                .map(|(i, &device)| AnalyticsEvent {
                    timestamp: created + Duration::minutes(i as i64),
                    device,
                    raw_signature: format!("ua-{i}"),
                })
                .collect(),
        }
    }

    #[test]
    fn summary_of_untouched_link_is_zero() {
        let record = record_with(&[]);
        let summary = summarize_at(&record, record.created_at + Duration::days(3));
        assert_eq!(
            summary,
            LinkSummary {
                total_clicks: 0,
                distinct_device_count: 0,
                avg_daily_clicks: 0,
            }
        );
    }

    #[test]
    fn first_day_counts_as_one_day() {
        let record = record_with(&[Device::Mobile, Device::Mobile, Device::Desktop]);
        let summary = summarize_at(&record, record.created_at + Duration::hours(1));
        assert_eq!(summary.total_clicks, 3);
        assert_eq!(summary.distinct_device_count, 2);
        assert_eq!(summary.avg_daily_clicks, 3);
    }

    #[test]
    fn partial_days_round_up_and_average_rounds_half_up() {
        // 3 clicks over 1 day + 1 minute => 2 started days => 1.5 => 2
        let record = record_with(&[Device::Tablet; 3]);
        let now = record.created_at + Duration::days(1) + Duration::minutes(1);
        assert_eq!(summarize_at(&record, now).avg_daily_clicks, 2);

        // 1 click over 3 days => 0.33 => 0
        let record = record_with(&[Device::Tablet]);
        let now = record.created_at + Duration::days(3);
        assert_eq!(summarize_at(&record, now).avg_daily_clicks, 0);
    }

    #[test]
    fn clock_before_creation_uses_one_day() {
        let record = record_with(&[Device::Desktop; 4]);
        let summary = summarize_at(&record, record.created_at - Duration::hours(5));
        assert_eq!(summary.avg_daily_clicks, 4);
    }

    #[test]
    fn breakdown_sorts_by_count() {
        let record = record_with(&[
            Device::Desktop,
            Device::Mobile,
            Device::Mobile,
            Device::Mobile,
        ]);
        let rows = device_breakdown(&record);
        assert_eq!(
            rows,
            vec![
                DeviceCount {
                    device: Device::Mobile,
                    count: 3,
                    percent: 75,
                },
                DeviceCount {
                    device: Device::Desktop,
                    count: 1,
                    percent: 25,
                },
            ]
        );
    }

    #[test]
    fn recent_activity_is_newest_first() {
        let record = record_with(&[Device::Desktop, Device::Mobile, Device::Tablet]);
        let recent = recent_activity(&record, 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].click_number, 3);
        assert_eq!(recent[0].event.device, Device::Tablet);
        assert_eq!(recent[1].click_number, 2);
        assert!(recent_activity(&record_with(&[]), 10).is_empty());
    }

    #[test]
    fn short_url_joins_without_double_slash() {
        assert_eq!(short_url("https://go.example.com/", "abc"), "https://go.example.com/abc");
        assert_eq!(short_url("http://localhost:3000", "promo"), "http://localhost:3000/promo");
    }
}

use chrono::{DateTime, Utc};

use crate::models::{AnalyticsEvent, Device, LinkRecord};

/// Map a User-Agent string to a device category.
///
/// iPad wins over the generic mobile markers, so an iPad UA that also says
/// "Mobile" is still a tablet.
pub fn classify(signature: &str) -> Device {
    if signature.contains("iPad") {
        Device::Tablet
    } else if ["Mobile", "Android", "iPhone"]
        .iter()
        .any(|marker| signature.contains(marker))
    {
        Device::Mobile
    } else {
        Device::Desktop
    }
}

/// Append one click to `record` and bump its counter.
///
/// Callers must hold exclusive access to the record for the duration of the
/// call; the store does this under its write lock so no reader can see the
/// counter and the event log disagree.
pub(crate) fn record_click(record: &mut LinkRecord, signature: Option<&str>, at: DateTime<Utc>) {
    let (device, raw_signature) = match signature {
        Some(ua) => (classify(ua), ua.to_owned()),
        None => (Device::Unknown, String::new()),
    };

    record.events.push(AnalyticsEvent {
        timestamp: at,
        device,
        raw_signature,
    });
    record.click_count += 1;

    debug_assert_eq!(record.click_count, record.events.len() as u64);
}

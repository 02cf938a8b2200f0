use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Korea Standard Time. Korea does not observe daylight saving, so a fixed offset is exact.
pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap_or_else(|| Utc.fix())
}

/// The order date format expected by the bank-matching agent: `YYYY-MM-DD HH:MM:SS` in KST, without an offset.
pub fn format_order_date(at: &DateTime<Utc>) -> String {
    at.with_timezone(&kst()).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// The event date as shown in notifications, e.g. `2025년 4월 6일 08:00`.
pub fn format_event_date(at: &DateTime<Utc>) -> String {
    at.with_timezone(&kst()).format("%Y년 %-m월 %-d일 %H:%M").to_string()
}

//! Civil-time formatting for feed timestamps and update stamps.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

pub const HMS_FORMAT: &str = "%H:%M:%S";
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Renders a POSIX timestamp (seconds) as `HH:MM:SS` in `tz`.
///
/// Values outside chrono's range fall back to the epoch.
pub fn timestamp_to_hms(timestamp: u64, tz: Tz) -> String {
    let utc = i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    tz.from_utc_datetime(&utc.naive_utc())
        .format(HMS_FORMAT)
        .to_string()
}

/// `DD/MM/YYYY HH:MM:SS` for `now` in `tz`.
pub fn format_update_time(now: DateTime<Utc>, tz: Tz) -> String {
    now.with_timezone(&tz).format(DATE_TIME_FORMAT).to_string()
}

/// Cache-bust token for a request issued at `now`: the local time of day.
pub fn cache_bust_token(now: DateTime<Utc>, tz: Tz) -> String {
    now.with_timezone(&tz).format(HMS_FORMAT).to_string()
}

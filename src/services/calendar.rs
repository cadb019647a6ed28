//! Conversion of arbitrary timestamps into the canonical market timezone.
//!
//! Provider payloads mix epoch seconds, offset-carrying strings and
//! timezone-naive strings. Everything funnels through here so the rest of the
//! pipeline only ever sees market-local times. Naive input is interpreted as
//! UTC before converting; aware input is converted directly, never
//! reinterpreted. Normalization is idempotent.

use crate::constants::MARKET_TZ;
use crate::error::{Error, Result};
use crate::models::MarketTime;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Current time in the market timezone
pub fn market_now() -> MarketTime {
    Utc::now().with_timezone(&MARKET_TZ)
}

/// Current date in the market timezone
pub fn market_today() -> NaiveDate {
    market_now().date_naive()
}

/// Convert any timezone-aware timestamp into market time. A no-op when the
/// input is already market-local.
pub fn to_market_time<T: TimeZone>(dt: DateTime<T>) -> MarketTime {
    dt.with_timezone(&MARKET_TZ)
}

/// Market-local midnight of the given date
pub fn market_day_start(date: NaiveDate) -> Result<MarketTime> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::InvalidTimestamp(format!("Invalid date {}", date)))?;
    MARKET_TZ.from_local_datetime(&midnight).single().ok_or_else(|| {
        Error::InvalidTimestamp(format!("Ambiguous market-local midnight for {}", date))
    })
}

/// Convert provider epoch seconds into market time
pub fn from_epoch_seconds(secs: i64) -> Result<MarketTime> {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(to_market_time)
        .ok_or_else(|| Error::InvalidTimestamp(format!("Epoch seconds {} out of range", secs)))
}

/// Parse a raw timestamp string into market time.
///
/// Accepted forms, tried in order: RFC 3339 (offset respected), naive
/// datetime (read as UTC), bare date (midnight UTC), integer epoch seconds.
pub fn parse_market_time(raw: &str) -> Result<MarketTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(to_market_time(dt));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(to_market_time(naive.and_utc()));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| Error::InvalidTimestamp(format!("Invalid date {}", raw)))?;
        return Ok(to_market_time(naive.and_utc()));
    }

    if let Ok(secs) = raw.parse::<i64>() {
        return from_epoch_seconds(secs);
    }

    Err(Error::InvalidTimestamp(format!(
        "Cannot parse timestamp '{}'",
        raw
    )))
}

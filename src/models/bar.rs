use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single price observation. Open and close are required; high/low/volume
/// travel along when the provider supplies them but the index core ignores them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    /// Timestamp of the bar (UTC as delivered by the provider)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub time: DateTime<Utc>,

    /// Opening price
    pub open: f64,

    /// Closing price
    pub close: f64,

    /// Highest price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,

    /// Lowest price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,

    /// Trading volume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

impl PriceBar {
    /// Create a new bar carrying only the fields the index core uses
    pub fn new(time: DateTime<Utc>, open: f64, close: f64) -> Self {
        Self {
            time,
            open,
            close,
            high: None,
            low: None,
            volume: None,
        }
    }
}

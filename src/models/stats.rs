use crate::models::{IndexConfig, IndexLevelSeries, IntradayPctSeries, MarketTime};
use serde::{Deserialize, Serialize};

/// Scalar summary of one snapshot run. Created once per run, immutable after
/// construction, handed to the serialization sink as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub key: String,

    /// Last intraday percent-vs-open, rounded to 2 decimals. 0.0 when no
    /// session was available inside the look-back window.
    pub pct_intraday: f64,

    /// Last index level, rounded to 2 decimals. Absent when no daily history
    /// produced a level.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_level: Option<f64>,

    /// Market-local computation time, "%Y/%m/%d %H:%M"
    pub updated_at: String,

    pub unit: String,

    /// Basket display codes in configured order
    pub tickers: Vec<String>,
}

impl SnapshotStats {
    /// Derive the summary from the two computed series.
    pub fn derive(
        config: &IndexConfig,
        levels: &IndexLevelSeries,
        intraday: &IntradayPctSeries,
        computed_at: MarketTime,
    ) -> Self {
        let pct = intraday.values().next_back().copied().unwrap_or(0.0);
        let level = levels.values().next_back().copied();

        Self {
            key: config.key.clone(),
            pct_intraday: round2(pct),
            last_level: level.map(round2),
            updated_at: computed_at.format("%Y/%m/%d %H:%M").to_string(),
            unit: "pct".to_string(),
            tickers: config.display_codes(),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MARKET_TZ;
    use chrono::{NaiveDate, TimeZone};
    use std::collections::BTreeMap;

    fn computed_at() -> MarketTime {
        MARKET_TZ.with_ymd_and_hms(2025, 1, 6, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_empty_series_default_to_zero_and_absent() {
        let config = IndexConfig::default();
        let stats = SnapshotStats::derive(
            &config,
            &IndexLevelSeries::new(),
            &IntradayPctSeries::new(),
            computed_at(),
        );

        assert_eq!(stats.pct_intraday, 0.0);
        assert_eq!(stats.last_level, None);
        assert_eq!(stats.updated_at, "2025/01/06 15:30");
        assert_eq!(stats.tickers, config.display_codes());

        // absent level must not serialize
        let json = serde_json::to_string(&stats).unwrap();
        assert!(!json.contains("last_level"));
    }

    #[test]
    fn test_last_values_rounded_to_two_decimals() {
        let config = IndexConfig::default();

        let mut levels = IndexLevelSeries::new();
        levels.insert(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(), 1000.0);
        levels.insert(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(), 1023.5551);

        let mut intraday = BTreeMap::new();
        intraday.insert(computed_at(), 0.42719);

        let stats = SnapshotStats::derive(&config, &levels, &intraday, computed_at());
        assert_eq!(stats.pct_intraday, 0.43);
        assert_eq!(stats.last_level, Some(1023.56));
        assert_eq!(stats.unit, "pct");
    }
}

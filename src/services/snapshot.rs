//! One-run orchestration: daily levels, then intraday, then summary stats.
//!
//! This is the only place that owns all three artifacts at once. It computes
//! everything before anything is handed to a sink, so a fatal error never
//! leaves partial output behind.

use crate::constants::{FIELD_ADJUSTED_CLOSE, FIELD_CLOSE};
use crate::error::Result;
use crate::models::{
    BasketMember, DailySeries, IndexConfig, IndexLevelSeries, IntradayPctSeries, PriceSeries,
    SnapshotStats,
};
use crate::services::feed::PriceFeed;
use crate::services::{calendar, extractor, intraday, levels};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{info, warn};

/// Everything one run produces, ready for the serialization sinks.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub levels: IndexLevelSeries,
    pub intraday: IntradayPctSeries,
    pub session_date: Option<NaiveDate>,
    pub stats: SnapshotStats,
}

/// Compute one full snapshot.
///
/// A total daily-fetch failure or a basket with zero usable daily series
/// aborts the run; per-ticker gaps are tolerated by the builders. The
/// intraday stage never aborts - its empty-after-fallback state flows into
/// the stats as 0.0.
pub async fn build_snapshot<F: PriceFeed>(
    feed: &F,
    config: &IndexConfig,
    target_date: NaiveDate,
) -> Result<Snapshot> {
    let base_date = config.parsed_base_date()?;
    let symbols = config.symbols();
    info!(
        key = %config.key,
        tickers = symbols.len(),
        base_date = %base_date,
        target_date = %target_date,
        "Building index snapshot"
    );

    let table = feed.fetch_daily(&symbols, base_date).await?;
    let per_symbol = extractor::extract_series(&table, &symbols, FIELD_ADJUSTED_CLOSE, FIELD_CLOSE)?;

    let daily = collapse_to_daily(&per_symbol, &config.tickers, base_date);
    let levels = levels::build_levels(&daily, config.base_level)?;

    let intraday = intraday::build_intraday(feed, &config.tickers, target_date).await;

    let stats = SnapshotStats::derive(config, &levels, &intraday.series, calendar::market_now());
    info!(
        pct_intraday = stats.pct_intraday,
        last_level = ?stats.last_level,
        session_date = ?intraday.session_date,
        "Snapshot computed"
    );

    Ok(Snapshot {
        levels,
        intraday: intraday.series,
        session_date: intraday.session_date,
        stats,
    })
}

/// Collapse per-symbol price series to one close per market-local date,
/// keyed by display code and restricted to dates on or after the base date.
fn collapse_to_daily(
    per_symbol: &HashMap<String, PriceSeries>,
    basket: &[BasketMember],
    base_date: NaiveDate,
) -> HashMap<String, DailySeries> {
    let mut daily = HashMap::new();
    for member in basket {
        let Some(series) = per_symbol.get(&member.symbol) else {
            warn!(ticker = %member.code, "No daily history - excluded from index level");
            continue;
        };

        let mut collapsed = DailySeries::new();
        for (time, price) in series {
            let date = time.date_naive();
            if date >= base_date {
                // later bars on the same date win
                collapsed.insert(date, *price);
            }
        }

        if collapsed.is_empty() {
            warn!(ticker = %member.code, base_date = %base_date, "No daily bars since base date - excluded from index level");
            continue;
        }
        daily.insert(member.code.clone(), collapsed);
    }
    daily
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MARKET_TZ;
    use crate::error::Error;
    use crate::models::{PriceBar, RawPriceTable};
    use chrono::{TimeZone, Utc};

    struct StubFeed {
        daily: HashMap<(String, String), PriceSeries>,
        intraday: HashMap<(String, NaiveDate), Vec<PriceBar>>,
        daily_fails: bool,
    }

    impl PriceFeed for StubFeed {
        async fn fetch_daily(
            &self,
            _symbols: &[String],
            _start_date: NaiveDate,
        ) -> Result<RawPriceTable> {
            if self.daily_fails {
                return Err(Error::Network("provider unreachable".to_string()));
            }
            Ok(RawPriceTable::Multi {
                columns: self.daily.clone(),
            })
        }

        async fn fetch_intraday(&self, symbol: &str, date: NaiveDate) -> Result<Vec<PriceBar>> {
            Ok(self
                .intraday
                .get(&(symbol.to_string(), date))
                .cloned()
                .unwrap_or_default())
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, d).unwrap()
    }

    fn daily_series(prices: &[(u32, f64)]) -> PriceSeries {
        prices
            .iter()
            .map(|(d, p)| {
                let t = MARKET_TZ
                    .with_ymd_and_hms(2024, 10, *d, 15, 0, 0)
                    .unwrap();
                (t, *p)
            })
            .collect()
    }

    fn two_member_config() -> IndexConfig {
        IndexConfig {
            key: "SKYTECH-3".to_string(),
            tickers: vec![
                BasketMember {
                    code: "A".to_string(),
                    symbol: "A.T".to_string(),
                },
                BasketMember {
                    code: "B".to_string(),
                    symbol: "B.T".to_string(),
                },
            ],
            base_date: "2024-10-01".to_string(),
            base_level: 1000.0,
        }
    }

    fn stub_with_levels() -> StubFeed {
        let mut daily = HashMap::new();
        daily.insert(
            ("A.T".to_string(), "adjclose".to_string()),
            daily_series(&[(1, 100.0), (2, 101.0), (3, 102.0)]),
        );
        daily.insert(
            ("B.T".to_string(), "adjclose".to_string()),
            daily_series(&[(1, 200.0), (2, 198.0), (3, 204.0)]),
        );
        StubFeed {
            daily,
            intraday: HashMap::new(),
            daily_fails: false,
        }
    }

    #[tokio::test]
    async fn test_full_snapshot_with_empty_intraday() {
        let feed = stub_with_levels();
        let snapshot = build_snapshot(&feed, &two_member_config(), day(4)).await.unwrap();

        assert_eq!(snapshot.levels.len(), 3);
        assert!((snapshot.levels[&day(1)] - 1000.0).abs() < 1e-6);
        assert!((snapshot.levels[&day(3)] - 1020.0).abs() < 1e-3);

        // no intraday session anywhere: valid empty state, pct defaults to 0.0
        assert!(snapshot.intraday.is_empty());
        assert_eq!(snapshot.session_date, None);
        assert_eq!(snapshot.stats.pct_intraday, 0.0);
        assert_eq!(snapshot.stats.last_level, Some(1020.0));
    }

    #[tokio::test]
    async fn test_intraday_feeds_stats() {
        let mut feed = stub_with_levels();
        let bars = vec![
            PriceBar::new(
                MARKET_TZ
                    .with_ymd_and_hms(2024, 10, 4, 9, 0, 0)
                    .unwrap()
                    .with_timezone(&Utc),
                100.0,
                100.0,
            ),
            PriceBar::new(
                MARKET_TZ
                    .with_ymd_and_hms(2024, 10, 4, 9, 5, 0)
                    .unwrap()
                    .with_timezone(&Utc),
                100.0,
                102.5,
            ),
        ];
        feed.intraday.insert(("A.T".to_string(), day(4)), bars);

        let snapshot = build_snapshot(&feed, &two_member_config(), day(4)).await.unwrap();
        assert_eq!(snapshot.session_date, Some(day(4)));
        assert_eq!(snapshot.stats.pct_intraday, 2.5);
    }

    #[tokio::test]
    async fn test_total_daily_failure_is_fatal() {
        let feed = StubFeed {
            daily: HashMap::new(),
            intraday: HashMap::new(),
            daily_fails: true,
        };
        let result = build_snapshot(&feed, &two_member_config(), day(4)).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }

    #[tokio::test]
    async fn test_zero_usable_tickers_is_fatal() {
        let feed = StubFeed {
            daily: HashMap::new(),
            intraday: HashMap::new(),
            daily_fails: false,
        };
        let result = build_snapshot(&feed, &two_member_config(), day(4)).await;
        assert!(matches!(result, Err(Error::NoUsableData(_))));
    }

    #[tokio::test]
    async fn test_bars_before_base_date_excluded() {
        let mut feed = stub_with_levels();
        // pre-base bar must not become the normalization anchor
        if let Some(series) = feed
            .daily
            .get_mut(&("A.T".to_string(), "adjclose".to_string()))
        {
            let early = MARKET_TZ.with_ymd_and_hms(2024, 9, 20, 15, 0, 0).unwrap();
            series.insert(early, 50.0);
        }

        let snapshot = build_snapshot(&feed, &two_member_config(), day(4)).await.unwrap();
        assert!((snapshot.levels[&day(1)] - 1000.0).abs() < 1e-6);
    }
}

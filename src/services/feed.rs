//! Price fetch collaborator: the trait the builders depend on, and the HTTP
//! chart-endpoint client used in production.

use crate::error::{Error, Result};
use crate::models::{PriceBar, PriceSeries, RawPriceTable};
use crate::services::calendar;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration as StdDuration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

const REQUEST_TIMEOUT_SECS: u64 = 15;
const USER_AGENT: &str = "Mozilla/5.0 (compatible; skytech/0.1)";

/// Boundary to the market-data provider. Both calls may fail per-invocation;
/// the builders decide how much failure the basket tolerates.
#[allow(async_fn_in_trait)]
pub trait PriceFeed {
    /// Daily bars for many tickers since `start_date`
    async fn fetch_daily(&self, symbols: &[String], start_date: NaiveDate) -> Result<RawPriceTable>;

    /// Intraday 5-minute bars for one ticker and one market-local day
    async fn fetch_intraday(&self, symbol: &str, date: NaiveDate) -> Result<Vec<PriceBar>>;
}

/// HTTP client for a Yahoo-style chart endpoint
pub struct ChartFeed {
    client: reqwest::Client,
    base_url: String,
}

impl ChartFeed {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_chart(
        &self,
        symbol: &str,
        interval: &str,
        period1: i64,
        period2: i64,
    ) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, symbol);
        debug!(symbol = symbol, interval = interval, "Requesting chart data");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("interval", interval.to_string()),
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<Value>().await?)
    }

    /// Pull timestamps and one quote array out of the chart payload
    fn chart_arrays<'a>(payload: &'a Value, symbol: &str) -> Result<(&'a Vec<Value>, &'a Value)> {
        let result = payload
            .pointer("/chart/result/0")
            .ok_or_else(|| Error::Parse(format!("No chart result for {}", symbol)))?;
        let timestamps = result
            .pointer("/timestamp")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Parse(format!("No timestamps for {}", symbol)))?;
        Ok((timestamps, result))
    }

    fn optional_f64_column<'a>(result: &'a Value, pointer: &str) -> Option<&'a Vec<Value>> {
        result.pointer(pointer).and_then(Value::as_array)
    }

    /// Daily close/adjclose series for one symbol, nulls skipped
    fn series_from_chart(payload: &Value, symbol: &str) -> Result<HashMap<String, PriceSeries>> {
        let (timestamps, result) = Self::chart_arrays(payload, symbol)?;

        let mut fields: HashMap<String, PriceSeries> = HashMap::new();
        let columns = [
            ("close", "/indicators/quote/0/close"),
            ("adjclose", "/indicators/adjclose/0/adjclose"),
        ];

        for (field, pointer) in columns {
            let Some(values) = Self::optional_f64_column(result, pointer) else {
                continue;
            };
            let mut series = PriceSeries::new();
            for (ts, value) in timestamps.iter().zip(values) {
                let (Some(secs), Some(price)) = (ts.as_i64(), value.as_f64()) else {
                    continue;
                };
                series.insert(calendar::from_epoch_seconds(secs)?, price);
            }
            if !series.is_empty() {
                fields.insert(field.to_string(), series);
            }
        }

        if fields.is_empty() {
            return Err(Error::Parse(format!("No price columns for {}", symbol)));
        }
        Ok(fields)
    }

    /// Intraday bars for one symbol, entries with a null open or close skipped
    fn bars_from_chart(payload: &Value, symbol: &str) -> Result<Vec<PriceBar>> {
        let (timestamps, result) = Self::chart_arrays(payload, symbol)?;

        let opens = Self::optional_f64_column(result, "/indicators/quote/0/open");
        let closes = Self::optional_f64_column(result, "/indicators/quote/0/close")
            .ok_or_else(|| Error::Parse(format!("No close column for {}", symbol)))?;
        let highs = Self::optional_f64_column(result, "/indicators/quote/0/high");
        let lows = Self::optional_f64_column(result, "/indicators/quote/0/low");
        let volumes = Self::optional_f64_column(result, "/indicators/quote/0/volume");

        let mut bars = Vec::new();
        for (i, ts) in timestamps.iter().enumerate() {
            let Some(secs) = ts.as_i64() else { continue };
            let Some(close) = closes.get(i).and_then(Value::as_f64) else {
                continue;
            };
            let open = opens
                .and_then(|col| col.get(i))
                .and_then(Value::as_f64)
                .unwrap_or(close);
            let time = DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| {
                Error::InvalidTimestamp(format!("Epoch seconds {} out of range", secs))
            })?;

            let mut bar = PriceBar::new(time, open, close);
            bar.high = highs.and_then(|col| col.get(i)).and_then(Value::as_f64);
            bar.low = lows.and_then(|col| col.get(i)).and_then(Value::as_f64);
            bar.volume = volumes
                .and_then(|col| col.get(i))
                .and_then(Value::as_u64);
            bars.push(bar);
        }
        Ok(bars)
    }
}

impl PriceFeed for ChartFeed {
    async fn fetch_daily(&self, symbols: &[String], start_date: NaiveDate) -> Result<RawPriceTable> {
        let period1 = calendar::market_day_start(start_date)?.timestamp();
        let period2 = Utc::now().timestamp();

        let mut columns: HashMap<(String, String), PriceSeries> = HashMap::new();
        for symbol in symbols {
            match self.fetch_chart(symbol, "1d", period1, period2).await {
                Ok(payload) => match Self::series_from_chart(&payload, symbol) {
                    Ok(fields) => {
                        for (field, series) in fields {
                            columns.insert((symbol.clone(), field), series);
                        }
                    }
                    Err(e) => {
                        warn!(symbol = %symbol, error = %e, "Malformed daily payload - symbol dropped");
                    }
                },
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Daily fetch failed - symbol dropped");
                }
            }
        }
        Ok(RawPriceTable::Multi { columns })
    }

    async fn fetch_intraday(&self, symbol: &str, date: NaiveDate) -> Result<Vec<PriceBar>> {
        let start = calendar::market_day_start(date)?;
        let end = start + chrono::Duration::days(1);
        let payload = self
            .fetch_chart(symbol, "5m", start.timestamp(), end.timestamp())
            .await?;
        Self::bars_from_chart(&payload, symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chart_payload(timestamps: Vec<i64>, closes: Vec<Value>, adjcloses: Vec<Value>) -> Value {
        json!({
            "chart": {
                "result": [{
                    "timestamp": timestamps,
                    "indicators": {
                        "quote": [{"close": closes, "open": [null, 101.0, 102.0]}],
                        "adjclose": [{"adjclose": adjcloses}]
                    }
                }]
            }
        })
    }

    #[test]
    fn test_series_from_chart_skips_nulls() {
        let payload = chart_payload(
            vec![1736121600, 1736208000, 1736294400],
            vec![json!(100.0), json!(null), json!(102.0)],
            vec![json!(99.0), json!(100.0), json!(null)],
        );

        let fields = ChartFeed::series_from_chart(&payload, "6232.T").unwrap();
        assert_eq!(fields["close"].len(), 2);
        assert_eq!(fields["adjclose"].len(), 2);
    }

    #[test]
    fn test_bars_from_chart_requires_close() {
        let payload = chart_payload(
            vec![1736121600, 1736121900, 1736122200],
            vec![json!(100.0), json!(null), json!(105.0)],
            vec![json!(null), json!(null), json!(null)],
        );

        let bars = ChartFeed::bars_from_chart(&payload, "6232.T").unwrap();
        assert_eq!(bars.len(), 2);
        // first bar has a null open: falls back to close
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[1].open, 102.0);
    }

    #[test]
    fn test_missing_result_is_parse_error() {
        let payload = json!({"chart": {"result": null, "error": {"code": "Not Found"}}});
        assert!(matches!(
            ChartFeed::series_from_chart(&payload, "NOPE.T"),
            Err(Error::Parse(_))
        ));
    }
}

mod bar;
mod config;
mod price_table;
mod stats;

pub use bar::PriceBar;
pub use config::{BasketMember, IndexConfig};
pub use price_table::RawPriceTable;
pub use stats::SnapshotStats;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use std::collections::BTreeMap;

/// A point in time expressed in the canonical market timezone.
pub type MarketTime = DateTime<Tz>;

/// Price observations for one ticker and one field, ordered and deduplicated
/// by timestamp.
pub type PriceSeries = BTreeMap<MarketTime, f64>;

/// One value per calendar date, ascending.
pub type DailySeries = BTreeMap<NaiveDate, f64>;

/// Equal-weighted index level per date, anchored at the configured base level.
pub type IndexLevelSeries = BTreeMap<NaiveDate, f64>;

/// Equal-weighted percent-change-vs-open per intraday timestamp.
pub type IntradayPctSeries = BTreeMap<MarketTime, f64>;

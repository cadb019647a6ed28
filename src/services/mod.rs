pub mod calendar;
pub mod extractor;
pub mod feed;
pub mod intraday;
pub mod levels;
pub mod series_ops;
pub mod snapshot;

pub use extractor::{detect_field_axis, extract_series, FieldAxis};
pub use feed::{ChartFeed, PriceFeed};
pub use intraday::{build_intraday, IntradaySnapshot};
pub use levels::build_levels;
pub use snapshot::{build_snapshot, Snapshot};

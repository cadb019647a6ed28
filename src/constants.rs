//! Index-wide constants: market calendar, provider field labels, artifact names.

use chrono_tz::Tz;

/// Canonical market timezone. JST carries a fixed +09:00 offset (no DST), so
/// converting into it is stable year-round.
pub const MARKET_TZ: Tz = chrono_tz::Asia::Tokyo;

/// How many days before the target date the intraday builder may fall back to
/// when the target session has no bars (weekend, holiday, pre-open run).
pub const INTRADAY_LOOKBACK_DAYS: i64 = 3;

/// Primary price field requested from the provider for daily levels.
pub const FIELD_ADJUSTED_CLOSE: &str = "adjclose";

/// Secondary field used when the provider response carries no adjusted close.
pub const FIELD_CLOSE: &str = "close";

/// Field labels a provider response may carry. Used to detect which half of a
/// paired column key holds the field name.
pub const KNOWN_FIELDS: [&str; 6] = ["open", "high", "low", "close", "adjclose", "volume"];

/// Default config file looked up when no --config is given.
pub const DEFAULT_CONFIG_PATH: &str = "skytech.json";

// Artifact file names (consumed by external rendering/posting jobs).
pub const LEVELS_CSV: &str = "skytech_3_levels.csv";
pub const INTRADAY_CSV: &str = "skytech_3_intraday.csv";
pub const STATS_JSON: &str = "skytech_3_stats.json";
pub const POST_TEXT: &str = "skytech_3_post_intraday.txt";
pub const HEARTBEAT: &str = "last_run.txt";

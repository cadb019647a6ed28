//! Same-day equal-weighted percent-change-vs-open series.

use crate::constants::INTRADAY_LOOKBACK_DAYS;
use crate::error::Error;
use crate::models::{BasketMember, IntradayPctSeries, PriceBar};
use crate::services::calendar;
use crate::services::feed::PriceFeed;
use crate::services::series_ops::average_across;
use chrono::{Duration, NaiveDate};
use tracing::{debug, info, warn};

/// Result of one intraday build: the combined series plus the session date it
/// came from. Both stay empty when no session was available inside the
/// look-back window - that is a valid state, not an error.
#[derive(Debug, Clone, Default)]
pub struct IntradaySnapshot {
    pub series: IntradayPctSeries,
    pub session_date: Option<NaiveDate>,
}

/// Per-ticker percent-change-vs-open for one session.
///
/// The day-open reference is the first observed close print of the session,
/// so the first value is exactly 0.0. Bars outside the session date (in
/// market time) are ignored; a session with no usable bars yields None.
pub fn pct_vs_open(bars: &[PriceBar], session: NaiveDate) -> Option<IntradayPctSeries> {
    let mut closes = IntradayPctSeries::new();
    for bar in bars {
        if !bar.close.is_finite() {
            continue;
        }
        let time = calendar::to_market_time(bar.time);
        if time.date_naive() == session {
            closes.insert(time, bar.close);
        }
    }

    let open_reference = *closes.values().next()?;
    if !(open_reference > 0.0) {
        warn!(session = %session, open_reference, "Non-positive day-open reference - ticker dropped");
        return None;
    }

    for value in closes.values_mut() {
        *value = (*value / open_reference - 1.0) * 100.0;
    }
    Some(closes)
}

/// Build the basket's intraday series for `target_date`, falling back one day
/// at a time (up to [`INTRADAY_LOOKBACK_DAYS`]) when the target session has
/// no bars for any ticker. The first day with a non-empty combined result
/// wins, so a pre-open or holiday run still yields the most recent session's
/// shape.
pub async fn build_intraday<F: PriceFeed>(
    feed: &F,
    basket: &[BasketMember],
    target_date: NaiveDate,
) -> IntradaySnapshot {
    for offset in 0..=INTRADAY_LOOKBACK_DAYS {
        let session = target_date - Duration::days(offset);
        let mut per_ticker = Vec::new();

        for member in basket {
            match feed.fetch_intraday(&member.symbol, session).await {
                Ok(bars) => match pct_vs_open(&bars, session) {
                    Some(pct) => per_ticker.push(pct),
                    None => {
                        debug!(ticker = %member.code, session = %session, "No intraday bars for session");
                    }
                },
                Err(e) => log_dropped_ticker(&member.code, session, &e),
            }
        }

        if !per_ticker.is_empty() {
            let combined = average_across(&per_ticker);
            if !combined.is_empty() {
                if offset > 0 {
                    info!(
                        target_date = %target_date,
                        session = %session,
                        "Target date had no intraday data - using fallback session"
                    );
                }
                return IntradaySnapshot {
                    series: combined,
                    session_date: Some(session),
                };
            }
        }
    }

    info!(
        target_date = %target_date,
        lookback_days = INTRADAY_LOOKBACK_DAYS,
        "No intraday session available in look-back window"
    );
    IntradaySnapshot::default()
}

fn log_dropped_ticker(code: &str, session: NaiveDate, error: &Error) {
    warn!(ticker = %code, session = %session, error = %error, "Intraday fetch failed - ticker dropped for this session");
}

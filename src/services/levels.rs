//! Long-horizon equal-weighted index levels from daily closes.

use crate::error::{Error, Result};
use crate::models::{DailySeries, IndexLevelSeries};
use crate::services::series_ops::{average_across, fill_forward_backward, normalize_to_first, union_keys};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Build the index level series since the base date.
///
/// Per ticker: reindex onto the union calendar, forward- then backward-fill,
/// divide by the ticker's own first value. Then average the normalized series
/// per date and scale by `base_level`. Empty input yields an empty series; a
/// single surviving ticker degenerates to its own normalized trajectory,
/// which is accepted behavior.
pub fn build_levels(
    daily: &HashMap<String, DailySeries>,
    base_level: f64,
) -> Result<IndexLevelSeries> {
    if !(base_level > 0.0) {
        return Err(Error::InvalidBaseValue(format!(
            "Base level must be positive, got {}",
            base_level
        )));
    }
    if daily.is_empty() {
        return Ok(IndexLevelSeries::new());
    }

    let calendar = union_keys(&daily.values().collect::<Vec<_>>());
    if calendar.is_empty() {
        return Ok(IndexLevelSeries::new());
    }

    // sorted for deterministic error attribution
    let mut codes: Vec<&String> = daily.keys().collect();
    codes.sort();

    let mut normalized = Vec::with_capacity(daily.len());
    for code in codes {
        let series = &daily[code];
        if series.is_empty() {
            warn!(ticker = %code, "No daily data - excluded from index level");
            continue;
        }
        let filled = fill_forward_backward(series, &calendar);
        let norm = normalize_to_first(&filled).map_err(|e| {
            Error::InvalidBaseValue(format!("Ticker {}: {}", code, e))
        })?;
        normalized.push(norm);
    }

    if normalized.is_empty() {
        return Ok(IndexLevelSeries::new());
    }
    debug!(
        tickers = normalized.len(),
        dates = calendar.len(),
        "Averaging normalized daily series"
    );

    let mut levels = average_across(&normalized);
    for value in levels.values_mut() {
        *value *= base_level;
    }
    Ok(levels)
}

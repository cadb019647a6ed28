//! Normalizes provider-shaped price tables into one series per ticker.
//!
//! Two shape ambiguities are handled here and nowhere else: single-ticker
//! responses are flat field-keyed tables while multi-ticker responses pair
//! ticker and field, and the pairing order of that key is provider-dependent.

use crate::constants::KNOWN_FIELDS;
use crate::error::{Error, Result};
use crate::models::{PriceSeries, RawPriceTable};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Which half of a paired column key holds the field name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAxis {
    First,
    Second,
}

fn is_known_field(label: &str) -> bool {
    KNOWN_FIELDS.iter().any(|f| f.eq_ignore_ascii_case(label))
}

/// Decide which pair element holds field names by membership against the
/// known field labels. Returns None when the keys give no usable signal
/// (empty table, or both halves look equally field-like).
pub fn detect_field_axis<'a, I>(keys: I) -> Option<FieldAxis>
where
    I: IntoIterator<Item = &'a (String, String)>,
{
    let mut first_hits = 0usize;
    let mut second_hits = 0usize;
    let mut total = 0usize;

    for (a, b) in keys {
        total += 1;
        if is_known_field(a) {
            first_hits += 1;
        }
        if is_known_field(b) {
            second_hits += 1;
        }
    }

    if total == 0 || first_hits == second_hits {
        return None;
    }
    Some(if first_hits > second_hits {
        FieldAxis::First
    } else {
        FieldAxis::Second
    })
}

/// Extract one price series per ticker for the requested field, falling back
/// to `fallback_field` when the primary is absent for this response.
///
/// Tickers missing from the response, or present with no values, are dropped
/// with a log line - downstream builders tolerate baskets smaller than
/// configured. Only a table where *zero* tickers yield a usable series is an
/// error.
pub fn extract_series(
    table: &RawPriceTable,
    symbols: &[String],
    field: &str,
    fallback_field: &str,
) -> Result<HashMap<String, PriceSeries>> {
    let mut out = HashMap::new();

    match table {
        RawPriceTable::Single { symbol, fields } => {
            let series = pick_field(fields, field, fallback_field);
            match series {
                Some(series) => {
                    out.insert(symbol.clone(), series.clone());
                }
                None => {
                    warn!(symbol = %symbol, field = field, "No usable field in single-ticker response");
                }
            }
        }
        RawPriceTable::Multi { columns } => {
            let axis = detect_field_axis(columns.keys()).ok_or_else(|| {
                Error::NoUsableData("Cannot locate field axis in provider response".to_string())
            })?;

            for symbol in symbols {
                let series = lookup(columns, axis, symbol, field)
                    .filter(|s| !s.is_empty())
                    .or_else(|| lookup(columns, axis, symbol, fallback_field).filter(|s| !s.is_empty()));

                match series {
                    Some(series) => {
                        out.insert(symbol.clone(), series.clone());
                    }
                    None => {
                        debug!(symbol = %symbol, "Ticker absent or empty in response - excluded");
                    }
                }
            }
        }
    }

    if out.is_empty() {
        return Err(Error::NoUsableData(format!(
            "No ticker yielded a usable '{}' series",
            field
        )));
    }
    Ok(out)
}

fn pick_field<'a>(
    fields: &'a HashMap<String, PriceSeries>,
    field: &str,
    fallback_field: &str,
) -> Option<&'a PriceSeries> {
    fields
        .get(field)
        .filter(|s| !s.is_empty())
        .or_else(|| fields.get(fallback_field).filter(|s| !s.is_empty()))
}

fn lookup<'a>(
    columns: &'a HashMap<(String, String), PriceSeries>,
    axis: FieldAxis,
    symbol: &str,
    field: &str,
) -> Option<&'a PriceSeries> {
    let key = match axis {
        FieldAxis::First => (field.to_string(), symbol.to_string()),
        FieldAxis::Second => (symbol.to_string(), field.to_string()),
    };
    columns.get(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FIELD_ADJUSTED_CLOSE, FIELD_CLOSE, MARKET_TZ};
    use chrono::TimeZone;

    fn series(prices: &[f64]) -> PriceSeries {
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let t = MARKET_TZ
                    .with_ymd_and_hms(2025, 1, 6 + i as u32, 15, 0, 0)
                    .unwrap();
                (t, *p)
            })
            .collect()
    }

    fn syms(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_detect_axis_both_orders() {
        let ticker_field = vec![
            ("6232.T".to_string(), "close".to_string()),
            ("218A.T".to_string(), "adjclose".to_string()),
        ];
        assert_eq!(detect_field_axis(ticker_field.iter()), Some(FieldAxis::Second));

        let field_ticker = vec![
            ("close".to_string(), "6232.T".to_string()),
            ("adjclose".to_string(), "218A.T".to_string()),
        ];
        assert_eq!(detect_field_axis(field_ticker.iter()), Some(FieldAxis::First));

        assert_eq!(detect_field_axis(std::iter::empty()), None);
    }

    #[test]
    fn test_single_shape_with_fallback() {
        let mut fields = HashMap::new();
        fields.insert(FIELD_CLOSE.to_string(), series(&[100.0, 101.0]));
        let table = RawPriceTable::Single {
            symbol: "6232.T".to_string(),
            fields,
        };

        // adjclose missing, falls back to close
        let out =
            extract_series(&table, &syms(&["6232.T"]), FIELD_ADJUSTED_CLOSE, FIELD_CLOSE).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out["6232.T"].len(), 2);
    }

    #[test]
    fn test_multi_shape_either_pair_order() {
        let mut ticker_first = HashMap::new();
        ticker_first.insert(
            ("6232.T".to_string(), "adjclose".to_string()),
            series(&[100.0]),
        );
        ticker_first.insert(
            ("218A.T".to_string(), "adjclose".to_string()),
            series(&[200.0]),
        );

        let mut field_first = HashMap::new();
        for ((sym, f), s) in &ticker_first {
            field_first.insert((f.clone(), sym.clone()), s.clone());
        }

        let symbols = syms(&["6232.T", "218A.T"]);
        for columns in [ticker_first, field_first] {
            let table = RawPriceTable::Multi { columns };
            let out =
                extract_series(&table, &symbols, FIELD_ADJUSTED_CLOSE, FIELD_CLOSE).unwrap();
            assert_eq!(out.len(), 2);
        }
    }

    #[test]
    fn test_missing_ticker_silently_excluded() {
        let mut columns = HashMap::new();
        columns.insert(
            ("6232.T".to_string(), "close".to_string()),
            series(&[100.0]),
        );
        // 218A.T present but with no values at all
        columns.insert(("218A.T".to_string(), "close".to_string()), PriceSeries::new());
        let table = RawPriceTable::Multi { columns };

        let out = extract_series(
            &table,
            &syms(&["6232.T", "218A.T", "278A.T"]),
            FIELD_ADJUSTED_CLOSE,
            FIELD_CLOSE,
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert!(out.contains_key("6232.T"));
    }

    #[test]
    fn test_zero_usable_tickers_is_error() {
        let table = RawPriceTable::Multi {
            columns: HashMap::new(),
        };
        let result = extract_series(
            &table,
            &syms(&["6232.T"]),
            FIELD_ADJUSTED_CLOSE,
            FIELD_CLOSE,
        );
        assert!(matches!(result, Err(Error::NoUsableData(_))));
    }
}

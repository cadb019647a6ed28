//! Pure series stages shared by the level and intraday builders.
//!
//! Each stage is one map in, one map out, so the floating-point pipeline can
//! be tested stage by stage instead of only end-to-end.

use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Union of all keys across the given series
pub fn union_keys<K: Ord + Clone>(series_list: &[&BTreeMap<K, f64>]) -> BTreeSet<K> {
    let mut keys = BTreeSet::new();
    for series in series_list {
        keys.extend(series.keys().cloned());
    }
    keys
}

/// Reindex a series onto `index`, forward-filling interior and trailing gaps,
/// then backward-filling the leading gap with the first observed value.
///
/// Backward-filling fabricates flat history for keys before a ticker's first
/// real observation. That matches the source system's policy of treating
/// missing history as flat; it is deliberate, documented behavior.
pub fn fill_forward_backward<K: Ord + Clone>(
    series: &BTreeMap<K, f64>,
    index: &BTreeSet<K>,
) -> BTreeMap<K, f64> {
    if series.is_empty() {
        return BTreeMap::new();
    }

    let mut filled = BTreeMap::new();
    let mut carried: Option<f64> = None;
    let mut leading: Vec<K> = Vec::new();

    for key in index {
        if let Some(v) = series.get(key) {
            carried = Some(*v);
        }
        match carried {
            Some(v) => {
                filled.insert(key.clone(), v);
            }
            None => leading.push(key.clone()),
        }
    }

    if let Some(first) = series.values().next().copied() {
        for key in leading {
            filled.insert(key, first);
        }
    }

    filled
}

/// Divide every value by the series' own first value, so the series starts
/// at exactly 1.0. A non-positive (or NaN) first value would turn the whole
/// downstream average into an artifact, so it is rejected instead.
pub fn normalize_to_first<K: Ord + Clone>(series: &BTreeMap<K, f64>) -> Result<BTreeMap<K, f64>> {
    let first = match series.values().next() {
        Some(v) => *v,
        None => return Ok(BTreeMap::new()),
    };
    if !(first > 0.0) {
        return Err(Error::InvalidBaseValue(format!(
            "First series value {} is not positive",
            first
        )));
    }
    Ok(series.iter().map(|(k, v)| (k.clone(), v / first)).collect())
}

/// Outer-join average: at each key, average the values of the series that
/// have one. A series missing a key does not null out the others, and the
/// result is independent of input order.
pub fn average_across<K: Ord + Clone>(series_list: &[BTreeMap<K, f64>]) -> BTreeMap<K, f64> {
    let mut acc: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for series in series_list {
        for (key, value) in series {
            let entry = acc.entry(key.clone()).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }
    acc.into_iter()
        .map(|(key, (sum, n))| (key, sum / n as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(i32, f64)]) -> BTreeMap<i32, f64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_fill_interior_and_edge_gaps() {
        let series = map(&[(2, 10.0), (4, 12.0)]);
        let index: BTreeSet<i32> = [1, 2, 3, 4, 5].into_iter().collect();

        let filled = fill_forward_backward(&series, &index);
        assert_eq!(filled, map(&[(1, 10.0), (2, 10.0), (3, 10.0), (4, 12.0), (5, 12.0)]));
    }

    #[test]
    fn test_fill_empty_series_stays_empty() {
        let index: BTreeSet<i32> = [1, 2].into_iter().collect();
        assert!(fill_forward_backward(&BTreeMap::new(), &index).is_empty());
    }

    #[test]
    fn test_normalize_starts_at_one() {
        let normalized = normalize_to_first(&map(&[(1, 100.0), (2, 101.0), (3, 102.0)])).unwrap();
        assert_eq!(normalized[&1], 1.0);
        assert!((normalized[&2] - 1.01).abs() < 1e-12);
        assert!((normalized[&3] - 1.02).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_rejects_non_positive_first() {
        for first in [0.0, -5.0, f64::NAN] {
            let result = normalize_to_first(&map(&[(1, first), (2, 1.0)]));
            assert!(matches!(result, Err(Error::InvalidBaseValue(_))));
        }
    }

    #[test]
    fn test_average_outer_join_skips_missing() {
        let a = map(&[(1, 1.0), (2, 2.0)]);
        let b = map(&[(2, 4.0), (3, 6.0)]);

        let avg = average_across(&[a.clone(), b.clone()]);
        assert_eq!(avg, map(&[(1, 1.0), (2, 3.0), (3, 6.0)]));

        // order independence
        assert_eq!(avg, average_across(&[b, a]));
    }
}

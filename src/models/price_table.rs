use crate::models::PriceSeries;
use std::collections::HashMap;

/// Raw provider response for one or many tickers.
///
/// Providers shape their responses differently depending on how many tickers
/// were requested: a single ticker arrives as a flat field-keyed table, while
/// multiple tickers arrive keyed by (ticker, field) pairs - and the order of
/// that pair is not guaranteed consistent call-to-call. The extractor detects
/// the shape and the pair order; nothing downstream ever sees this type.
#[derive(Debug, Clone)]
pub enum RawPriceTable {
    /// Flat single-ticker response: field name -> series
    Single {
        symbol: String,
        fields: HashMap<String, PriceSeries>,
    },
    /// Multi-ticker response: paired keys whose ticker/field order is
    /// provider-dependent
    Multi {
        columns: HashMap<(String, String), PriceSeries>,
    },
}

impl RawPriceTable {
    pub fn is_empty(&self) -> bool {
        match self {
            RawPriceTable::Single { fields, .. } => fields.is_empty(),
            RawPriceTable::Multi { columns } => columns.is_empty(),
        }
    }
}

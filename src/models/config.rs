use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// One basket member: the human-facing display code and the provider symbol
/// used when fetching prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasketMember {
    pub code: String,
    pub symbol: String,
}

/// Index definition, read once at the start of a run.
///
/// Basket membership, base date and base level are fixed external
/// configuration - nothing in the core computes or mutates them. Ticker order
/// matters for display (post text, stats JSON), not for the math.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    pub key: String,
    pub tickers: Vec<BasketMember>,
    pub base_date: String,
    pub base_level: f64,
}

impl Default for IndexConfig {
    /// Built-in SKYTECH-3 basket, used when no config file is present.
    fn default() -> Self {
        Self {
            key: "SKYTECH-3".to_string(),
            tickers: vec![
                BasketMember {
                    code: "6232".to_string(),
                    symbol: "6232.T".to_string(),
                },
                BasketMember {
                    code: "218A".to_string(),
                    symbol: "218A.T".to_string(),
                },
                BasketMember {
                    code: "278A".to_string(),
                    symbol: "278A.T".to_string(),
                },
            ],
            base_date: "2024-10-01".to_string(),
            base_level: 1000.0,
        }
    }
}

impl IndexConfig {
    /// Load and validate an index definition from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid index config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the rest of the pipeline relies on
    pub fn validate(&self) -> Result<()> {
        if self.tickers.is_empty() {
            return Err(Error::Config("Basket has no tickers".to_string()));
        }

        let mut codes = HashSet::new();
        let mut symbols = HashSet::new();
        for member in &self.tickers {
            if member.code.trim().is_empty() || member.symbol.trim().is_empty() {
                return Err(Error::Config(format!(
                    "Basket member has empty code or symbol: {:?}",
                    member
                )));
            }
            if !codes.insert(member.code.as_str()) {
                return Err(Error::Config(format!(
                    "Duplicate display code in basket: {}",
                    member.code
                )));
            }
            if !symbols.insert(member.symbol.as_str()) {
                return Err(Error::Config(format!(
                    "Duplicate provider symbol in basket: {}",
                    member.symbol
                )));
            }
        }

        if !(self.base_level > 0.0) {
            return Err(Error::InvalidBaseValue(format!(
                "Base level must be positive, got {}",
                self.base_level
            )));
        }

        self.parsed_base_date()?;
        Ok(())
    }

    pub fn parsed_base_date(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.base_date, "%Y-%m-%d").map_err(|e| {
            Error::Config(format!("Invalid base_date '{}': {}", self.base_date, e))
        })
    }

    /// Provider symbols in basket order
    pub fn symbols(&self) -> Vec<String> {
        self.tickers.iter().map(|m| m.symbol.clone()).collect()
    }

    /// Display codes in basket order
    pub fn display_codes(&self) -> Vec<String> {
        self.tickers.iter().map(|m| m.code.clone()).collect()
    }
}

//! Static symbol → sector classification.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Symbol;

/// Label for the benchmark and every unclassified symbol. Exempt from sector caps.
pub const INDEX_BUCKET: &str = "MARKET_INDEX";

/// Maps symbols to sector labels; unknown symbols fall into [`INDEX_BUCKET`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectorMap {
    sectors: BTreeMap<Symbol, String>,
}

impl SectorMap {
    /// Creates an empty map (every symbol unclassified).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sectors: BTreeMap::new(),
        }
    }

    /// Assigns `symbol` to `sector`.
    pub fn insert(&mut self, symbol: impl Into<Symbol>, sector: impl Into<String>) {
        self.sectors.insert(symbol.into(), sector.into());
    }

    /// Sector label of `symbol`, or [`INDEX_BUCKET`] when unknown.
    #[must_use]
    pub fn sector_of(&self, symbol: &str) -> &str {
        self.sectors.get(symbol).map_or(INDEX_BUCKET, String::as_str)
    }

    /// Whether `symbol` has an explicit classification outside the index bucket.
    #[must_use]
    pub fn is_classified(&self, symbol: &str) -> bool {
        self.sector_of(symbol) != INDEX_BUCKET
    }

    /// Number of classified symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    /// Whether nothing is classified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

impl<S: Into<Symbol>, T: Into<String>> FromIterator<(S, T)> for SectorMap {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        Self {
            sectors: iter
                .into_iter()
                .map(|(s, t)| (s.into(), t.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_symbol_falls_in_index_bucket() {
        let map: SectorMap = [("TCS.NS", "IT"), ("HDFCBANK.NS", "BANK")]
            .into_iter()
            .collect();
        assert_eq!(map.sector_of("TCS.NS"), "IT");
        assert_eq!(map.sector_of("^NSEI"), INDEX_BUCKET);
        assert!(map.is_classified("HDFCBANK.NS"));
        assert!(!map.is_classified("UNKNOWN.NS"));
    }

    #[test]
    fn test_insert_overrides() {
        let mut map = SectorMap::new();
        assert!(map.is_empty());
        map.insert("INFY.NS", "IT");
        map.insert("INFY.NS", "TECH");
        assert_eq!(map.len(), 1);
        assert_eq!(map.sector_of("INFY.NS"), "TECH");
    }
}

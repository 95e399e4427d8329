//! Date-aligned close matrices and their periodic returns.

use augur_traits::{Date, PricePanel, Symbol};
use nalgebra::DMatrix;
use tracing::warn;

/// Closes for several symbols on a shared calendar.
///
/// Rows are dates (ascending), columns follow [`Self::symbols`].
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPrices {
    symbols: Vec<Symbol>,
    dates: Vec<Date>,
    closes: DMatrix<f64>,
}

impl AlignedPrices {
    /// Aligns `symbols` over the last `lookback` calendar dates on or before `as_of`.
    ///
    /// Each column is forward-filled; rows before every column has started are
    /// dropped. Symbols absent from the panel or without an observation inside
    /// the window are dropped with a warning.
    #[must_use]
    pub fn build(panel: &PricePanel, symbols: &[Symbol], as_of: Date, lookback: usize) -> Self {
        let mut kept = Vec::new();
        for symbol in symbols {
            match panel.get(symbol) {
                Some(series) if series.observations_until(as_of) > 0 => kept.push(series),
                Some(_) => warn!(%symbol, %as_of, "no prices on or before date, dropping"),
                None => warn!(%symbol, "symbol not in price panel, dropping"),
            }
        }

        let mut calendar: Vec<Date> = kept
            .iter()
            .flat_map(|s| s.dates()[..s.observations_until(as_of)].iter().copied())
            .collect();
        calendar.sort_unstable();
        calendar.dedup();
        let start = calendar.len().saturating_sub(lookback);
        let calendar = &calendar[start..];

        let from = calendar.first().copied();
        kept.retain(|series| {
            let has = from
                .is_some_and(|from| series.dates().iter().any(|d| *d >= from && *d <= as_of));
            if !has {
                warn!(symbol = series.symbol(), "no prices inside the window, dropping");
            }
            has
        });

        let rows: Vec<(Date, Vec<f64>)> = calendar
            .iter()
            .filter_map(|date| {
                kept.iter()
                    .map(|s| s.close_as_of(*date))
                    .collect::<Option<Vec<f64>>>()
                    .map(|row| (*date, row))
            })
            .collect();

        let n_cols = kept.len();
        let dates: Vec<Date> = rows.iter().map(|(d, _)| *d).collect();
        let closes = DMatrix::from_row_iterator(
            rows.len(),
            n_cols,
            rows.into_iter().flat_map(|(_, row)| row),
        );
        Self {
            symbols: kept.iter().map(|s| s.symbol().to_string()).collect(),
            dates,
            closes,
        }
    }

    /// Column symbols.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Row dates.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Close matrix, dates by symbols.
    #[must_use]
    pub const fn closes(&self) -> &DMatrix<f64> {
        &self.closes
    }

    /// Number of aligned rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether no row survived alignment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Column index of `symbol`.
    #[must_use]
    pub fn position(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// Simple returns, one row fewer than the closes.
    #[must_use]
    pub fn returns(&self) -> DMatrix<f64> {
        let (rows, cols) = self.closes.shape();
        if rows < 2 {
            return DMatrix::zeros(0, cols);
        }
        DMatrix::from_fn(rows - 1, cols, |r, c| {
            self.closes[(r + 1, c)] / self.closes[(r, c)] - 1.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use augur_traits::PriceSeries;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn panel() -> PricePanel {
        PricePanel::new(
            "^NSEI",
            vec![
                PriceSeries::new("^NSEI", vec![d(1), d(2), d(3), d(4)], vec![100.0, 101.0, 102.0, 103.0])
                    .unwrap(),
                // gap on the 3rd is forward-filled
                PriceSeries::new("A", vec![d(1), d(2), d(4)], vec![10.0, 11.0, 12.0]).unwrap(),
                // starts late: rows before the 2nd are dropped
                PriceSeries::new("B", vec![d(2), d(3), d(4)], vec![20.0, 21.0, 22.0]).unwrap(),
            ],
        )
        .unwrap()
    }

    fn symbols(names: &[&str]) -> Vec<Symbol> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_forward_fill_and_leading_gap() {
        let aligned = AlignedPrices::build(&panel(), &symbols(&["^NSEI", "A", "B"]), d(4), 252);
        assert_eq!(aligned.dates(), &[d(2), d(3), d(4)]);
        let a = aligned.position("A").unwrap();
        assert_relative_eq!(aligned.closes()[(1, a)], 11.0);
    }

    #[test]
    fn test_lookback_and_as_of() {
        let aligned = AlignedPrices::build(&panel(), &symbols(&["^NSEI", "A"]), d(3), 2);
        assert_eq!(aligned.dates(), &[d(2), d(3)]);
    }

    #[test]
    fn test_unknown_symbol_dropped() {
        let aligned = AlignedPrices::build(&panel(), &symbols(&["^NSEI", "ZZZ"]), d(4), 252);
        assert_eq!(aligned.symbols(), &["^NSEI".to_string()]);
    }

    #[test]
    fn test_single_symbol_uses_its_own_dates() {
        let aligned = AlignedPrices::build(&panel(), &symbols(&["A"]), d(4), 252);
        assert_eq!(aligned.dates(), &[d(1), d(2), d(4)]);
        assert_eq!(aligned.returns().nrows(), 2);
    }

    #[test]
    fn test_returns() {
        let aligned = AlignedPrices::build(&panel(), &symbols(&["^NSEI", "A"]), d(4), 252);
        let returns = aligned.returns();
        assert_eq!(returns.shape(), (3, 2));
        assert_relative_eq!(returns[(0, 0)], 0.01, epsilon = 1e-12);
        assert_relative_eq!(returns[(0, 1)], 0.1, epsilon = 1e-12);
        // forward-filled row on the 3rd
        assert_relative_eq!(returns[(1, 1)], 0.0);
        assert_relative_eq!(returns[(2, 1)], 12.0 / 11.0 - 1.0, epsilon = 1e-12);
    }
}

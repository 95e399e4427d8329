//! In-memory paper portfolio.

use std::collections::BTreeMap;

use augur_traits::{AugurError, Result, Symbol};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::friction::TradeSide;

/// One open position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Shares held.
    pub quantity: f64,
    /// Volume-weighted purchase price.
    pub average_price: f64,
}

/// An executed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Sequence number within the ledger.
    pub sequence: usize,
    /// Asset symbol.
    pub symbol: Symbol,
    /// Direction.
    pub side: TradeSide,
    /// Execution price.
    pub price: f64,
    /// Quantity.
    pub quantity: f64,
    /// Charges paid.
    pub cost: f64,
}

/// Cash, holdings and the trade log of a simulated account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowLedger {
    cash: f64,
    holdings: BTreeMap<Symbol, Holding>,
    equity_value: f64,
    trades: Vec<TradeRecord>,
}

impl ShadowLedger {
    /// Start with `capital` in cash.
    #[must_use]
    pub const fn new(capital: f64) -> Self {
        Self {
            cash: capital,
            holdings: BTreeMap::new(),
            equity_value: 0.0,
            trades: Vec::new(),
        }
    }

    /// Available cash.
    #[must_use]
    pub const fn cash(&self) -> f64 {
        self.cash
    }

    /// Open positions.
    #[must_use]
    pub const fn holdings(&self) -> &BTreeMap<Symbol, Holding> {
        &self.holdings
    }

    /// Holdings value at the last mark.
    #[must_use]
    pub const fn equity_value(&self) -> f64 {
        self.equity_value
    }

    /// Cash plus marked holdings.
    #[must_use]
    pub fn total_value(&self) -> f64 {
        self.cash + self.equity_value
    }

    /// Executed trades, oldest first.
    #[must_use]
    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    /// Apply a trade.
    ///
    /// Buys debit notional plus `cost`; sells credit notional minus `cost`
    /// and close the position once the quantity is exhausted.
    ///
    /// # Errors
    ///
    /// - [`AugurError::InvalidData`] for a non-positive price or quantity, or a negative cost
    /// - [`AugurError::InsufficientFunds`] when a buy exceeds available cash
    /// - [`AugurError::SymbolNotFound`] when selling something not held
    pub fn execute(
        &mut self,
        side: TradeSide,
        symbol: &str,
        price: f64,
        quantity: f64,
        cost: f64,
    ) -> Result<()> {
        if !(price > 0.0 && quantity > 0.0 && cost >= 0.0) {
            return Err(AugurError::InvalidData(format!(
                "invalid trade {side} {symbol}: price {price}, quantity {quantity}, cost {cost}"
            )));
        }
        let notional = price * quantity;
        match side {
            TradeSide::Buy => {
                let required = notional + cost;
                if self.cash < required {
                    return Err(AugurError::InsufficientFunds {
                        required,
                        available: self.cash,
                    });
                }
                self.cash -= required;
                self.holdings
                    .entry(symbol.to_string())
                    .and_modify(|h| {
                        let quantity_after = h.quantity + quantity;
                        h.average_price =
                            (h.quantity * h.average_price + notional) / quantity_after;
                        h.quantity = quantity_after;
                    })
                    .or_insert(Holding {
                        quantity,
                        average_price: price,
                    });
            }
            TradeSide::Sell => {
                let holding = self
                    .holdings
                    .get_mut(symbol)
                    .ok_or_else(|| AugurError::SymbolNotFound(symbol.to_string()))?;
                self.cash += notional - cost;
                holding.quantity -= quantity;
                if holding.quantity <= 0.0 {
                    self.holdings.remove(symbol);
                }
            }
        }
        self.trades.push(TradeRecord {
            sequence: self.trades.len(),
            symbol: symbol.to_string(),
            side,
            price,
            quantity,
            cost,
        });
        info!(%side, symbol, price, quantity, cost, cash = self.cash, "trade executed");
        Ok(())
    }

    /// Revalue holdings; symbols without a price use their average price.
    pub fn mark_to_market(&mut self, prices: &BTreeMap<Symbol, f64>) -> f64 {
        self.equity_value = self
            .holdings
            .iter()
            .map(|(symbol, h)| h.quantity * prices.get(symbol).copied().unwrap_or(h.average_price))
            .sum();
        self.total_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_buy_updates_average_price() {
        let mut ledger = ShadowLedger::new(10_000.0);
        ledger.execute(TradeSide::Buy, "TCS", 100.0, 10.0, 1.0).unwrap();
        ledger.execute(TradeSide::Buy, "TCS", 130.0, 20.0, 2.0).unwrap();
        let h = ledger.holdings()["TCS"];
        assert_relative_eq!(h.quantity, 30.0);
        assert_relative_eq!(h.average_price, 120.0);
        assert_relative_eq!(ledger.cash(), 10_000.0 - 1001.0 - 2602.0);
        assert_eq!(ledger.trades().len(), 2);
    }

    #[test]
    fn test_insufficient_funds() {
        let mut ledger = ShadowLedger::new(1000.0);
        let err = ledger.execute(TradeSide::Buy, "TCS", 100.0, 10.0, 0.5).unwrap_err();
        assert!(matches!(err, AugurError::InsufficientFunds { .. }));
        assert_relative_eq!(ledger.cash(), 1000.0);
        assert!(ledger.trades().is_empty());
    }

    #[test]
    fn test_sell_closes_position() {
        let mut ledger = ShadowLedger::new(2000.0);
        ledger.execute(TradeSide::Buy, "INFY", 100.0, 10.0, 0.0).unwrap();
        ledger.execute(TradeSide::Sell, "INFY", 110.0, 4.0, 1.0).unwrap();
        assert_relative_eq!(ledger.holdings()["INFY"].quantity, 6.0);
        ledger.execute(TradeSide::Sell, "INFY", 110.0, 6.0, 1.0).unwrap();
        assert!(ledger.holdings().is_empty());
        assert_relative_eq!(ledger.cash(), 1000.0 + 439.0 + 659.0);
    }

    #[test]
    fn test_sell_unknown_symbol() {
        let mut ledger = ShadowLedger::new(100.0);
        assert!(matches!(
            ledger.execute(TradeSide::Sell, "XYZ", 10.0, 1.0, 0.0),
            Err(AugurError::SymbolNotFound(_))
        ));
    }

    #[test]
    fn test_mark_to_market_falls_back_to_average_price() {
        let mut ledger = ShadowLedger::new(5000.0);
        ledger.execute(TradeSide::Buy, "A", 100.0, 10.0, 0.0).unwrap();
        ledger.execute(TradeSide::Buy, "B", 50.0, 10.0, 0.0).unwrap();
        let prices = BTreeMap::from([("A".to_string(), 120.0)]);
        let total = ledger.mark_to_market(&prices);
        assert_relative_eq!(ledger.equity_value(), 1200.0 + 500.0);
        assert_relative_eq!(total, 3500.0 + 1700.0);
    }
}

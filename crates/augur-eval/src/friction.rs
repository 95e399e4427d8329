//! Transaction friction for Indian equity delivery trades.
//!
//! Statutory charges are levied on the quoted notional; slippage moves the
//! execution price against the trader.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use augur_traits::{AugurError, Result, Symbol};
use serde::{Deserialize, Serialize};

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    /// Purchase.
    Buy,
    /// Sale.
    Sell,
}

impl TradeSide {
    /// Upper-case label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeSide {
    type Err = AugurError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            _ => Err(AugurError::InvalidTradeSide(s.to_string())),
        }
    }
}

/// Fee rates as fractions of notional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    /// Securities transaction tax on both sides (default: 0.1%)
    pub transaction_tax: f64,
    /// Exchange turnover fee (default: 0.00325%)
    pub exchange_fee: f64,
    /// Regulator fee (default: 0.0001%)
    pub regulatory_fee: f64,
    /// Tax on exchange fee plus brokerage (default: 18%)
    pub fee_tax: f64,
    /// Brokerage (default: 0)
    pub brokerage: f64,
    /// Stamp duty, buys only (default: 0.015%)
    pub stamp_duty: f64,
    /// Price slippage per side (default: 0.1%)
    pub slippage: f64,
}

impl FeeSchedule {
    /// NSE equity delivery with a discount broker.
    #[must_use]
    pub const fn nse_delivery() -> Self {
        Self {
            transaction_tax: 0.001,
            exchange_fee: 0.000_032_5,
            regulatory_fee: 0.000_001,
            fee_tax: 0.18,
            brokerage: 0.0,
            stamp_duty: 0.000_15,
            slippage: 0.001,
        }
    }

    /// Reject schedules that would let execution match or beat the quote.
    ///
    /// # Errors
    ///
    /// [`AugurError::InvalidData`] for a non-positive slippage or a negative
    /// rate.
    pub fn validate(&self) -> Result<()> {
        if !(self.slippage.is_finite() && self.slippage > 0.0 && self.slippage < 1.0) {
            return Err(AugurError::InvalidData(format!(
                "slippage must be in (0, 1), got {}",
                self.slippage
            )));
        }
        let rates = [
            ("transaction_tax", self.transaction_tax),
            ("exchange_fee", self.exchange_fee),
            ("regulatory_fee", self.regulatory_fee),
            ("fee_tax", self.fee_tax),
            ("brokerage", self.brokerage),
            ("stamp_duty", self.stamp_duty),
        ];
        if let Some((name, rate)) = rates.iter().find(|(_, r)| !(r.is_finite() && *r >= 0.0)) {
            return Err(AugurError::InvalidData(format!("{name} must be non-negative, got {rate}")));
        }
        Ok(())
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::nse_delivery()
    }
}

/// Charges of one trade by component, in currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// Securities transaction tax.
    pub transaction_tax: f64,
    /// Exchange fee.
    pub exchange_fee: f64,
    /// Regulator fee.
    pub regulatory_fee: f64,
    /// Tax on fees.
    pub fee_tax: f64,
    /// Brokerage.
    pub brokerage: f64,
    /// Stamp duty.
    pub stamp_duty: f64,
}

impl FeeBreakdown {
    /// Sum of all components.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.transaction_tax
            + self.exchange_fee
            + self.regulatory_fee
            + self.fee_tax
            + self.brokerage
            + self.stamp_duty
    }
}

/// Priced trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeCost {
    /// Direction.
    pub side: TradeSide,
    /// Quoted price.
    pub quote: f64,
    /// Quantity traded.
    pub quantity: f64,
    /// Price after slippage.
    pub execution_price: f64,
    /// Charges by component.
    pub breakdown: FeeBreakdown,
    /// Sum of charges, excluding slippage.
    pub total_tax: f64,
}

impl TradeCost {
    /// Quoted notional.
    #[must_use]
    pub fn notional(&self) -> f64 {
        self.quote * self.quantity
    }

    /// Currency lost to slippage.
    #[must_use]
    pub fn slippage_cost(&self) -> f64 {
        (self.execution_price - self.quote).abs() * self.quantity
    }

    /// Charges plus slippage.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.total_tax + self.slippage_cost()
    }
}

/// Round-trip charges for one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionFriction {
    /// Asset symbol.
    pub symbol: Symbol,
    /// Portfolio weight.
    pub weight: f64,
    /// Position value.
    pub notional: f64,
    /// Buy plus sell charges.
    pub round_trip: f64,
    /// Gain needed to cover the charges, in percent.
    pub breakeven_pct: f64,
}

/// Round-trip friction of a whole allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrictionReport {
    /// Capital allocated.
    pub capital: f64,
    /// Per-position rows in symbol order.
    pub positions: Vec<PositionFriction>,
    /// Sum of round-trip charges.
    pub total: f64,
    /// Total as a percentage of capital.
    pub total_pct: f64,
}

/// Prices trades under a [`FeeSchedule`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FrictionModel {
    schedule: FeeSchedule,
}

impl FrictionModel {
    /// Weights at or below this are left out of [`Self::friction_report`].
    pub const MIN_REPORTED_WEIGHT: f64 = 0.001;

    /// Create a model with the given schedule.
    #[must_use]
    pub const fn new(schedule: FeeSchedule) -> Self {
        Self { schedule }
    }

    /// The fee schedule.
    #[must_use]
    pub const fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    fn charges(&self, notional: f64, side: TradeSide) -> FeeBreakdown {
        let s = &self.schedule;
        let exchange_fee = notional * s.exchange_fee;
        let brokerage = notional * s.brokerage;
        FeeBreakdown {
            transaction_tax: notional * s.transaction_tax,
            exchange_fee,
            regulatory_fee: notional * s.regulatory_fee,
            fee_tax: (exchange_fee + brokerage) * s.fee_tax,
            brokerage,
            stamp_duty: match side {
                TradeSide::Buy => notional * s.stamp_duty,
                TradeSide::Sell => 0.0,
            },
        }
    }

    /// Execution price and charges of one trade.
    ///
    /// # Errors
    ///
    /// [`AugurError::InvalidData`] for a non-positive or non-finite price or quantity.
    pub fn trade_cost(&self, price: f64, quantity: f64, side: TradeSide) -> Result<TradeCost> {
        if !(price.is_finite() && price > 0.0) {
            return Err(AugurError::InvalidData(format!("invalid trade price {price}")));
        }
        if !(quantity.is_finite() && quantity > 0.0) {
            return Err(AugurError::InvalidData(format!(
                "invalid trade quantity {quantity}"
            )));
        }
        let breakdown = self.charges(price * quantity, side);
        let slip = price * self.schedule.slippage;
        let execution_price = match side {
            TradeSide::Buy => price + slip,
            TradeSide::Sell => price - slip,
        };
        Ok(TradeCost {
            side,
            quote: price,
            quantity,
            execution_price,
            total_tax: breakdown.total(),
            breakdown,
        })
    }

    /// Charges of buying and later selling `notional` at an unchanged price.
    #[must_use]
    pub fn round_trip(&self, notional: f64) -> f64 {
        if !(notional.is_finite() && notional > 0.0) {
            return 0.0;
        }
        self.charges(notional, TradeSide::Buy).total() + self.charges(notional, TradeSide::Sell).total()
    }

    /// Round-trip charges of holding `weights` of `capital`.
    #[must_use]
    pub fn friction_report(&self, weights: &BTreeMap<Symbol, f64>, capital: f64) -> FrictionReport {
        let positions: Vec<PositionFriction> = weights
            .iter()
            .filter(|(_, w)| **w > Self::MIN_REPORTED_WEIGHT)
            .map(|(symbol, &weight)| {
                let notional = capital * weight;
                let round_trip = self.round_trip(notional);
                PositionFriction {
                    symbol: symbol.clone(),
                    weight,
                    notional,
                    round_trip,
                    breakeven_pct: round_trip / notional * 100.0,
                }
            })
            .collect();
        let total: f64 = positions.iter().map(|p| p.round_trip).sum();
        FrictionReport {
            capital,
            total_pct: if capital > 0.0 { total / capital * 100.0 } else { 0.0 },
            positions,
            total,
        }
    }
}

//! Two-stage discounted cash flow estimate of fair value per share.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// DCF assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DcfConfig {
    /// Annual growth of the cash-flow metric (default: 0.12)
    pub growth_rate: f64,

    /// Cost of capital (default: 0.10)
    pub discount_rate: f64,

    /// Exit multiple applied to the final projected flow (default: 15)
    pub terminal_multiple: f64,

    /// Projection horizon in years (default: 5)
    pub years: u32,
}

impl Default for DcfConfig {
    fn default() -> Self {
        Self {
            growth_rate: 0.12,
            discount_rate: 0.10,
            terminal_multiple: 15.0,
            years: 5,
        }
    }
}

/// Latest annual figures for one company. Amounts share one currency unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlowProfile {
    /// Operating cash flow.
    pub operating_cash_flow: Option<f64>,
    /// Capital expenditure, negative as reported in cash-flow statements.
    pub capital_expenditure: Option<f64>,
    /// Net income.
    pub net_income: Option<f64>,
    /// Shares outstanding.
    pub shares_outstanding: Option<f64>,
    /// Banks and lenders are valued on earnings instead of free cash flow.
    #[serde(default)]
    pub is_financial: bool,
}

/// Which figure the valuation was based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowBasis {
    /// Operating cash flow plus (negative) capex.
    FreeCashFlow,
    /// Net income for financial companies.
    FinancialEarnings,
    /// Net income because free cash flow was negative.
    NegativeFcfFallback,
    /// Net income because cash-flow lines were missing.
    MissingCashFlowFallback,
}

/// Fair value per share and how it was derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntrinsicValue {
    /// Estimated value per share.
    pub per_share: f64,
    /// Metric the projection started from.
    pub basis: CashFlowBasis,
}

impl IntrinsicValue {
    /// Fractional upside of the fair value over `price`.
    #[must_use]
    pub fn upside(&self, price: f64) -> f64 {
        (self.per_share - price) / price
    }
}

/// DCF valuation model.
#[derive(Debug, Clone, Copy, Default)]
pub struct DcfModel {
    config: DcfConfig,
}

impl DcfModel {
    /// Create a model with the given assumptions.
    #[must_use]
    pub const fn new(config: DcfConfig) -> Self {
        Self { config }
    }

    /// Picks the cash-flow figure to project, or `None` when none is usable.
    #[must_use]
    pub fn base_cash_flow(profile: &CashFlowProfile) -> Option<(f64, CashFlowBasis)> {
        if profile.is_financial {
            return profile
                .net_income
                .map(|ni| (ni, CashFlowBasis::FinancialEarnings));
        }
        match (profile.operating_cash_flow, profile.capital_expenditure) {
            (Some(ocf), Some(capex)) => {
                let fcf = ocf + capex;
                if fcf >= 0.0 {
                    Some((fcf, CashFlowBasis::FreeCashFlow))
                } else {
                    profile
                        .net_income
                        .filter(|ni| *ni > 0.0)
                        .map(|ni| (ni, CashFlowBasis::NegativeFcfFallback))
                }
            }
            _ => profile
                .net_income
                .map(|ni| (ni, CashFlowBasis::MissingCashFlowFallback)),
        }
    }

    /// Fair value per share, or `None` when inputs are missing or the value is not positive.
    #[must_use]
    pub fn value(&self, profile: &CashFlowProfile) -> Option<IntrinsicValue> {
        let (base, basis) = Self::base_cash_flow(profile)?;
        let shares = profile.shares_outstanding.filter(|s| *s > 0.0)?;

        let DcfConfig {
            growth_rate,
            discount_rate,
            terminal_multiple,
            years,
        } = self.config;
        if years == 0 {
            return None;
        }

        let discounted: Vec<f64> = (1..=years)
            .map(|year| {
                let year = i32::try_from(year).unwrap_or(i32::MAX);
                base * (1.0 + growth_rate).powi(year) / (1.0 + discount_rate).powi(year)
            })
            .collect();
        let last = discounted.last().copied().unwrap_or(0.0);
        let horizon = i32::try_from(years).unwrap_or(i32::MAX);
        let terminal = last * terminal_multiple / (1.0 + discount_rate).powi(horizon);
        let total = discounted.iter().sum::<f64>() + terminal;

        let per_share = total / shares;
        if per_share.is_finite() && per_share > 0.0 {
            Some(IntrinsicValue { per_share, basis })
        } else {
            debug!(per_share, "discarding non-positive intrinsic value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn profile() -> CashFlowProfile {
        CashFlowProfile {
            operating_cash_flow: Some(150.0),
            capital_expenditure: Some(-50.0),
            net_income: Some(80.0),
            shares_outstanding: Some(10.0),
            is_financial: false,
        }
    }

    #[test]
    fn test_free_cash_flow_basis() {
        let (base, basis) = DcfModel::base_cash_flow(&profile()).unwrap();
        assert_relative_eq!(base, 100.0);
        assert_eq!(basis, CashFlowBasis::FreeCashFlow);
    }

    #[test]
    fn test_financials_use_net_income() {
        let p = CashFlowProfile {
            is_financial: true,
            ..profile()
        };
        let (base, basis) = DcfModel::base_cash_flow(&p).unwrap();
        assert_relative_eq!(base, 80.0);
        assert_eq!(basis, CashFlowBasis::FinancialEarnings);
    }

    #[test]
    fn test_negative_fcf_falls_back_to_positive_earnings() {
        let p = CashFlowProfile {
            capital_expenditure: Some(-200.0),
            ..profile()
        };
        assert_eq!(
            DcfModel::base_cash_flow(&p).map(|(_, b)| b),
            Some(CashFlowBasis::NegativeFcfFallback)
        );

        let loss_making = CashFlowProfile {
            net_income: Some(-5.0),
            ..p
        };
        assert!(DcfModel::base_cash_flow(&loss_making).is_none());
    }

    #[test]
    fn test_missing_cash_flow_lines() {
        let p = CashFlowProfile {
            operating_cash_flow: None,
            ..profile()
        };
        assert_eq!(
            DcfModel::base_cash_flow(&p).map(|(_, b)| b),
            Some(CashFlowBasis::MissingCashFlowFallback)
        );
    }

    #[test]
    fn test_value_matches_hand_computation() {
        let value = DcfModel::default().value(&profile()).unwrap();
        let flows: Vec<f64> = (1..=5)
            .map(|y| 100.0 * 1.12_f64.powi(y) / 1.10_f64.powi(y))
            .collect();
        let terminal = flows[4] * 15.0 / 1.10_f64.powi(5);
        let expected = (flows.iter().sum::<f64>() + terminal) / 10.0;
        assert_relative_eq!(value.per_share, expected, epsilon = 1e-9);
        assert_relative_eq!(value.upside(expected / 2.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_shares_has_no_value() {
        let p = CashFlowProfile {
            shares_outstanding: None,
            ..profile()
        };
        assert!(DcfModel::default().value(&p).is_none());
    }
}

//! Error types for the augur framework.
//!
//! Every fallible operation in the workspace returns [`AugurError`]. Per-asset
//! failures are isolated by the callers (an asset is excluded or defaulted),
//! so most variants here describe a single asset or a single call rather than
//! a whole run.

use thiserror::Error;

/// The main error type for augur operations.
#[derive(Debug, Error)]
pub enum AugurError {
    /// Too few observations for a rolling computation.
    #[error("Insufficient history: {0}")]
    InsufficientHistory(String),

    /// A price, fundamental or sentiment entry is missing.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// The constrained optimizer did not converge or the constraints are infeasible.
    #[error("Optimization failed: {0}")]
    OptimizationFailure(String),

    /// A trade side other than buy or sell was supplied.
    #[error("Invalid trade side: {0}")]
    InvalidTradeSide(String),

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a required column is missing from the data.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error when a symbol is not found in the universe or the ledger.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The ledger does not hold enough cash for a purchase.
    #[error("Insufficient funds: need {required:.2}, have {available:.2}")]
    InsufficientFunds {
        /// Cash needed including costs.
        required: f64,
        /// Cash on hand.
        available: f64,
    },

    /// Error when a date is out of range or invalid.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl AugurError {
    /// Returns true for errors that exclude a single asset without affecting the run.
    #[must_use]
    pub const fn is_per_asset(&self) -> bool {
        matches!(
            self,
            Self::InsufficientHistory(_) | Self::DataUnavailable(_) | Self::SymbolNotFound(_)
        )
    }
}

impl From<String> for AugurError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for AugurError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for augur operations.
pub type Result<T> = std::result::Result<T, AugurError>;

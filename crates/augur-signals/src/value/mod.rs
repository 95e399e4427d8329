//! Value measures.
//!
//! - [`ValueProxy`]: price-only proxy based on the distance from the 52-week low
//! - [`DcfModel`]: fundamental fair value, whose upside can replace the proxy in live scoring

mod intrinsic;
mod proxy;

pub use intrinsic::{CashFlowBasis, CashFlowProfile, DcfConfig, DcfModel, IntrinsicValue};
pub use proxy::{ValueProxy, ValueProxyConfig};

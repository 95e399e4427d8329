//! Trade cost command implementation.

use anyhow::Result;
use augur::AugurConfig;
use augur_eval::TradeSide;
use serde_json::json;

use crate::OutputFormat;
use crate::cmd::{banner, print_json};

/// Price one order and break its charges down.
pub(crate) fn show_cost(
    config: &AugurConfig,
    price: f64,
    quantity: f64,
    side: &str,
    format: OutputFormat,
) -> Result<()> {
    let side: TradeSide = side.parse()?;
    let model = config.friction();
    let cost = model.trade_cost(price, quantity, side)?;

    if format == OutputFormat::Json {
        return print_json(&json!({
            "trade": cost,
            "slippage_cost": cost.slippage_cost(),
            "total_cost": cost.total_cost(),
            "round_trip": model.round_trip(cost.notional()),
        }));
    }

    let b = &cost.breakdown;
    banner("Trade Cost");
    println!("Side:            {}", cost.side);
    println!("Quantity:        {}", cost.quantity);
    println!("Quote:           {:.4}", cost.quote);
    println!("Execution:       {:.4}", cost.execution_price);
    println!("Notional:        {:.2}\n", cost.notional());
    println!("  Transaction tax  {:>12.4}", b.transaction_tax);
    println!("  Exchange fee     {:>12.4}", b.exchange_fee);
    println!("  Regulatory fee   {:>12.4}", b.regulatory_fee);
    println!("  Tax on fees      {:>12.4}", b.fee_tax);
    println!("  Brokerage        {:>12.4}", b.brokerage);
    println!("  Stamp duty       {:>12.4}", b.stamp_duty);
    println!("  {}", "-".repeat(29));
    println!("  Charges          {:>12.4}", cost.total_tax);
    println!("  Slippage         {:>12.4}", cost.slippage_cost());
    println!("  Total            {:>12.4}\n", cost.total_cost());
    println!(
        "Round trip on this notional: {:.4}\n",
        model.round_trip(cost.notional())
    );
    Ok(())
}

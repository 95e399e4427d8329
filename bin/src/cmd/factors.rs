//! Factor readings command implementation.

use std::path::Path;

use anyhow::Result;
use augur::AugurConfig;
use serde_json::json;

use crate::cmd::{Inputs, banner, opt, print_json};
use crate::{DataArgs, OutputFormat, data};

/// Print the raw factor readings of every asset at one date.
pub(crate) fn show_factors(
    config: &AugurConfig,
    args: &DataArgs,
    date: Option<&str>,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let inputs = Inputs::load(config, args)?;
    let date = data::resolve_date(&inputs.panel, date)?;
    let pipeline = config.pipeline();
    let frame = pipeline.frame_at(&inputs.panel, &inputs.sectors, date);
    let regime = pipeline.regime_at(&inputs.panel, date).ok();

    if let Some(path) = output {
        data::write_csv(&mut frame.to_frame()?, path)?;
    }

    if format == OutputFormat::Json {
        return print_json(&json!({
            "date": date,
            "regime": regime,
            "factors": frame.snapshots(),
            "excluded": frame.excluded(),
        }));
    }

    banner("Factor Readings");
    println!("Date:     {date}");
    println!(
        "Regime:   {}",
        regime.map_or_else(|| "unknown".to_string(), |r| r.to_string())
    );
    println!("Assets:   {} scored, {} excluded\n", frame.len(), frame.excluded().len());

    println!(
        "{:<14} {:>9} {:>9} {:>9} {:>7} {:>8} {:>8} {:>9} {:>9}",
        "Symbol", "Momentum", "Downside", "Value", "RSI", "Vol", "BBW", "RS mkt", "RS sect"
    );
    println!("{}", "-".repeat(92));
    for (symbol, s) in frame.snapshots() {
        println!(
            "{symbol:<14} {:>9.4} {:>9.4} {:>9.4} {:>7} {:>8} {:>8} {:>9} {:>9}",
            s.momentum,
            s.downside_risk,
            s.value_proxy,
            opt(s.rsi, 1),
            opt(s.volatility, 4),
            opt(s.bb_width, 4),
            opt(s.rel_strength_market, 4),
            opt(s.rel_strength_sector, 4),
        );
    }

    if !frame.excluded().is_empty() {
        println!("\nExcluded:");
        for (symbol, reason) in frame.excluded() {
            println!("  {symbol:<14} {reason}");
        }
    }
    println!();
    Ok(())
}

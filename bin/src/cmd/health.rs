//! Market health command implementation.

use anyhow::Result;
use augur::AugurConfig;
use augur_signals::MarketHealth;

use crate::OutputFormat;
use crate::cmd::{banner, print_json};

/// Check the crash and panic conditions before trading.
pub(crate) fn check_health(
    config: &AugurConfig,
    open: f64,
    current: f64,
    sentiment: Option<f64>,
    format: OutputFormat,
) -> Result<()> {
    let health = config.sentinel().assess(open, current, sentiment)?;

    if format == OutputFormat::Json {
        return print_json(&health);
    }

    banner("Market Health");
    match health {
        MarketHealth::Safe => println!("SAFE: no halt condition"),
        MarketHealth::Crash { intraday_change } => println!(
            "CRASH: benchmark moved {:.2}% since the open (limit {:.2}%)",
            intraday_change * 100.0,
            config.sentinel.crash_threshold * 100.0
        ),
        MarketHealth::Panic { sentiment } => println!(
            "PANIC: aggregate sentiment {sentiment:.2} (limit {:.2})",
            config.sentinel.panic_sentiment
        ),
    }
    println!();
    Ok(())
}

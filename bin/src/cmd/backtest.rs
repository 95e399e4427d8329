//! Backtest command implementation.

use std::path::PathBuf;

use anyhow::Result;
use augur::AugurConfig;
use augur_eval::{Backtest, HoldingMode};

use crate::cmd::{Inputs, banner, print_json, rule};
use crate::{DataArgs, OutputFormat, data};

/// Command-line overrides for the backtest section.
pub(crate) struct BacktestOptions {
    pub(crate) start: Option<String>,
    pub(crate) end: Option<String>,
    pub(crate) top: Option<usize>,
    pub(crate) allocator: bool,
    pub(crate) output: Option<PathBuf>,
}

/// Replay the strategy month by month over the price file.
pub(crate) fn run_backtest(
    config: AugurConfig,
    args: &DataArgs,
    options: BacktestOptions,
    format: OutputFormat,
) -> Result<()> {
    let inputs = Inputs::load(&config, args)?;

    let mut settings = config.backtest();
    if let Some(start) = options.start.as_deref() {
        settings.start = Some(data::parse_date(start)?);
    }
    if let Some(end) = options.end.as_deref() {
        settings.end = Some(data::parse_date(end)?);
    }
    let n = options.top.unwrap_or_else(|| settings.mode.candidates());
    if options.allocator {
        settings.mode = HoldingMode::Allocator(n);
    } else if options.top.is_some() {
        settings.mode = HoldingMode::TopN(n);
    }

    let result =
        Backtest::new(settings.clone()).run(&inputs.panel, &inputs.sectors, &inputs.context)?;

    if let Some(path) = options.output.as_deref() {
        data::write_csv(&mut result.to_frame()?, path)?;
    }

    if format == OutputFormat::Json {
        return print_json(&result);
    }

    banner("Backtesting");
    let mode = match settings.mode {
        HoldingMode::TopN(n) => format!("top {n}, equal weight"),
        HoldingMode::Allocator(n) => format!("top {n}, allocator weights"),
    };
    println!("Holdings: {mode}");
    println!("Capital:  {:.2}", settings.initial_capital);
    match (result.period_ends.first(), result.period_ends.last()) {
        (Some(first), Some(last)) => println!("Periods:  {} ({first} to {last})\n", result.periods()),
        _ => {
            println!("No month-end date could be scored.\n");
            return Ok(());
        }
    }

    rule("Performance Summary");
    println!("  Final value:    {:>14.2}", result.final_value);
    println!("  Total return:   {:>13.2}%", result.total_return * 100.0);
    println!("  Sharpe ratio:   {:>14.3}", result.sharpe_ratio);
    println!("  Max drawdown:   {:>13.2}%", result.max_drawdown * 100.0);
    println!("  Friction paid:  {:>14.2}", result.total_friction);
    println!();

    if let Some(ic) = &result.ic_summary {
        rule("Ranking Quality");
        println!("  Mean IC:        {:>14.4}", ic.mean_ic);
        println!("  IC std:         {:>14.4}", ic.std_ic);
        println!("  IR:             {:>14.3}", ic.ir);
        println!("  Hit rate:       {:>13.1}%", ic.hit_rate * 100.0);
        println!("  Observations:   {:>14}", ic.n_obs);
        println!();
    }

    println!("{:<12} {:>10} {:>16}", "Period end", "Return", "Value");
    println!("{}", "-".repeat(40));
    for ((date, ret), value) in result
        .period_ends
        .iter()
        .zip(&result.returns)
        .zip(result.values.iter().skip(1))
    {
        println!("{date:<12} {:>9.2}% {value:>16.2}", ret * 100.0);
    }
    println!();
    Ok(())
}

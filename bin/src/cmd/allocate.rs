//! Allocation command implementation.

use anyhow::Result;
use augur::AugurConfig;
use augur_alloc::{AllocationOutcome, Recommendation};
use serde_json::json;

use crate::cmd::{Inputs, banner, print_json, rule};
use crate::{DataArgs, OutputFormat, data};

/// Score the universe, allocate across the top names and price the trades.
pub(crate) fn run_allocation(
    config: &AugurConfig,
    args: &DataArgs,
    date: Option<&str>,
    top: usize,
    capital: f64,
    format: OutputFormat,
) -> Result<()> {
    let inputs = Inputs::load(config, args)?;
    let date = data::resolve_date(&inputs.panel, date)?;
    let board = config
        .pipeline()
        .board_at(&inputs.panel, &inputs.sectors, &inputs.context, date)?;

    let recs: Vec<Recommendation> = board
        .top(top)
        .iter()
        .map(|e| Recommendation::from_score(e.symbol.clone(), e.score))
        .collect();
    let allocation = config
        .allocator()
        .allocate(&recs, &inputs.panel, &inputs.sectors, date);
    let friction = config.friction().friction_report(allocation.weights(), capital);

    if format == OutputFormat::Json {
        return print_json(&json!({
            "date": date,
            "regime": board.regime(),
            "recommendations": recs,
            "allocation": allocation,
            "sector_weights": allocation.sector_weights(&inputs.sectors),
            "friction": friction,
        }));
    }

    banner("Portfolio Allocation");
    println!("Date:     {date}");
    println!("Regime:   {}", board.regime());
    println!("Inputs:   {} recommendations", recs.len());
    match allocation.outcome() {
        AllocationOutcome::Optimized => println!("Outcome:  optimized"),
        AllocationOutcome::Fallback(reason) => println!("Outcome:  fallback ({reason})"),
        AllocationOutcome::Empty => println!("Outcome:  nothing to allocate"),
    }
    println!();

    if allocation.weights().is_empty() {
        return Ok(());
    }

    println!("{:<14} {:>9} {:>12} {:>12}", "Symbol", "Weight", "Posterior", "Bench corr");
    println!("{}", "-".repeat(50));
    for (symbol, weight) in allocation.weights() {
        let posterior = allocation
            .posterior_returns()
            .get(symbol)
            .map_or_else(|| "-".to_string(), |r| format!("{:.2}%", r * 100.0));
        let corr = allocation
            .correlation()
            .correlations
            .get(symbol)
            .map_or_else(|| "-".to_string(), |c| format!("{c:.3}"));
        println!(
            "{symbol:<14} {:>8.2}% {posterior:>12} {corr:>12}",
            weight * 100.0
        );
    }
    println!();

    if !allocation.correlation().flagged.is_empty() {
        println!(
            "Highly correlated with the benchmark: {}\n",
            allocation.correlation().flagged.join(", ")
        );
    }

    rule("Sector Exposure");
    for (sector, weight) in allocation.sector_weights(&inputs.sectors) {
        println!("  {sector:<20} {:>8.2}%", weight * 100.0);
    }
    println!();

    if let Some(stats) = allocation.stats() {
        rule("Expected Portfolio");
        println!("  Return:      {:>8.2}%", stats.expected_return * 100.0);
        println!("  Volatility:  {:>8.2}%", stats.volatility * 100.0);
        println!("  Sharpe:      {:>8.3}\n", stats.sharpe);
    }

    rule("Entry and Exit Friction");
    println!("{:<14} {:>14} {:>12} {:>10}", "Symbol", "Notional", "Round trip", "Breakeven");
    println!("{}", "-".repeat(54));
    for p in &friction.positions {
        println!(
            "{:<14} {:>14.2} {:>12.2} {:>9.3}%",
            p.symbol, p.notional, p.round_trip, p.breakeven_pct
        );
    }
    println!(
        "\nTotal friction: {:.2} ({:.3}% of {:.2})\n",
        friction.total, friction.total_pct, friction.capital
    );
    Ok(())
}

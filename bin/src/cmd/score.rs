//! Composite score command implementation.

use std::path::Path;

use anyhow::Result;
use augur::AugurConfig;
use augur_combine::AssetStatus;

use crate::cmd::{Inputs, banner, opt, print_json, rule};
use crate::{DataArgs, OutputFormat, data};

/// Rank the universe at one date and print the best assets.
pub(crate) fn show_scores(
    config: &AugurConfig,
    args: &DataArgs,
    date: Option<&str>,
    top: usize,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let inputs = Inputs::load(config, args)?;
    let date = data::resolve_date(&inputs.panel, date)?;
    let board = config
        .pipeline()
        .board_at(&inputs.panel, &inputs.sectors, &inputs.context, date)?;

    if let Some(path) = output {
        data::write_csv(&mut board.to_frame()?, path)?;
    }

    if format == OutputFormat::Json {
        return print_json(&board);
    }

    let weights = board.weights();
    banner("Composite Scores");
    println!("Date:     {}", board.date());
    println!("Regime:   {}", board.regime());
    println!(
        "Weights:  momentum {:.2}, safety {:.2}, value {:.2}",
        weights.momentum, weights.safety, weights.value
    );
    println!("Universe: {} assets, {} active\n", board.len(), board.active().count());

    println!(
        "{:>4}  {:<14} {:>7} {:>9} {:>9} {:>9} {:>9}",
        "Rank", "Symbol", "Score", "Mom rank", "Safety", "Value", "Sentiment"
    );
    println!("{}", "-".repeat(68));
    for (i, entry) in board.top(top).iter().enumerate() {
        println!(
            "{:>4}  {:<14} {:>7.2} {:>9} {:>9} {:>9} {:>9.2}",
            i + 1,
            entry.symbol,
            entry.score,
            opt(entry.momentum_rank, 3),
            opt(entry.safety_rank, 3),
            opt(entry.value_rank, 3),
            entry.sentiment,
        );
    }
    println!();

    let inactive: Vec<_> = board
        .entries()
        .iter()
        .filter(|e| e.status != AssetStatus::Active)
        .collect();
    if !inactive.is_empty() {
        rule("Not Ranked");
        for entry in inactive {
            println!("  {:<14} {}", entry.symbol, entry.status);
        }
        println!();
    }
    Ok(())
}

//! CLI subcommand modules.
//!
//! This module contains the implementations for all augur CLI subcommands.

pub(crate) mod allocate;
pub(crate) mod backtest;
pub(crate) mod cost;
pub(crate) mod factors;
pub(crate) mod health;
pub(crate) mod score;
pub(crate) mod search;
pub(crate) mod signals;
pub(crate) mod value;

use anyhow::Result;
use augur::AugurConfig;
use augur_combine::ScoringContext;
use augur_traits::{PricePanel, SectorMap};
use serde::Serialize;

use crate::{DataArgs, data};

/// Print a boxed section title.
pub(crate) fn banner(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{title:^62}║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

/// Print a heavy rule around a summary heading.
pub(crate) fn rule(title: &str) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{title}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}

/// Print any serializable value as pretty JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Everything the ranking commands read from disk.
pub(crate) struct Inputs {
    pub(crate) panel: PricePanel,
    pub(crate) sectors: SectorMap,
    pub(crate) context: ScoringContext,
}

impl Inputs {
    pub(crate) fn load(config: &AugurConfig, args: &DataArgs) -> Result<Self> {
        let panel = data::load_panel(&args.prices, &config.benchmark)?;
        let sectors = data::load_sectors(args.sectors.as_deref())?;
        let context = data::load_context(
            args.sentiment.as_deref(),
            args.fundamentals.as_deref(),
            args.upside.as_deref(),
        )?;
        Ok(Self {
            panel,
            sectors,
            context,
        })
    }
}

/// Format an optional reading.
pub(crate) fn opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

//! Weight search command implementation.

use anyhow::Result;
use augur::AugurConfig;
use augur_eval::WeightSearch;
use augur_signals::Regime;

use crate::cmd::{Inputs, banner, print_json, rule};
use crate::{DataArgs, OutputFormat, data};

/// Command-line overrides for the search section.
pub(crate) struct SearchOptions {
    pub(crate) start: Option<String>,
    pub(crate) end: Option<String>,
    pub(crate) divisions: Option<u32>,
    pub(crate) top: Option<usize>,
}

/// Grid-search the regime weights over the price file.
pub(crate) fn run_search(
    config: AugurConfig,
    args: &DataArgs,
    options: SearchOptions,
    format: OutputFormat,
) -> Result<()> {
    let inputs = Inputs::load(&config, args)?;

    let mut settings = config.search();
    if let Some(start) = options.start.as_deref() {
        settings.start = Some(data::parse_date(start)?);
    }
    if let Some(end) = options.end.as_deref() {
        settings.end = Some(data::parse_date(end)?);
    }
    if let Some(divisions) = options.divisions {
        settings.divisions = divisions;
    }
    if let Some(top) = options.top {
        settings.top_n = top;
    }

    let result = WeightSearch::new(settings).run(&inputs.panel, &inputs.sectors)?;

    if format == OutputFormat::Json {
        return print_json(&result);
    }

    banner("Regime Weight Search");
    println!("Grid:     {} divisions", settings.divisions);
    println!("Holdings: top {}", settings.top_n);
    println!("Horizon:  {} trading days\n", settings.forward_periods);

    for regime in Regime::ALL {
        let search = result.for_regime(regime);
        rule(&format!("{regime} market ({} dates)", search.dates));
        let best = search.best;
        println!(
            "  Best:      momentum {:.2}, safety {:.2}, value {:.2}",
            best.momentum, best.safety, best.value
        );
        match search.objective {
            Some(obj) => println!("  Objective: {:.3}% mean forward return\n", obj * 100.0),
            None => println!("  Objective: none evaluable, default weights kept\n"),
        }

        let mut ranked: Vec<_> = search
            .candidates
            .iter()
            .filter_map(|c| c.objective.map(|o| (c.weights, o)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        for (weights, obj) in ranked.iter().take(5) {
            println!(
                "    ({:.1}, {:.1}, {:.1})  {:>8.3}%",
                weights.momentum,
                weights.safety,
                weights.value,
                obj * 100.0
            );
        }
        println!();
    }

    println!("These weights are fit on the same history they are scored on.");
    println!("Run `augur backtest` with them in the config to judge them.\n");
    Ok(())
}

//! Signal listing command implementation.

use anyhow::Result;
use augur_signals::registry::{available_categories, signals_by_category};

use crate::OutputFormat;
use crate::cmd::{banner, print_json};

/// List available signals, optionally filtered by category.
pub(crate) fn list_signals(category: Option<&str>, format: OutputFormat) -> Result<()> {
    let categories: Vec<_> = available_categories()
        .into_iter()
        .filter(|cat| {
            category.is_none_or(|filter| {
                format!("{cat:?}")
                    .to_lowercase()
                    .contains(&filter.to_lowercase())
            })
        })
        .collect();

    if format == OutputFormat::Json {
        let signals: Vec<_> = categories.iter().flat_map(signals_by_category).collect();
        return print_json(&signals);
    }

    banner("Available Signals");
    for cat in categories {
        println!("{cat:?}: {}", cat.description());
        println!("{}", "-".repeat(60));
        for info in signals_by_category(&cat) {
            let sectors = if info.requires_sectors { " [sectors]" } else { "" };
            println!(
                "  {:26} {} (lookback: {} days){sectors}",
                info.name, info.description, info.typical_lookback
            );
        }
        println!();
    }
    Ok(())
}

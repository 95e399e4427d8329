//! Intrinsic value command implementation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use augur::AugurConfig;
use augur_signals::value::{CashFlowProfile, DcfModel};
use serde_json::json;

use crate::OutputFormat;
use crate::cmd::{banner, print_json};

/// Value a company from its latest annual cash-flow figures.
pub(crate) fn show_value(
    config: &AugurConfig,
    profile_path: &Path,
    price: Option<f64>,
    format: OutputFormat,
) -> Result<()> {
    let text = fs::read_to_string(profile_path)
        .with_context(|| format!("cannot read {}", profile_path.display()))?;
    let profile: CashFlowProfile = serde_json::from_str(&text)
        .with_context(|| format!("invalid profile {}", profile_path.display()))?;
    if let Some(p) = price
        && !(p.is_finite() && p > 0.0)
    {
        bail!("price must be positive, got {p}");
    }

    let value = DcfModel::new(config.dcf).value(&profile);
    let upside = value.zip(price).map(|(v, p)| v.upside(p));

    if format == OutputFormat::Json {
        return print_json(&json!({
            "profile": profile,
            "value": value,
            "upside": upside,
        }));
    }

    banner("Intrinsic Value");
    let dcf = &config.dcf;
    println!(
        "Growth {:.1}%, discount {:.1}%, exit multiple {:.1}, {} years\n",
        dcf.growth_rate * 100.0,
        dcf.discount_rate * 100.0,
        dcf.terminal_multiple,
        dcf.years
    );
    match value {
        Some(v) => {
            println!("Fair value:  {:.2} per share", v.per_share);
            println!("Basis:       {:?}", v.basis);
            if let Some(u) = upside {
                println!("Upside:      {:.2}%", u * 100.0);
            }
        }
        None => println!("No usable cash-flow figures; the company cannot be valued."),
    }
    println!();
    Ok(())
}

//! Augur CLI binary.
//!
//! Ranks equities, allocates with Black–Litterman and replays the process
//! over historical prices loaded from CSV.

mod cmd;
mod data;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use augur::AugurConfig;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::Level;

#[derive(Parser)]
#[command(name = "augur")]
#[command(about = "Regime-aware equity ranking and allocation", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file; missing sections use defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable tables
    Text,
    /// JSON documents
    Json,
}

/// Input files shared by the ranking commands.
#[derive(Debug, Args)]
pub(crate) struct DataArgs {
    /// Price CSV with columns date,symbol,close[,volume]
    #[arg(short, long)]
    pub(crate) prices: PathBuf,

    /// Sector CSV with columns symbol,sector
    #[arg(short, long)]
    pub(crate) sectors: Option<PathBuf>,

    /// JSON object of symbol to news sentiment in [-1, 1]
    #[arg(long)]
    pub(crate) sentiment: Option<PathBuf>,

    /// JSON object of symbol to fundamental score 0-9
    #[arg(long)]
    pub(crate) fundamentals: Option<PathBuf>,

    /// JSON object of symbol to valuation upside, replacing the value proxy
    #[arg(long)]
    pub(crate) upside: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available signals
    Signals {
        /// Filter by category
        #[arg(short = 'k', long)]
        category: Option<String>,
    },

    /// Print the effective configuration as JSON
    Config,

    /// Raw factor readings for one date
    Factors {
        #[command(flatten)]
        data: DataArgs,

        /// Date (YYYY-MM-DD, defaults to the latest)
        #[arg(short, long)]
        date: Option<String>,

        /// Write the readings to a CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rank the universe with the regime-weighted composite score
    Score {
        #[command(flatten)]
        data: DataArgs,

        /// Date (YYYY-MM-DD, defaults to the latest)
        #[arg(short, long)]
        date: Option<String>,

        /// Number of assets to show
        #[arg(short = 'n', long, default_value = "10")]
        top: usize,

        /// Write the full board to a CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Allocate capital across the top-ranked assets
    Allocate {
        #[command(flatten)]
        data: DataArgs,

        /// Date (YYYY-MM-DD, defaults to the latest)
        #[arg(short, long)]
        date: Option<String>,

        /// Number of ranked assets passed to the allocator
        #[arg(short = 'n', long, default_value = "10")]
        top: usize,

        /// Capital used for the friction report
        #[arg(long, default_value = "100000")]
        capital: f64,
    },

    /// Replay the strategy month by month
    Backtest {
        #[command(flatten)]
        data: DataArgs,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Hold the top N equally weighted
        #[arg(short = 'n', long)]
        top: Option<usize>,

        /// Size positions with the allocator instead of equal weights
        #[arg(long)]
        allocator: bool,

        /// Write the equity curve to a CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// In-sample grid search over regime weights
    Search {
        #[command(flatten)]
        data: DataArgs,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Grid steps per unit weight
        #[arg(long)]
        divisions: Option<u32>,

        /// Assets held per date
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },

    /// Trading cost of one order
    Cost {
        /// Quoted price
        price: f64,

        /// Number of shares
        quantity: f64,

        /// Buy or sell
        #[arg(long, default_value = "buy")]
        side: String,
    },

    /// Fair value from a JSON cash-flow profile
    Value {
        /// JSON file with operating_cash_flow, capital_expenditure, net_income, shares_outstanding
        profile: PathBuf,

        /// Current price, to report the upside
        #[arg(long)]
        price: Option<f64>,
    },

    /// Check whether the market is calm enough to trade
    Health {
        /// Benchmark price at the open
        #[arg(long)]
        open: f64,

        /// Current benchmark price
        #[arg(long)]
        current: f64,

        /// Aggregate news sentiment
        #[arg(long)]
        sentiment: Option<f64>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => AugurConfig::from_json_file(path)?,
        None => AugurConfig::default(),
    };
    let format = cli.format;

    match cli.command {
        Commands::Signals { category } => cmd::signals::list_signals(category.as_deref(), format)?,
        Commands::Config => println!("{}", config.to_json_pretty()?),
        Commands::Factors { data, date, output } => {
            cmd::factors::show_factors(&config, &data, date.as_deref(), output.as_deref(), format)?;
        }
        Commands::Score {
            data,
            date,
            top,
            output,
        } => {
            cmd::score::show_scores(&config, &data, date.as_deref(), top, output.as_deref(), format)?;
        }
        Commands::Allocate {
            data,
            date,
            top,
            capital,
        } => {
            cmd::allocate::run_allocation(&config, &data, date.as_deref(), top, capital, format)?;
        }
        Commands::Backtest {
            data,
            start,
            end,
            top,
            allocator,
            output,
        } => {
            let options = cmd::backtest::BacktestOptions {
                start,
                end,
                top,
                allocator,
                output,
            };
            cmd::backtest::run_backtest(config, &data, options, format)?;
        }
        Commands::Search {
            data,
            start,
            end,
            divisions,
            top,
        } => {
            let options = cmd::search::SearchOptions {
                start,
                end,
                divisions,
                top,
            };
            cmd::search::run_search(config, &data, options, format)?;
        }
        Commands::Cost {
            price,
            quantity,
            side,
        } => cmd::cost::show_cost(&config, price, quantity, &side, format)?,
        Commands::Value { profile, price } => {
            cmd::value::show_value(&config, &profile, price, format)?;
        }
        Commands::Health {
            open,
            current,
            sentiment,
        } => cmd::health::check_health(&config, open, current, sentiment, format)?,
    }

    Ok(())
}

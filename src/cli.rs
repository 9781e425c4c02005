use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Options market-structure map — gamma exposure, strike clusters,
/// liquidity and support/resistance barriers from one option chain snapshot.
#[derive(Parser)]
#[command(name = "barrier-map", version, about)]
pub struct Cli {
    /// Log per-stage details to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze an option chain CSV
    Analyze {
        /// Path to the chain CSV (strike, side, open_interest, bid, ask, last)
        file: PathBuf,

        /// Current price of the underlying future
        #[arg(long)]
        price: f64,

        /// Days until expiry (<= 0 means expired: gamma is zero)
        #[arg(long)]
        days: f64,

        /// Analysis config JSON (omitted fields take defaults)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the risk-free rate
        #[arg(long)]
        rate: Option<f64>,

        /// Override the implied volatility
        #[arg(long)]
        vol: Option<f64>,

        /// Override the contract size
        #[arg(long)]
        contract_size: Option<f64>,

        /// Write the full report as JSON to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Summarize open interest across several expiries (one CSV per expiry)
    TermStructure {
        /// Chain CSV files, labeled by file stem
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Number of main strikes to list per expiry
        #[arg(long, default_value = "5")]
        top: usize,
    },

    /// Check a chain CSV and list the rows that would be skipped
    Validate {
        /// Path to the chain CSV
        file: PathBuf,
    },

    /// Output the JSON schema for the config and the report
    Schema,

    /// Output an example chain CSV and the default config
    Example,
}

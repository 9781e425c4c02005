use clap::Parser;
use tracing::Level;

use barrier_map::{analysis, example, schema, validate};

mod cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    match cli.command {
        cli::Command::Analyze {
            file,
            price,
            days,
            config,
            rate,
            vol,
            contract_size,
            output,
        } => analysis::run(&analysis::AnalyzeConfig {
            chain_path: file,
            config_path: config,
            current_price: price,
            days_to_expiry: days,
            risk_free_rate: rate,
            implied_volatility: vol,
            contract_size,
            output,
        }),
        cli::Command::TermStructure { files, top } => analysis::run_term_structure(&files, top),
        cli::Command::Validate { file } => validate::run(&file),
        cli::Command::Schema => schema::run(),
        cli::Command::Example => example::run(),
    }
}

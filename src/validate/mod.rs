use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Row-level problems. The row is dropped and the run continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("row {row}: missing `{field}`")]
    MissingField { row: usize, field: &'static str },

    #[error("row {row}: strike {value} must be a finite number > 0")]
    InvalidStrike { row: usize, value: f64 },

    #[error("row {row}: open interest {value} must be a finite number >= 0")]
    InvalidOpenInterest { row: usize, value: f64 },

    #[error("row {row}: unknown option side `{value}` (expected CALL or PUT)")]
    InvalidSide { row: usize, value: String },

    #[error("row {row}: gamma exposure at strike {strike} is not finite")]
    NonFiniteExposure { row: usize, strike: f64 },
}

impl DataError {
    pub fn row(&self) -> usize {
        match self {
            DataError::MissingField { row, .. }
            | DataError::InvalidStrike { row, .. }
            | DataError::InvalidOpenInterest { row, .. }
            | DataError::InvalidSide { row, .. }
            | DataError::NonFiniteExposure { row, .. } => *row,
        }
    }
}

/// Invalid scalar market context. Fatal for the whole run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketContextError {
    #[error("current price must be > 0, got {0}")]
    NonPositivePrice(f64),

    #[error("implied volatility must be > 0, got {0}")]
    NonPositiveVolatility(f64),

    #[error("contract multiplier must be > 0, got {0}")]
    NonPositiveMultiplier(f64),

    #[error("`{field}` must be finite")]
    NonFinite { field: &'static str },
}

/// Invalid analysis configuration. Fatal for the whole run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("dbscan_eps must be > 0, got {0}")]
    InvalidEps(f64),

    #[error("dbscan_min_samples must be >= 1")]
    InvalidMinSamples,

    #[error("weights must be >= 0 (oi_weight {oi_weight}, spread_weight {spread_weight})")]
    NegativeWeight { oi_weight: f64, spread_weight: f64 },

    #[error("oi_weight + spread_weight must equal 1, got {0}")]
    WeightsDoNotSumToOne(f64),

    #[error("sign convention multipliers must be finite")]
    InvalidSignConvention,

    #[error("profile_half_width must be >= 0, got {0}")]
    InvalidProfileWidth(f64),
}

/// Anything that aborts a run before computation starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("invalid market context: {0}")]
    MarketContext(#[from] MarketContextError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Non-fatal conditions handled by a documented fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Expiry reached; every gamma is zero for this run.
    ExpiredContract { days_to_expiry: f64 },
    /// A stage hit a zero-variance / zero-range input and used its fallback.
    DegenerateInput { stage: String, detail: String },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::ExpiredContract { days_to_expiry } => write!(
                f,
                "contract expired (days_to_expiry = {days_to_expiry}), gamma set to 0"
            ),
            Warning::DegenerateInput { stage, detail } => write!(f, "[{stage}] {detail}"),
        }
    }
}

/// A dropped or excluded row and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

impl From<&DataError> for SkippedRow {
    fn from(e: &DataError) -> Self {
        Self {
            row: e.row(),
            reason: e.to_string(),
        }
    }
}

/// Row-level diagnostics returned next to a successful result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Diagnostics {
    pub skipped: Vec<SkippedRow>,
    pub warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn skip(&mut self, err: DataError) {
        tracing::warn!(row = err.row(), "skipping row: {err}");
        self.skipped.push(SkippedRow::from(&err));
    }

    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.skipped.extend(other.skipped);
        self.warnings.extend(other.warnings);
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.warnings.is_empty()
    }
}

/// CLI entry point for the `validate` subcommand.
#[cfg(feature = "full")]
pub fn run(path: &std::path::Path) -> anyhow::Result<()> {
    let raw = crate::data::load_chain(path)?;
    let (table, diagnostics) = crate::model::OptionTable::from_raw(raw);

    println!(
        "Chain '{}': {} rows accepted ({} calls, {} puts), {} skipped.",
        path.display(),
        table.len(),
        table.calls().count(),
        table.puts().count(),
        diagnostics.skipped.len()
    );
    if diagnostics.skipped.is_empty() {
        return Ok(());
    }
    eprintln!("Skipped {} row(s):", diagnostics.skipped.len());
    for (i, s) in diagnostics.skipped.iter().enumerate() {
        eprintln!("  {}. {}", i + 1, s.reason);
    }
    std::process::exit(1);
}

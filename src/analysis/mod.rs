pub mod cluster;
pub mod exposure;
pub mod gamma;
pub mod levels;
pub mod liquidity;
pub mod profile;

use crate::model::{AnalysisConfig, MarketContext, OptionRecord, OptionTable};
use crate::report::{AnalysisReport, AnalyzedRow};
use crate::validate::{AnalysisError, Diagnostics};

use cluster::ClusterAssignment;
use levels::CriticalLevel;
use liquidity::LiquidityScores;

/// Validate `records` into a table, then analyze it. Dropped records show up
/// in the report's diagnostics.
pub fn analyze_records(
    records: Vec<OptionRecord>,
    ctx: &MarketContext,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    check_inputs(ctx, config)?;
    let (table, diagnostics) = OptionTable::new(records);
    let mut report = analyze(&table, ctx, config)?;
    let mut all = diagnostics;
    all.merge(std::mem::take(&mut report.diagnostics));
    report.diagnostics = all;
    Ok(report)
}

/// Run every stage over one snapshot.
///
/// Context and config are checked before anything is computed. Exposure runs
/// first; clustering, liquidity scoring and level detection only read the
/// table and run side by side.
pub fn analyze(
    table: &OptionTable,
    ctx: &MarketContext,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    check_inputs(ctx, config)?;

    let exposure = exposure::compute_exposure(table, ctx, &config.sign_convention);
    let (clusters, liquidity, levels) = independent_stages(table, ctx, config);

    let mut diagnostics = Diagnostics::default();
    diagnostics.merge(exposure.diagnostics.clone());
    diagnostics.merge(clusters.diagnostics.clone());
    diagnostics.merge(liquidity.diagnostics.clone());

    let rows: Vec<AnalyzedRow> = table
        .iter()
        .enumerate()
        .map(|(i, record)| AnalyzedRow {
            record: record.clone(),
            gamma: exposure.rows[i].gamma,
            signed_gamma_exposure: exposure.rows[i].signed_gamma_exposure,
            net_gamma_exposure: exposure.rows[i].net_gamma_exposure,
            cluster_id: clusters.labels[i],
            spread: liquidity.spreads[i],
            liquidity_score: liquidity.scores[i],
        })
        .collect();

    tracing::info!(
        rows = rows.len(),
        strikes = exposure.by_strike.len(),
        clusters = clusters.n_clusters,
        critical_levels = levels.len(),
        skipped = diagnostics.skipped.len(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        market: *ctx,
        total_net_gamma_exposure: exposure.total_net_exposure(),
        cluster_summary: profile::summarize_clusters(table, &clusters.labels),
        volume_profile: profile::volume_profile(table, config.profile_half_width),
        summary: profile::summarize_chain(table, config.top_strikes),
        strike_exposure: exposure.by_strike,
        critical_levels: levels,
        rows,
        diagnostics,
    })
}

fn check_inputs(ctx: &MarketContext, config: &AnalysisConfig) -> Result<(), AnalysisError> {
    ctx.validate()?;
    config.validate()?;
    Ok(())
}

#[cfg(feature = "full")]
fn independent_stages(
    table: &OptionTable,
    ctx: &MarketContext,
    config: &AnalysisConfig,
) -> (ClusterAssignment, LiquidityScores, Vec<CriticalLevel>) {
    let (clusters, (liquidity, levels)) = rayon::join(
        || cluster::cluster(table, config.dbscan_eps, config.dbscan_min_samples),
        || {
            rayon::join(
                || liquidity::score(table, config.oi_weight, config.spread_weight),
                || levels::detect(table, ctx.current_price),
            )
        },
    );
    (clusters, liquidity, levels)
}

#[cfg(not(feature = "full"))]
fn independent_stages(
    table: &OptionTable,
    ctx: &MarketContext,
    config: &AnalysisConfig,
) -> (ClusterAssignment, LiquidityScores, Vec<CriticalLevel>) {
    (
        cluster::cluster(table, config.dbscan_eps, config.dbscan_min_samples),
        liquidity::score(table, config.oi_weight, config.spread_weight),
        levels::detect(table, ctx.current_price),
    )
}

/// Options for the `analyze` subcommand.
#[cfg(feature = "full")]
pub struct AnalyzeConfig {
    pub chain_path: std::path::PathBuf,
    pub config_path: Option<std::path::PathBuf>,
    pub current_price: f64,
    pub days_to_expiry: f64,
    pub risk_free_rate: Option<f64>,
    pub implied_volatility: Option<f64>,
    pub contract_size: Option<f64>,
    pub output: Option<std::path::PathBuf>,
}

/// CLI entry point for the `analyze` subcommand.
#[cfg(feature = "full")]
pub fn run(opts: &AnalyzeConfig) -> anyhow::Result<()> {
    use anyhow::Context;

    let mut config = match &opts.config_path {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(r) = opts.risk_free_rate {
        config.risk_free_rate = r;
    }
    if let Some(v) = opts.implied_volatility {
        config.implied_volatility = v;
    }
    if let Some(c) = opts.contract_size {
        config.contract_size = c;
    }
    let ctx = MarketContext::from_config(opts.current_price, opts.days_to_expiry, &config);

    let raw = crate::data::load_chain(&opts.chain_path)?;
    let (table, ingest) = OptionTable::from_raw(raw);
    let mut report = analyze(&table, &ctx, &config).context("analysis aborted")?;
    let mut diagnostics = ingest;
    diagnostics.merge(std::mem::take(&mut report.diagnostics));
    report.diagnostics = diagnostics;

    report.print_table();

    if let Some(ref output_path) = opts.output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(output_path, json)
            .with_context(|| format!("writing report to {}", output_path.display()))?;
        eprintln!("Written to {}", output_path.display());
    }
    Ok(())
}

/// CLI entry point for the `term-structure` subcommand.
#[cfg(feature = "full")]
pub fn run_term_structure(files: &[std::path::PathBuf], top_strikes: usize) -> anyhow::Result<()> {
    let mut chains = Vec::with_capacity(files.len());
    for path in files {
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let (table, diagnostics) = OptionTable::from_raw(crate::data::load_chain(path)?);
        if !diagnostics.skipped.is_empty() {
            tracing::warn!(
                chain = %label,
                skipped = diagnostics.skipped.len(),
                "rows dropped during ingestion"
            );
        }
        chains.push((label, table));
    }
    let summaries = profile::term_structure(&chains, top_strikes);
    crate::report::print_term_structure(&summaries);
    Ok(())
}

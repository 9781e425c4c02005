use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysis::exposure::StrikeExposure;
use crate::analysis::levels::CriticalLevel;
use crate::analysis::profile::{ChainSummary, ClusterSummary, ExpirySummary, ProfileBin};
use crate::model::{MarketContext, OptionRecord};
use crate::validate::Diagnostics;

/// An input record with every derived column attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzedRow {
    #[serde(flatten)]
    pub record: OptionRecord,
    pub gamma: f64,
    pub signed_gamma_exposure: f64,
    pub net_gamma_exposure: f64,
    /// `-1` for noise.
    pub cluster_id: i32,
    /// Effective spread used for the liquidity score.
    pub spread: f64,
    pub liquidity_score: f64,
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    pub market: MarketContext,
    pub rows: Vec<AnalyzedRow>,
    pub strike_exposure: Vec<StrikeExposure>,
    pub total_net_gamma_exposure: f64,
    /// Ranked by liquidity score descending.
    pub critical_levels: Vec<CriticalLevel>,
    pub cluster_summary: Vec<ClusterSummary>,
    pub volume_profile: Vec<ProfileBin>,
    pub summary: ChainSummary,
    pub diagnostics: Diagnostics,
}

impl AnalysisReport {
    pub fn print_table(&self) {
        let m = &self.market;
        println!("\n{}", "═".repeat(90));
        println!(
            "  Barrier Map  |  price {:.4}  |  {:.1} days  |  σ {:.2}%  |  r {:.2}%",
            m.current_price,
            m.days_to_expiry,
            m.implied_volatility * 100.0,
            m.risk_free_rate * 100.0,
        );
        println!("{}", "═".repeat(90));

        println!("\n  Critical Levels");
        println!(
            "  {:>10} {:>5} {:>12} {:>8} {:>4} {:>11} {:>7}",
            "Strike", "Side", "OI", "OI Wt", "Mny", "Barrier", "Score",
        );
        println!("  {}", "-".repeat(64));
        if self.critical_levels.is_empty() {
            println!("  (none)");
        }
        for l in &self.critical_levels {
            println!(
                "  {:>10.4} {:>5} {:>12.0} {:>8.4} {:>4} {:>11} {:>7.3}",
                l.strike,
                l.side,
                l.open_interest,
                l.oi_weight,
                match l.moneyness {
                    crate::analysis::levels::Moneyness::Itm => "ITM",
                    crate::analysis::levels::Moneyness::Otm => "OTM",
                },
                l.barrier_type,
                l.liquidity_score,
            );
        }

        println!("\n  Clusters");
        println!("  {:>8} {:>6} {:>12} {:>12}", "Cluster", "Count", "Mean Strike", "OI");
        println!("  {}", "-".repeat(42));
        for c in &self.cluster_summary {
            println!(
                "  {:>8} {:>6} {:>12.4} {:>12.0}",
                c.cluster_id, c.count, c.mean_strike, c.total_oi
            );
        }

        println!("\n  Net Gamma Exposure by Strike");
        println!("  {:>10} {:>16} {:>16} {:>16}", "Strike", "Calls", "Puts", "Net");
        println!("  {}", "-".repeat(62));
        for s in &self.strike_exposure {
            println!(
                "  {:>10.4} {:>+16.2} {:>+16.2} {:>+16.2}",
                s.strike, s.call_exposure, s.put_exposure, s.net_gamma_exposure
            );
        }
        println!("{}", "═".repeat(90));

        let s = &self.summary;
        println!(
            "  OI {:.0} (calls {:.0}, puts {:.0}), P/C {}, net GEX {:+.2}",
            s.total_oi,
            s.call_oi,
            s.put_oi,
            s.put_call_ratio
                .map(|r| format!("{r:.3}"))
                .unwrap_or_else(|| "n/a".to_string()),
            self.total_net_gamma_exposure,
        );
        if !self.diagnostics.skipped.is_empty() {
            println!("  {} row(s) skipped", self.diagnostics.skipped.len());
        }
        for w in &self.diagnostics.warnings {
            println!("  warning: {w}");
        }
    }
}

pub fn print_term_structure(summaries: &[ExpirySummary]) {
    println!("\n{}", "═".repeat(80));
    println!("  Term Structure");
    println!("{}", "═".repeat(80));
    println!(
        "  {:<16} {:>12} {:>12} {:>12} {:>7}  {}",
        "Expiry", "Total OI", "Call OI", "Put OI", "P/C", "Main Strikes",
    );
    println!("  {}", "-".repeat(76));
    for e in summaries {
        let s = &e.summary;
        let strikes: Vec<String> = s.main_strikes.iter().map(|k| format!("{k}")).collect();
        println!(
            "  {:<16} {:>12.0} {:>12.0} {:>12.0} {:>7} {}",
            e.label,
            s.total_oi,
            s.call_oi,
            s.put_oi,
            s.put_call_ratio
                .map(|r| format!("{r:.3}"))
                .unwrap_or_else(|| "n/a".to_string()),
            strikes.join(", "),
        );
    }
    println!("{}", "═".repeat(80));
}

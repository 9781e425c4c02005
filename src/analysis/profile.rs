use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{OptionSide, OptionTable};

/// Members, mean strike and total OI of one cluster (`-1` = noise).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClusterSummary {
    pub cluster_id: i32,
    pub count: usize,
    pub mean_strike: f64,
    pub total_oi: f64,
}

/// OI over one price interval of the volume profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProfileBin {
    pub lower: f64,
    pub upper: f64,
    pub call_oi: f64,
    pub put_oi: f64,
    pub total_oi: f64,
}

/// Open interest structure of one expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChainSummary {
    pub total_oi: f64,
    pub call_oi: f64,
    pub put_oi: f64,
    /// Strikes with the most OI (both sides combined), largest first.
    pub main_strikes: Vec<f64>,
    /// Put OI / call OI; `None` without call OI.
    pub put_call_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExpirySummary {
    pub label: String,
    #[serde(flatten)]
    pub summary: ChainSummary,
}

pub fn summarize_clusters(table: &OptionTable, labels: &[i32]) -> Vec<ClusterSummary> {
    let mut acc: BTreeMap<i32, (usize, f64, f64)> = BTreeMap::new();
    for (r, &label) in table.iter().zip(labels) {
        let e = acc.entry(label).or_insert((0, 0.0, 0.0));
        e.0 += 1;
        e.1 += r.strike;
        e.2 += r.open_interest;
    }
    acc.into_iter()
        .map(|(cluster_id, (count, strike_sum, total_oi))| ClusterSummary {
            cluster_id,
            count,
            mean_strike: strike_sum / count as f64,
            total_oi,
        })
        .collect()
}

/// Sum OI over `[strike - half_width, strike + half_width]` intervals,
/// merging strikes whose intervals overlap into one bin.
pub fn volume_profile(table: &OptionTable, half_width: f64) -> Vec<ProfileBin> {
    let mut records: Vec<_> = table.iter().collect();
    records.sort_by(|a, b| a.strike.total_cmp(&b.strike));

    let mut bins: Vec<ProfileBin> = Vec::new();
    for r in records {
        let (lower, upper) = (r.strike - half_width, r.strike + half_width);
        if !bins.last().is_some_and(|last| lower <= last.upper) {
            bins.push(ProfileBin {
                lower,
                upper,
                call_oi: 0.0,
                put_oi: 0.0,
                total_oi: 0.0,
            });
        }
        let Some(bin) = bins.last_mut() else {
            continue;
        };
        bin.upper = bin.upper.max(upper);
        match r.side {
            OptionSide::Call => bin.call_oi += r.open_interest,
            OptionSide::Put => bin.put_oi += r.open_interest,
        }
        bin.total_oi += r.open_interest;
    }
    bins
}

pub fn summarize_chain(table: &OptionTable, top_strikes: usize) -> ChainSummary {
    let call_oi = table.total_open_interest(OptionSide::Call);
    let put_oi = table.total_open_interest(OptionSide::Put);

    // Strikes are finite and > 0, so their bit patterns sort numerically.
    let mut by_strike: BTreeMap<u64, f64> = BTreeMap::new();
    for r in table.iter() {
        *by_strike.entry(r.strike.to_bits()).or_default() += r.open_interest;
    }
    let mut ranked: Vec<(f64, f64)> = by_strike
        .into_iter()
        .map(|(bits, oi)| (f64::from_bits(bits), oi))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.total_cmp(&b.0)));

    ChainSummary {
        total_oi: call_oi + put_oi,
        call_oi,
        put_oi,
        main_strikes: ranked.into_iter().take(top_strikes).map(|(k, _)| k).collect(),
        put_call_ratio: (call_oi > 0.0).then(|| put_oi / call_oi),
    }
}

/// Chain summaries for several expiries, in input order.
pub fn term_structure(chains: &[(String, OptionTable)], top_strikes: usize) -> Vec<ExpirySummary> {
    let summarize = |(label, table): &(String, OptionTable)| ExpirySummary {
        label: label.clone(),
        summary: summarize_chain(table, top_strikes),
    };

    #[cfg(feature = "full")]
    {
        use rayon::prelude::*;
        chains.par_iter().map(summarize).collect()
    }
    #[cfg(not(feature = "full"))]
    {
        chains.iter().map(summarize).collect()
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{OptionSide, OptionTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Moneyness {
    Itm,
    Otm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BarrierType {
    Support,
    Resistance,
}

impl std::fmt::Display for BarrierType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BarrierType::Support => f.pad("Support"),
            BarrierType::Resistance => f.pad("Resistance"),
        }
    }
}

/// A strike whose OI stands out on its side, classified as a barrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CriticalLevel {
    pub strike: f64,
    pub side: OptionSide,
    pub open_interest: f64,
    /// Share of its side's total OI.
    pub oi_weight: f64,
    pub moneyness: Moneyness,
    pub barrier_type: BarrierType,
    /// OI relative to the largest OI among critical levels.
    pub liquidity_score: f64,
}

/// Call ITM iff strike < price; put ITM iff strike > price.
pub fn moneyness(side: OptionSide, strike: f64, current_price: f64) -> Moneyness {
    let itm = match side {
        OptionSide::Call => strike < current_price,
        OptionSide::Put => strike > current_price,
    };
    if itm { Moneyness::Itm } else { Moneyness::Otm }
}

/// Barrier rule table. Calls above price are resistance, puts below price
/// are support, anything else takes the opposite role. A strike exactly at
/// the price falls to the second arm: Support for a call, Resistance for a put.
pub fn classify_barrier(side: OptionSide, strike: f64, current_price: f64) -> BarrierType {
    match side {
        OptionSide::Call if strike > current_price => BarrierType::Resistance,
        OptionSide::Call => BarrierType::Support,
        OptionSide::Put if strike < current_price => BarrierType::Support,
        OptionSide::Put => BarrierType::Resistance,
    }
}

/// Each record's share of the total OI on its own side.
pub fn oi_weights(table: &OptionTable) -> Vec<f64> {
    let call_total = table.total_open_interest(OptionSide::Call);
    let put_total = table.total_open_interest(OptionSide::Put);
    table
        .iter()
        .map(|r| {
            let total = match r.side {
                OptionSide::Call => call_total,
                OptionSide::Put => put_total,
            };
            if total > 0.0 { r.open_interest / total } else { 0.0 }
        })
        .collect()
}

/// `mean + sample std` of one side's weights. `None` with fewer than two records.
pub fn concentration_threshold(weights: &[f64]) -> Option<f64> {
    if weights.len() < 2 {
        return None;
    }
    let n = weights.len() as f64;
    let mean = weights.iter().sum::<f64>() / n;
    let var = weights.iter().map(|w| (w - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(mean + var.sqrt())
}

/// Flag one-sigma OI outliers per side, classify them against `current_price`
/// and rank by OI relative to the largest flagged OI (ties: strike ascending).
pub fn detect(table: &OptionTable, current_price: f64) -> Vec<CriticalLevel> {
    let weights = oi_weights(table);
    let threshold = |side: OptionSide| {
        let side_weights: Vec<f64> = table
            .iter()
            .zip(&weights)
            .filter(|(r, _)| r.side == side)
            .map(|(_, &w)| w)
            .collect();
        concentration_threshold(&side_weights)
    };
    let call_threshold = threshold(OptionSide::Call);
    let put_threshold = threshold(OptionSide::Put);

    let mut levels: Vec<CriticalLevel> = table
        .iter()
        .zip(&weights)
        .filter(|&(r, &w)| {
            let t = match r.side {
                OptionSide::Call => call_threshold,
                OptionSide::Put => put_threshold,
            };
            t.is_some_and(|t| w > t)
        })
        .map(|(r, &w)| CriticalLevel {
            strike: r.strike,
            side: r.side,
            open_interest: r.open_interest,
            oi_weight: w,
            moneyness: moneyness(r.side, r.strike, current_price),
            barrier_type: classify_barrier(r.side, r.strike, current_price),
            liquidity_score: 0.0,
        })
        .collect();

    let max_oi = levels.iter().map(|l| l.open_interest).fold(0.0, f64::max);
    for level in &mut levels {
        level.liquidity_score = if max_oi > 0.0 {
            level.open_interest / max_oi
        } else {
            1.0
        };
    }

    levels.sort_by(|a, b| {
        b.liquidity_score
            .total_cmp(&a.liquidity_score)
            .then(a.strike.total_cmp(&b.strike))
            .then(a.side.cmp(&b.side))
    });

    tracing::debug!(
        flagged = levels.len(),
        call_threshold = ?call_threshold,
        put_threshold = ?put_threshold,
        "critical levels detected"
    );
    levels
}

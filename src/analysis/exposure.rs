use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::gamma::gamma;
use crate::model::{MarketContext, OptionSide, OptionTable, SignConvention};
use crate::validate::{DataError, Diagnostics, Warning};

/// Per-record exposure columns, aligned with the input table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExposureRow {
    pub gamma: f64,
    pub signed_gamma_exposure: f64,
    /// Strike-level net exposure joined back onto the record.
    pub net_gamma_exposure: f64,
}

/// Net gamma exposure at one distinct strike, both sides combined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StrikeExposure {
    pub strike: f64,
    pub call_exposure: f64,
    pub put_exposure: f64,
    pub net_gamma_exposure: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExposureTable {
    pub rows: Vec<ExposureRow>,
    /// Sorted by strike ascending.
    pub by_strike: Vec<StrikeExposure>,
    pub diagnostics: Diagnostics,
}

impl ExposureTable {
    pub fn total_net_exposure(&self) -> f64 {
        self.by_strike.iter().map(|s| s.net_gamma_exposure).sum()
    }

    pub fn net_at(&self, strike: f64) -> Option<f64> {
        self.by_strike
            .iter()
            .find(|s| s.strike == strike)
            .map(|s| s.net_gamma_exposure)
    }
}

/// `gamma · sign · OI · multiplier` for every record, then the per-strike sum.
///
/// A record whose exposure comes out non-finite is reported as skipped,
/// carries zero exposure and stays out of its strike's sum.
pub fn compute_exposure(
    table: &OptionTable,
    ctx: &MarketContext,
    signs: &SignConvention,
) -> ExposureTable {
    let mut diagnostics = Diagnostics::default();
    if ctx.is_expired() {
        diagnostics.warn(Warning::ExpiredContract {
            days_to_expiry: ctx.days_to_expiry,
        });
    }

    let t = ctx.time_to_expiry();
    // Strikes are finite and > 0, so their bit patterns sort numerically.
    let mut strikes: BTreeMap<u64, StrikeExposure> = BTreeMap::new();
    let mut partial: Vec<(f64, f64)> = Vec::with_capacity(table.len());

    for (i, record) in table.iter().enumerate() {
        let g = gamma(
            ctx.current_price,
            record.strike,
            t,
            ctx.risk_free_rate,
            ctx.implied_volatility,
        );
        let sign = match record.side {
            OptionSide::Call => signs.call,
            OptionSide::Put => signs.put,
        };
        let mut exposure = g * sign * record.open_interest * ctx.contract_multiplier;

        let entry = strikes
            .entry(record.strike.to_bits())
            .or_insert(StrikeExposure {
                strike: record.strike,
                call_exposure: 0.0,
                put_exposure: 0.0,
                net_gamma_exposure: 0.0,
            });

        if exposure.is_finite() {
            match record.side {
                OptionSide::Call => entry.call_exposure += exposure,
                OptionSide::Put => entry.put_exposure += exposure,
            }
            entry.net_gamma_exposure += exposure;
        } else {
            diagnostics.skip(DataError::NonFiniteExposure {
                row: table.source_row(i),
                strike: record.strike,
            });
            exposure = 0.0;
        }
        partial.push((g, exposure));
    }

    let rows = table
        .iter()
        .zip(partial)
        .map(|(record, (gamma, signed_gamma_exposure))| ExposureRow {
            gamma,
            signed_gamma_exposure,
            net_gamma_exposure: strikes[&record.strike.to_bits()].net_gamma_exposure,
        })
        .collect();

    let by_strike: Vec<StrikeExposure> = strikes.into_values().collect();
    tracing::debug!(
        strikes = by_strike.len(),
        records = table.len(),
        "gamma exposure aggregated"
    );

    ExposureTable {
        rows,
        by_strike,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalysisConfig, OptionRecord};

    fn ctx(days: f64) -> MarketContext {
        MarketContext::from_config(100.0, days, &AnalysisConfig::default())
    }

    fn table() -> OptionTable {
        OptionTable::try_new(vec![
            OptionRecord::call(100.0, 500.0),
            OptionRecord::call(110.0, 50.0),
            OptionRecord::put(90.0, 400.0),
            OptionRecord::put(100.0, 30.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_signs_follow_side() {
        let out = compute_exposure(&table(), &ctx(10.0), &SignConvention::default());
        assert!(out.rows[0].signed_gamma_exposure > 0.0);
        assert!(out.rows[1].signed_gamma_exposure > 0.0);
        assert!(out.rows[2].signed_gamma_exposure < 0.0);
        assert!(out.rows[3].signed_gamma_exposure < 0.0);
        // Gamma itself does not depend on the side
        assert_eq!(out.rows[0].gamma, out.rows[3].gamma);
    }

    #[test]
    fn test_exposure_scales_with_oi_and_multiplier() {
        let c = ctx(10.0);
        let out = compute_exposure(&table(), &c, &SignConvention::default());
        let row = out.rows[0];
        let expected = row.gamma * 500.0 * c.contract_multiplier;
        assert!((row.signed_gamma_exposure - expected).abs() < 1e-9 * expected.abs());
    }

    #[test]
    fn test_net_exposure_is_joined_per_strike() {
        let out = compute_exposure(&table(), &ctx(10.0), &SignConvention::default());
        let at_100 = out.rows[0].signed_gamma_exposure + out.rows[3].signed_gamma_exposure;
        assert!((out.rows[0].net_gamma_exposure - at_100).abs() < 1e-9);
        assert_eq!(out.rows[0].net_gamma_exposure, out.rows[3].net_gamma_exposure);
        assert_eq!(out.net_at(100.0), Some(out.rows[0].net_gamma_exposure));

        let strikes: Vec<f64> = out.by_strike.iter().map(|s| s.strike).collect();
        assert_eq!(strikes, vec![90.0, 100.0, 110.0]);
    }

    #[test]
    fn test_total_equals_sum_of_records() {
        let out = compute_exposure(&table(), &ctx(10.0), &SignConvention::default());
        let per_record: f64 = out.rows.iter().map(|r| r.signed_gamma_exposure).sum();
        assert!((out.total_net_exposure() - per_record).abs() < 1e-6);
    }

    #[test]
    fn test_expired_contracts_contribute_nothing() {
        let out = compute_exposure(&table(), &ctx(0.0), &SignConvention::default());
        assert!(out.rows.iter().all(|r| r.gamma == 0.0));
        assert!(out.by_strike.iter().all(|s| s.net_gamma_exposure == 0.0));
        assert!(matches!(
            out.diagnostics.warnings[0],
            Warning::ExpiredContract { .. }
        ));
    }

    #[test]
    fn test_custom_sign_convention() {
        let flipped = SignConvention {
            call: -1.0,
            put: 1.0,
        };
        let base = compute_exposure(&table(), &ctx(10.0), &SignConvention::default());
        let out = compute_exposure(&table(), &ctx(10.0), &flipped);
        for (a, b) in base.rows.iter().zip(&out.rows) {
            assert_eq!(a.signed_gamma_exposure, -b.signed_gamma_exposure);
        }
    }

    #[test]
    fn test_non_finite_exposure_is_skipped() {
        let t = OptionTable::try_new(vec![
            OptionRecord::call(100.0, f64::MAX),
            OptionRecord::call(100.0, 10.0),
        ])
        .unwrap();
        let c = MarketContext {
            contract_multiplier: 1e300,
            ..ctx(10.0)
        };
        let out = compute_exposure(&t, &c, &SignConvention::default());
        assert_eq!(out.diagnostics.skipped.len(), 1);
        assert_eq!(out.diagnostics.skipped[0].row, 1);
        assert_eq!(out.rows[0].signed_gamma_exposure, 0.0);
        // The surviving record alone forms the strike sum
        assert_eq!(out.rows[0].net_gamma_exposure, out.rows[1].net_gamma_exposure);
    }
}

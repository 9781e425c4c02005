use crate::model::OptionTable;
use crate::validate::{Diagnostics, Warning};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiquidityScores {
    /// Effective spread per record; a missing quote takes the widest observed spread.
    pub spreads: Vec<f64>,
    /// Composite score per record, higher is more liquid.
    pub scores: Vec<f64>,
    pub diagnostics: Diagnostics,
}

/// `OI/max_OI · oi_weight + (1 − spread/max_spread) · spread_weight`.
///
/// Records without a usable quote are scored at the widest observed spread.
/// When no spread varies (max spread 0) every spread score is 1; when every
/// OI is zero every OI ratio is 1.
pub fn score(table: &OptionTable, oi_weight: f64, spread_weight: f64) -> LiquidityScores {
    let mut diagnostics = Diagnostics::default();
    if table.is_empty() {
        return LiquidityScores::default();
    }

    let observed: Vec<Option<f64>> = table.iter().map(|r| r.spread()).collect();
    let max_spread = observed.iter().flatten().copied().fold(0.0, f64::max);
    let spreads: Vec<f64> = observed.iter().map(|s| s.unwrap_or(max_spread)).collect();

    let max_oi = table.iter().map(|r| r.open_interest).fold(0.0, f64::max);

    if max_spread <= 0.0 {
        diagnostics.warn(Warning::DegenerateInput {
            stage: "liquidity".to_string(),
            detail: "max spread is 0, spread score defaults to 1".to_string(),
        });
    }
    if max_oi <= 0.0 {
        diagnostics.warn(Warning::DegenerateInput {
            stage: "liquidity".to_string(),
            detail: "max open interest is 0, OI ratio defaults to 1".to_string(),
        });
    }

    let scores = table
        .iter()
        .zip(&spreads)
        .map(|(r, &spread)| {
            let spread_score = if max_spread > 0.0 {
                1.0 - spread / max_spread
            } else {
                1.0
            };
            let oi_ratio = if max_oi > 0.0 {
                r.open_interest / max_oi
            } else {
                1.0
            };
            oi_ratio * oi_weight + spread_score * spread_weight
        })
        .collect();

    LiquidityScores {
        spreads,
        scores,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OptionRecord;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_composite_score() {
        let t = OptionTable::try_new(vec![
            OptionRecord::call(100.0, 1000.0).with_quote(1.0, 1.1),
            OptionRecord::call(105.0, 500.0).with_quote(1.0, 1.5),
        ])
        .unwrap();
        let out = score(&t, 0.7, 0.3);
        // spreads 0.1 and 0.5 → spread scores 0.8 and 0
        assert!(close(out.scores[0], 0.7 + 0.3 * 0.8));
        assert!(close(out.scores[1], 0.35));
        assert!(out.diagnostics.is_clean());
    }

    #[test]
    fn test_missing_quote_is_worst_case() {
        let t = OptionTable::try_new(vec![
            OptionRecord::call(100.0, 100.0).with_quote(1.0, 1.2),
            OptionRecord::call(105.0, 100.0).with_quote(1.0, 1.4),
            OptionRecord::call(110.0, 100.0),
            OptionRecord::call(115.0, 100.0).with_quote(2.0, 1.0),
        ])
        .unwrap();
        let out = score(&t, 0.7, 0.3);
        assert!(close(out.spreads[2], out.spreads[1]));
        assert!(close(out.spreads[3], out.spreads[1]));
        assert!(close(out.scores[2], 0.7));
        assert!(out.scores[0] > out.scores[2]);
    }

    #[test]
    fn test_monotonic_in_oi_and_spread() {
        let t = OptionTable::try_new(vec![
            OptionRecord::call(100.0, 100.0).with_quote(1.0, 1.2),
            OptionRecord::call(105.0, 300.0).with_quote(1.0, 1.2),
            OptionRecord::put(95.0, 300.0).with_quote(1.0, 1.5),
        ])
        .unwrap();
        let out = score(&t, 0.7, 0.3);
        assert!(out.scores[1] >= out.scores[0]);
        assert!(out.scores[1] >= out.scores[2]);
    }

    #[test]
    fn test_degenerate_spread_and_oi() {
        let t = OptionTable::try_new(vec![
            OptionRecord::call(100.0, 100.0).with_quote(1.0, 1.0),
            OptionRecord::put(100.0, 100.0),
        ])
        .unwrap();
        let out = score(&t, 0.7, 0.3);
        assert!(out.scores.iter().all(|&s| close(s, 1.0)));
        assert_eq!(out.diagnostics.warnings.len(), 1);

        let t = OptionTable::try_new(vec![
            OptionRecord::call(100.0, 0.0),
            OptionRecord::put(100.0, 0.0),
        ])
        .unwrap();
        let out = score(&t, 0.7, 0.3);
        assert!(out.scores.iter().all(|&s| close(s, 1.0)));
        assert_eq!(out.diagnostics.warnings.len(), 2);
    }
}

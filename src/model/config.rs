use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validate::ConfigError;

/// Exposure sign per option side. Calls `+1` (resistance), puts `-1`
/// (support) is a modeling assumption, kept configurable for calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SignConvention {
    #[serde(default = "default_call_sign")]
    pub call: f64,
    #[serde(default = "default_put_sign")]
    pub put: f64,
}

impl Default for SignConvention {
    fn default() -> Self {
        Self {
            call: default_call_sign(),
            put: default_put_sign(),
        }
    }
}

/// Tunables for one analysis run.
/// Loaded from JSON; every omitted field falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisConfig {
    /// Reachability radius in standardized (strike, OI) space.
    #[serde(default = "default_eps")]
    pub dbscan_eps: f64,
    /// Neighbours (self included) needed for a core point.
    #[serde(default = "default_min_samples")]
    pub dbscan_min_samples: usize,
    /// Weight of the OI term in the liquidity score.
    #[serde(default = "default_oi_weight")]
    pub oi_weight: f64,
    /// Weight of the spread term in the liquidity score.
    #[serde(default = "default_spread_weight")]
    pub spread_weight: f64,
    /// Annualized risk-free rate (default: Selic approximation).
    #[serde(default = "default_rate")]
    pub risk_free_rate: f64,
    /// Flat implied volatility used for every strike.
    #[serde(default = "default_vol")]
    pub implied_volatility: f64,
    /// Notional per contract per unit of OI.
    #[serde(default = "default_contract_size")]
    pub contract_size: f64,
    #[serde(default)]
    pub sign_convention: SignConvention,
    /// Half-width of each volume profile interval around a strike.
    #[serde(default = "default_profile_half_width")]
    pub profile_half_width: f64,
    /// How many strikes `ChainSummary::main_strikes` keeps.
    #[serde(default = "default_top_strikes")]
    pub top_strikes: usize,
}

fn default_call_sign() -> f64 {
    1.0
}
fn default_put_sign() -> f64 {
    -1.0
}
fn default_eps() -> f64 {
    0.3
}
fn default_min_samples() -> usize {
    2
}
fn default_oi_weight() -> f64 {
    0.7
}
fn default_spread_weight() -> f64 {
    0.3
}
fn default_rate() -> f64 {
    0.1175
}
fn default_vol() -> f64 {
    0.15
}
fn default_contract_size() -> f64 {
    50_000.0
}
fn default_profile_half_width() -> f64 {
    0.025
}
fn default_top_strikes() -> usize {
    5
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            dbscan_eps: default_eps(),
            dbscan_min_samples: default_min_samples(),
            oi_weight: default_oi_weight(),
            spread_weight: default_spread_weight(),
            risk_free_rate: default_rate(),
            implied_volatility: default_vol(),
            contract_size: default_contract_size(),
            sign_convention: SignConvention::default(),
            profile_half_width: default_profile_half_width(),
            top_strikes: default_top_strikes(),
        }
    }
}

impl AnalysisConfig {
    /// Load a config from a JSON file.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config at {}", path.display()))?;
        let config: AnalysisConfig = serde_json::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dbscan_eps.is_finite() && self.dbscan_eps > 0.0) {
            return Err(ConfigError::InvalidEps(self.dbscan_eps));
        }
        if self.dbscan_min_samples == 0 {
            return Err(ConfigError::InvalidMinSamples);
        }
        if !(self.oi_weight >= 0.0 && self.spread_weight >= 0.0) {
            return Err(ConfigError::NegativeWeight {
                oi_weight: self.oi_weight,
                spread_weight: self.spread_weight,
            });
        }
        let total = self.oi_weight + self.spread_weight;
        if (total - 1.0).abs() > 1e-9 {
            return Err(ConfigError::WeightsDoNotSumToOne(total));
        }
        if !(self.sign_convention.call.is_finite() && self.sign_convention.put.is_finite()) {
            return Err(ConfigError::InvalidSignConvention);
        }
        if !(self.profile_half_width >= 0.0 && self.profile_half_width.is_finite()) {
            return Err(ConfigError::InvalidProfileWidth(self.profile_half_width));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let cfg: AnalysisConfig =
            serde_json::from_str(r#"{"dbscan_eps": 0.5, "sign_convention": {"put": -2.0}}"#)
                .unwrap();
        assert_eq!(cfg.dbscan_eps, 0.5);
        assert_eq!(cfg.dbscan_min_samples, 2);
        assert_eq!(cfg.sign_convention.call, 1.0);
        assert_eq!(cfg.sign_convention.put, -2.0);
        assert_eq!(cfg.contract_size, 50_000.0);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let cfg = AnalysisConfig {
            oi_weight: 0.6,
            spread_weight: 0.3,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::WeightsDoNotSumToOne(_))
        ));

        let cfg = AnalysisConfig {
            oi_weight: 1.2,
            spread_weight: -0.2,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::NegativeWeight { .. })));
    }

    #[test]
    fn test_rejects_bad_dbscan_params() {
        let cfg = AnalysisConfig {
            dbscan_eps: 0.0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidEps(0.0)));

        let cfg = AnalysisConfig {
            dbscan_min_samples: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidMinSamples));
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::config::AnalysisConfig;
use crate::validate::MarketContextError;

/// Trading days per year used to turn calendar days into `T`.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Scalar inputs that hold for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MarketContext {
    pub current_price: f64,
    pub days_to_expiry: f64,
    pub risk_free_rate: f64,
    pub implied_volatility: f64,
    pub contract_multiplier: f64,
}

impl MarketContext {
    /// Context for `current_price`/`days_to_expiry` with the rate, volatility
    /// and contract size taken from `config`.
    pub fn from_config(current_price: f64, days_to_expiry: f64, config: &AnalysisConfig) -> Self {
        Self {
            current_price,
            days_to_expiry,
            risk_free_rate: config.risk_free_rate,
            implied_volatility: config.implied_volatility,
            contract_multiplier: config.contract_size,
        }
    }

    /// Time to expiry in years.
    pub fn time_to_expiry(&self) -> f64 {
        self.days_to_expiry / TRADING_DAYS_PER_YEAR
    }

    pub fn is_expired(&self) -> bool {
        self.days_to_expiry <= 0.0
    }

    pub fn validate(&self) -> Result<(), MarketContextError> {
        let fields = [
            ("current_price", self.current_price),
            ("days_to_expiry", self.days_to_expiry),
            ("risk_free_rate", self.risk_free_rate),
            ("implied_volatility", self.implied_volatility),
            ("contract_multiplier", self.contract_multiplier),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(MarketContextError::NonFinite { field: *field });
        }
        if self.current_price <= 0.0 {
            return Err(MarketContextError::NonPositivePrice(self.current_price));
        }
        if self.implied_volatility <= 0.0 {
            return Err(MarketContextError::NonPositiveVolatility(
                self.implied_volatility,
            ));
        }
        if self.contract_multiplier <= 0.0 {
            return Err(MarketContextError::NonPositiveMultiplier(
                self.contract_multiplier,
            ));
        }
        Ok(())
    }
}

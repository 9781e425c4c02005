use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Option side. Black–Scholes gamma is side-independent; the side only
/// drives exposure sign, moneyness and barrier classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OptionSide {
    Call,
    Put,
}

impl OptionSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionSide::Call => "call",
            OptionSide::Put => "put",
        }
    }
}

impl fmt::Display for OptionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for OptionSide {
    type Err = String;

    /// Accepts `call`/`c` and `put`/`p`, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "call" | "c" => Ok(OptionSide::Call),
            "put" | "p" => Ok(OptionSide::Put),
            other => Err(other.to_string()),
        }
    }
}

/// One validated row of an option chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OptionRecord {
    /// Strike price, always > 0.
    pub strike: f64,
    pub side: OptionSide,
    /// Outstanding contracts, always >= 0.
    pub open_interest: f64,
    /// Best bid. `None` when the quote is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid: Option<f64>,
    /// Best ask. `None` when the quote is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask: Option<f64>,
    /// Last traded price, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_price: Option<f64>,
}

impl OptionRecord {
    pub fn new(strike: f64, side: OptionSide, open_interest: f64) -> Self {
        Self {
            strike,
            side,
            open_interest,
            bid: None,
            ask: None,
            last_price: None,
        }
    }

    pub fn call(strike: f64, open_interest: f64) -> Self {
        Self::new(strike, OptionSide::Call, open_interest)
    }

    pub fn put(strike: f64, open_interest: f64) -> Self {
        Self::new(strike, OptionSide::Put, open_interest)
    }

    pub fn with_quote(mut self, bid: f64, ask: f64) -> Self {
        self.bid = Some(bid);
        self.ask = Some(ask);
        self
    }

    /// `ask - bid`, or `None` when either quote is missing, non-finite,
    /// or the market is crossed.
    pub fn spread(&self) -> Option<f64> {
        let (bid, ask) = (self.bid?, self.ask?);
        let spread = ask - bid;
        (spread.is_finite() && spread >= 0.0).then_some(spread)
    }
}

/// A chain row as delivered by ingestion, before validation.
/// Every field may be missing; `OptionTable::from_raw` decides what survives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawOption {
    #[serde(default, alias = "Strike")]
    pub strike: Option<f64>,
    #[serde(default, alias = "Tipo", alias = "type", alias = "option_type")]
    pub side: Option<String>,
    #[serde(default, alias = "OI", alias = "oi")]
    pub open_interest: Option<f64>,
    #[serde(default, alias = "Compra")]
    pub bid: Option<f64>,
    #[serde(default, alias = "Venda")]
    pub ask: Option<f64>,
    #[serde(default, alias = "Último", alias = "last_price")]
    pub last: Option<f64>,
}

impl From<&OptionRecord> for RawOption {
    fn from(r: &OptionRecord) -> Self {
        Self {
            strike: Some(r.strike),
            side: Some(r.side.as_str().to_string()),
            open_interest: Some(r.open_interest),
            bid: r.bid,
            ask: r.ask,
            last: r.last_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_parsing() {
        assert_eq!(" CALL ".parse::<OptionSide>(), Ok(OptionSide::Call));
        assert_eq!("Put".parse::<OptionSide>(), Ok(OptionSide::Put));
        assert_eq!("p".parse::<OptionSide>(), Ok(OptionSide::Put));
        assert!("straddle".parse::<OptionSide>().is_err());
    }

    #[test]
    fn test_spread() {
        let r = OptionRecord::call(100.0, 10.0).with_quote(1.0, 1.5);
        assert_eq!(r.spread(), Some(0.5));

        // Crossed quote counts as missing
        let r = OptionRecord::call(100.0, 10.0).with_quote(2.0, 1.5);
        assert_eq!(r.spread(), None);

        let r = OptionRecord::call(100.0, 10.0);
        assert_eq!(r.spread(), None);
    }
}

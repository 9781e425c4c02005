pub mod config;
pub mod market;
pub mod option;
pub mod table;

pub use config::{AnalysisConfig, SignConvention};
pub use market::MarketContext;
pub use option::{OptionRecord, OptionSide, RawOption};
pub use table::OptionTable;

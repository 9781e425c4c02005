pub mod analysis;
#[cfg(feature = "full")]
pub mod data;
pub mod example;
pub mod model;
pub mod report;
pub mod schema;
pub mod validate;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use analysis::{analyze, analyze_records};
pub use model::{AnalysisConfig, MarketContext, OptionRecord, OptionSide, OptionTable};
pub use report::AnalysisReport;

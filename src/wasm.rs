use serde::Deserialize;
use wasm_bindgen::prelude::*;

use crate::analysis;
use crate::model::{AnalysisConfig, MarketContext, OptionTable, RawOption};

#[derive(Deserialize)]
struct AnalyzeRequest {
    current_price: f64,
    days_to_expiry: f64,
    #[serde(default)]
    config: AnalysisConfig,
    options: Vec<RawOption>,
}

/// Analyze a chain passed as JSON:
/// `{"current_price", "days_to_expiry", "config"?, "options": [...]}`.
/// Returns the report JSON, or `{"error": ...}`.
#[wasm_bindgen]
pub fn analyze_chain_json(json: &str) -> String {
    let req: AnalyzeRequest = match serde_json::from_str(json) {
        Ok(r) => r,
        Err(e) => {
            return serde_json::json!({ "error": format!("JSON parse error: {}", e) }).to_string();
        }
    };
    let ctx = MarketContext::from_config(req.current_price, req.days_to_expiry, &req.config);
    let (table, ingest) = OptionTable::from_raw(req.options);
    match analysis::analyze(&table, &ctx, &req.config) {
        Ok(mut report) => {
            let mut diagnostics = ingest;
            diagnostics.merge(std::mem::take(&mut report.diagnostics));
            report.diagnostics = diagnostics;
            serde_json::to_string(&report).unwrap_or_else(|e| {
                serde_json::json!({ "error": format!("Serialization error: {}", e) }).to_string()
            })
        }
        Err(e) => serde_json::json!({ "error": e.to_string() }).to_string(),
    }
}

#[wasm_bindgen]
pub fn get_schema() -> String {
    crate::schema::get_schema_json()
}

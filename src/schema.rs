use schemars::schema_for;

use crate::model::AnalysisConfig;
use crate::report::AnalysisReport;

/// JSON Schemas for the config file and the report, as one document.
pub fn get_schema_json() -> String {
    let doc = serde_json::json!({
        "config": schema_for!(AnalysisConfig),
        "report": schema_for!(AnalysisReport),
    });
    serde_json::to_string_pretty(&doc).unwrap_or_else(|e| {
        serde_json::json!({ "error": format!("Serialization error: {}", e) }).to_string()
    })
}

/// Print the JSON Schemas for `AnalysisConfig` and `AnalysisReport`.
pub fn run() -> anyhow::Result<()> {
    println!("{}", get_schema_json());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_names_config_fields() {
        let json: serde_json::Value = serde_json::from_str(&get_schema_json()).unwrap();
        let props = &json["config"]["properties"];
        assert!(props.get("dbscan_eps").is_some());
        assert!(props.get("sign_convention").is_some());
        assert!(json["report"]["properties"].get("critical_levels").is_some());
    }
}

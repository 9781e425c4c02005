use crate::model::{AnalysisConfig, OptionRecord};

/// A small dollar-future option chain around 5.70, with one dominant strike
/// per side.
pub fn sample_records() -> Vec<OptionRecord> {
    vec![
        OptionRecord::call(5.65, 420.0).with_quote(0.0520, 0.0545),
        OptionRecord::call(5.70, 1_150.0).with_quote(0.0185, 0.0195),
        OptionRecord::call(5.75, 5_400.0).with_quote(0.0062, 0.0066),
        OptionRecord::call(5.80, 980.0).with_quote(0.0018, 0.0022),
        OptionRecord::call(5.85, 610.0).with_quote(0.0006, 0.0010),
        OptionRecord::call(5.90, 350.0),
        OptionRecord::put(5.50, 700.0).with_quote(0.0004, 0.0008),
        OptionRecord::put(5.55, 4_800.0).with_quote(0.0011, 0.0014),
        OptionRecord::put(5.60, 1_050.0).with_quote(0.0031, 0.0036),
        OptionRecord::put(5.65, 830.0).with_quote(0.0085, 0.0092),
        OptionRecord::put(5.70, 520.0).with_quote(0.0200, 0.0215),
    ]
}

/// Print an example chain CSV followed by the default config JSON.
pub fn run() -> anyhow::Result<()> {
    println!("strike,side,open_interest,bid,ask,last");
    for r in sample_records() {
        let cell = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        println!(
            "{},{},{},{},{},{}",
            r.strike,
            r.side.as_str().to_uppercase(),
            r.open_interest,
            cell(r.bid),
            cell(r.ask),
            cell(r.last_price),
        );
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&AnalysisConfig::default())?);
    Ok(())
}

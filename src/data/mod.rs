use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::RawOption;

/// Load a normalized option chain CSV.
///
/// Headers: `strike, side, open_interest, bid, ask, last` (the exchange
/// export names `Strike, Tipo, OI, Compra, Venda, Último` are accepted too).
/// Unparseable numeric cells become missing values; `OptionTable::from_raw`
/// decides which rows survive.
pub fn load_chain(path: &Path) -> Result<Vec<RawOption>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening CSV file {}", path.display()))?;
    parse_chain(file).with_context(|| format!("parsing CSV file {}", path.display()))
}

pub fn parse_chain<R: Read>(reader: R) -> Result<Vec<RawOption>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()
        .context("reading CSV header")?
        .iter()
        .map(canonical_header)
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.context("reading CSV record")?;
        let mut raw = RawOption::default();
        for (header, cell) in headers.iter().zip(record.iter()) {
            match header.as_str() {
                "strike" => raw.strike = parse_number(cell),
                "side" => raw.side = (!cell.is_empty()).then(|| cell.to_string()),
                "open_interest" => raw.open_interest = parse_number(cell),
                "bid" => raw.bid = parse_number(cell),
                "ask" => raw.ask = parse_number(cell),
                "last" => raw.last = parse_number(cell),
                _ => {}
            }
        }
        rows.push(raw);
    }
    Ok(rows)
}

fn canonical_header(h: &str) -> String {
    match h.trim().to_lowercase().as_str() {
        "strike" => "strike",
        "side" | "tipo" | "type" | "option_type" => "side",
        "open_interest" | "oi" => "open_interest",
        "bid" | "compra" => "bid",
        "ask" | "venda" => "ask",
        "last" | "last_price" | "último" | "ultimo" => "last",
        other => other,
    }
    .to_string()
}

/// Accepts `1234.5` and decimal-comma `1.234,5` / `5,70`; anything else is missing.
fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() || cell == "-" {
        return None;
    }
    let value = match cell.parse::<f64>() {
        Ok(v) => v,
        Err(_) if cell.contains(',') => cell.replace('.', "").replace(',', ".").parse().ok()?,
        Err(_) => return None,
    };
    value.is_finite().then_some(value)
}

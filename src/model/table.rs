use serde::Serialize;

use super::option::{OptionRecord, OptionSide, RawOption};
use crate::validate::{DataError, Diagnostics};

/// One expiry's option chain. Every record is validated on entry:
/// strike finite and > 0, open interest finite and >= 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptionTable {
    records: Vec<OptionRecord>,
    /// 1-based input row of each record, for diagnostics.
    #[serde(skip)]
    source_rows: Vec<usize>,
}

impl OptionTable {
    /// Build a table, dropping (and reporting) every invalid record.
    pub fn new(records: Vec<OptionRecord>) -> (Self, Diagnostics) {
        let mut table = OptionTable::default();
        let mut diagnostics = Diagnostics::default();
        for (i, record) in records.into_iter().enumerate() {
            let row = i + 1;
            match check_record(row, &record) {
                Ok(()) => table.push(row, record),
                Err(e) => diagnostics.skip(e),
            }
        }
        (table, diagnostics)
    }

    /// Strict variant: the first invalid record fails the whole table.
    pub fn try_new(records: Vec<OptionRecord>) -> Result<Self, DataError> {
        let mut table = OptionTable::default();
        for (i, record) in records.into_iter().enumerate() {
            check_record(i + 1, &record)?;
            table.push(i + 1, record);
        }
        Ok(table)
    }

    /// Build a table from ingestion rows, where any field may be missing.
    pub fn from_raw(rows: Vec<RawOption>) -> (Self, Diagnostics) {
        let mut table = OptionTable::default();
        let mut diagnostics = Diagnostics::default();
        for (i, raw) in rows.into_iter().enumerate() {
            let row = i + 1;
            match parse_raw(row, raw).and_then(|r| check_record(row, &r).map(|_| r)) {
                Ok(record) => table.push(row, record),
                Err(e) => diagnostics.skip(e),
            }
        }
        (table, diagnostics)
    }

    fn push(&mut self, row: usize, record: OptionRecord) {
        self.records.push(record);
        self.source_rows.push(row);
    }

    pub fn records(&self) -> &[OptionRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn side(&self, side: OptionSide) -> impl Iterator<Item = &OptionRecord> {
        self.records.iter().filter(move |r| r.side == side)
    }

    pub fn calls(&self) -> impl Iterator<Item = &OptionRecord> {
        self.side(OptionSide::Call)
    }

    pub fn puts(&self) -> impl Iterator<Item = &OptionRecord> {
        self.side(OptionSide::Put)
    }

    /// Input row number of the record at `index`.
    pub fn source_row(&self, index: usize) -> usize {
        self.source_rows.get(index).copied().unwrap_or(index + 1)
    }

    pub fn total_open_interest(&self, side: OptionSide) -> f64 {
        self.side(side).map(|r| r.open_interest).sum()
    }
}

fn check_record(row: usize, r: &OptionRecord) -> Result<(), DataError> {
    if !(r.strike.is_finite() && r.strike > 0.0) {
        return Err(DataError::InvalidStrike {
            row,
            value: r.strike,
        });
    }
    if !(r.open_interest.is_finite() && r.open_interest >= 0.0) {
        return Err(DataError::InvalidOpenInterest {
            row,
            value: r.open_interest,
        });
    }
    Ok(())
}

fn parse_raw(row: usize, raw: RawOption) -> Result<OptionRecord, DataError> {
    let strike = raw.strike.ok_or(DataError::MissingField {
        row,
        field: "strike",
    })?;
    let open_interest = raw.open_interest.ok_or(DataError::MissingField {
        row,
        field: "open_interest",
    })?;
    let side_str = raw.side.ok_or(DataError::MissingField { row, field: "side" })?;
    let side = side_str
        .parse::<OptionSide>()
        .map_err(|value| DataError::InvalidSide { row, value })?;

    Ok(OptionRecord {
        strike,
        side,
        open_interest,
        bid: raw.bid.filter(|v| v.is_finite()),
        ask: raw.ask.filter(|v| v.is_finite()),
        last_price: raw.last.filter(|v| v.is_finite()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partitions_by_side() {
        let (table, diag) = OptionTable::new(vec![
            OptionRecord::call(100.0, 10.0),
            OptionRecord::put(95.0, 20.0),
            OptionRecord::call(105.0, 5.0),
        ]);
        assert!(diag.is_clean());
        assert_eq!(table.calls().count(), 2);
        assert_eq!(table.puts().count(), 1);
        assert_eq!(table.total_open_interest(OptionSide::Call), 15.0);
    }

    #[test]
    fn test_invalid_rows_are_dropped_and_counted() {
        let (table, diag) = OptionTable::new(vec![
            OptionRecord::call(0.0, 10.0),
            OptionRecord::call(100.0, -1.0),
            OptionRecord::put(f64::NAN, 1.0),
            OptionRecord::put(95.0, 20.0),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(diag.skipped.len(), 3);
        assert_eq!(diag.skipped[0].row, 1);
        assert_eq!(diag.skipped[1].row, 2);
        assert_eq!(table.source_row(0), 4);
    }

    #[test]
    fn test_try_new_fails_on_first_bad_record() {
        let err = OptionTable::try_new(vec![
            OptionRecord::call(100.0, 10.0),
            OptionRecord::put(-5.0, 1.0),
        ])
        .unwrap_err();
        assert_eq!(err, DataError::InvalidStrike { row: 2, value: -5.0 });
    }

    #[test]
    fn test_from_raw_reports_missing_and_bad_side() {
        let rows = vec![
            RawOption {
                strike: Some(100.0),
                side: Some("CALL".into()),
                open_interest: Some(10.0),
                ..Default::default()
            },
            RawOption {
                strike: None,
                side: Some("put".into()),
                open_interest: Some(10.0),
                ..Default::default()
            },
            RawOption {
                strike: Some(100.0),
                side: Some("future".into()),
                open_interest: Some(10.0),
                ..Default::default()
            },
        ];
        let (table, diag) = OptionTable::from_raw(rows);
        assert_eq!(table.len(), 1);
        assert_eq!(diag.skipped.len(), 2);
        assert!(diag.skipped[0].reason.contains("strike"));
        assert!(diag.skipped[1].reason.contains("future"));
    }
}

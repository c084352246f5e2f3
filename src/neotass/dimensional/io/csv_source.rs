use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::neotass::dimensional::error::Result;
use crate::neotass::dimensional::model::{RawTable, ScalarValue, SourceKind};

/// Reads a CSV ledger with a header row into a raw table.
pub fn read_source(path: &Path, source: SourceKind) -> Result<RawTable> {
    parse_source(File::open(path)?, source)
}

/// Parses CSV content. Values are trimmed, blank values become nulls and fully
/// blank lines are skipped.
pub fn parse_source<R: Read>(reader: R, source: SourceKind) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cells: Vec<ScalarValue> = record
            .iter()
            .map(|value| {
                let value = value.trim();
                if value.is_empty() {
                    ScalarValue::Null
                } else {
                    ScalarValue::String(value.to_string())
                }
            })
            .collect();

        if cells.iter().all(ScalarValue::is_blank) {
            continue;
        }
        rows.push(cells);
    }

    Ok(RawTable::from_rows(source, headers, rows))
}

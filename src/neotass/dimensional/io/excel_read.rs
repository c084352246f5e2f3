use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::neotass::dimensional::error::{EtlError, Result};
use crate::neotass::dimensional::model::{RawTable, ScalarValue, SourceKind};

/// Header labels and data rows of one worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetContents {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<ScalarValue>>,
}

/// Reads the first worksheet of an XLSX ledger as a raw table.
pub fn read_source(path: &Path, source: SourceKind) -> Result<RawTable> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| EtlError::InvalidSource {
            source_kind: source,
            message: "workbook has no worksheets".into(),
        })?;
    let range = read_required_sheet(&mut workbook, &first)?;
    let contents = sheet_contents(&range);
    Ok(RawTable::from_rows(source, contents.headers, contents.rows))
}

/// Reads a named worksheet, e.g. one written by
/// [`excel_write`](crate::io::excel_write).
pub fn read_sheet(path: &Path, name: &str) -> Result<SheetContents> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = read_required_sheet(&mut workbook, name)?;
    Ok(sheet_contents(&range))
}

/// Lists the worksheet names of a workbook in order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    let workbook: Xlsx<_> = open_workbook(path)?;
    Ok(workbook.sheet_names().to_vec())
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| EtlError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(EtlError::from)?;
    Ok(range)
}

fn sheet_contents(range: &Range<DataType>) -> SheetContents {
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(first_row) => first_row
            .iter()
            .map(|cell| cell_to_scalar(cell).to_text())
            .collect(),
        None => Vec::new(),
    };

    let rows = rows
        .map(|row| row.iter().map(cell_to_scalar).collect::<Vec<_>>())
        .filter(|cells| !cells.iter().all(ScalarValue::is_blank))
        .collect();

    SheetContents { headers, rows }
}

fn cell_to_scalar(cell: &DataType) -> ScalarValue {
    match cell {
        DataType::String(value) => ScalarValue::String(value.clone()),
        DataType::Float(value) => ScalarValue::Number(*value),
        DataType::Int(value) => ScalarValue::Number(*value as f64),
        DataType::Bool(value) => ScalarValue::Boolean(*value),
        DataType::DateTime(serial) => excel_serial_to_datetime(*serial)
            .map(ScalarValue::DateTime)
            .unwrap_or(ScalarValue::Number(*serial)),
        DataType::Empty => ScalarValue::Null,
        other => ScalarValue::String(other.to_string()),
    }
}

// Excel serials count days from 1899-12-30 in the 1900 date system.
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excel_serials_map_to_calendar_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .expect("valid timestamp");
        assert_eq!(excel_serial_to_datetime(45296.5), Some(expected));
    }
}

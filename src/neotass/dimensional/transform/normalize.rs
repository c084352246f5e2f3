//! Cell normalization shared by the dimension builder and the fact resolver.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::neotass::dimensional::error::{EtlError, Result};
use crate::neotass::dimensional::model::{RawRow, ScalarValue, SourceKind};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// A resolved source column: where to read and how to name it in errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub source: SourceKind,
    pub index: usize,
    pub header: String,
}

impl Field {
    fn invalid(&self, row: &RawRow, reason: &'static str) -> EtlError {
        EtlError::InvalidValue {
            source_kind: self.source,
            row: row.id,
            column: self.header.clone(),
            value: row.cell(self.index).to_text(),
            reason,
        }
    }

    /// Required text cell, trimmed.
    pub fn text(&self, row: &RawRow) -> Result<String> {
        self.optional_text(row)
            .ok_or_else(|| self.invalid(row, "a value is required"))
    }

    /// Text cell, `None` when blank.
    pub fn optional_text(&self, row: &RawRow) -> Option<String> {
        let cell = row.cell(self.index);
        if cell.is_blank() {
            None
        } else {
            Some(cell.to_text())
        }
    }

    /// Numeric cell, `None` when blank.
    pub fn number(&self, row: &RawRow) -> Result<Option<f64>> {
        match row.cell(self.index) {
            cell if cell.is_blank() => Ok(None),
            ScalarValue::Number(value) => Ok(Some(*value)),
            ScalarValue::String(value) => parse_decimal(value)
                .map(Some)
                .ok_or_else(|| self.invalid(row, "expected a number")),
            _ => Err(self.invalid(row, "expected a number")),
        }
    }

    /// Required timestamp cell.
    pub fn timestamp(&self, row: &RawRow) -> Result<NaiveDateTime> {
        match row.cell(self.index) {
            cell if cell.is_blank() => Err(self.invalid(row, "a date is required")),
            ScalarValue::DateTime(value) => Ok(*value),
            ScalarValue::Number(millis) => DateTime::from_timestamp_millis(*millis as i64)
                .map(|value| value.naive_utc())
                .ok_or_else(|| self.invalid(row, "epoch milliseconds out of range")),
            ScalarValue::String(value) => {
                parse_timestamp(value).ok_or_else(|| self.invalid(row, "unrecognized date format"))
            }
            ScalarValue::Boolean(_) | ScalarValue::Null => {
                Err(self.invalid(row, "unrecognized date format"))
            }
        }
    }
}

/// Parses the textual timestamp forms found in the extracts. Offsets are
/// dropped after conversion so the wall-clock date of the record is kept.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Some(value.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(value);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Parses a decimal, accepting a comma separator when no dot is present.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    raw.parse::<f64>().ok().or_else(|| {
        if raw.contains('.') {
            None
        } else {
            raw.replace(',', ".").parse::<f64>().ok()
        }
    })
}

/// Uppercases the first character and lowercases the rest.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

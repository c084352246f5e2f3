use std::path::PathBuf;

use thiserror::Error;

use crate::neotass::dimensional::model::SourceKind;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, EtlError>;

/// Error type covering the different failure cases that can occur when the
/// pipeline extracts, transforms, or loads data.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when a CSV ledger cannot be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the configuration file is not valid TOML for the schema.
    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Raised when configuration values are semantically invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Raised when a source document does not have the expected shape.
    #[error("invalid {source_kind} source: {message}")]
    InvalidSource {
        source_kind: SourceKind,
        message: String,
    },

    /// Raised when a sheet does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a source file extension is not one the extractor reads.
    #[error("unsupported source format '{0}' (expected csv, xlsx or xlsm)")]
    UnsupportedFormat(String),

    /// Raised when one or both raw sources could not be extracted.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// Raised when a mapped column label matches no header of the source.
    #[error("missing column in {source_kind} source: field '{field}' expects a header matching '{label}'")]
    MissingColumn {
        source_kind: SourceKind,
        field: &'static str,
        label: String,
    },

    /// Raised when a mapped column label matches several headers.
    #[error("ambiguous column in {source_kind} source: label '{label}' matches {candidates:?}")]
    AmbiguousColumn {
        source_kind: SourceKind,
        label: String,
        candidates: Vec<String>,
    },

    /// Raised when a cell cannot be interpreted for its canonical field.
    #[error("invalid value '{value}' in {source_kind} row {row} column '{column}': {reason}")]
    InvalidValue {
        source_kind: SourceKind,
        row: u32,
        column: String,
        value: String,
        reason: &'static str,
    },

    /// Raised when the workbook could not be written.
    #[error("failed to write workbook {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl EtlError {
    /// Returns `true` for failures caused by source columns that do not match
    /// the configured mapping.
    pub fn is_column_mismatch(&self) -> bool {
        matches!(
            self,
            EtlError::MissingColumn { .. } | EtlError::AmbiguousColumn { .. }
        )
    }
}

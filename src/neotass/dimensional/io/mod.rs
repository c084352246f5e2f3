//! Extraction of the raw sources and persistence of the workbook.

pub mod csv_source;
pub mod excel_read;
pub mod excel_write;
pub mod json_source;

use std::path::Path;

use tracing::{info, instrument};

use crate::neotass::dimensional::error::{EtlError, Result};
use crate::neotass::dimensional::model::{RawTable, SourceKind};

/// Reads the opportunity registry (JSON).
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn read_opportunities(path: &Path) -> Result<RawTable> {
    ensure_exists(path)?;
    let table = json_source::read_records(path, SourceKind::Opportunities)?;
    info!(rows = table.len(), columns = table.headers.len(), "opportunity registry read");
    Ok(table)
}

/// Reads the sell-out ledger, choosing CSV or XLSX by file extension.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn read_sellout(path: &Path) -> Result<RawTable> {
    ensure_exists(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    let table = match extension.as_str() {
        "csv" => csv_source::read_source(path, SourceKind::Sellout)?,
        "xlsx" | "xlsm" => excel_read::read_source(path, SourceKind::Sellout)?,
        other => return Err(EtlError::UnsupportedFormat(other.to_string())),
    };
    info!(rows = table.len(), columns = table.headers.len(), "sellout ledger read");
    Ok(table)
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(EtlError::MissingInput(path.to_path_buf()))
    }
}

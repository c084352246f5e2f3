use std::fs;
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use tracing::debug;

use crate::neotass::dimensional::error::Result;
use crate::neotass::dimensional::tabulate::{CellValue, SheetTable, WorkbookData};

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Writes the provided workbook data to the given path, one sheet per table.
/// Missing parent directories are created.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let date_format = Format::new().set_num_format(DATE_FORMAT);
    let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);
    let mut workbook_writer = Workbook::new();

    for table in &workbook.tables {
        debug!(sheet = %table.sheet_name, rows = table.rows.len(), "writing sheet");
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, header)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let (row, col) = ((row_idx + 1) as u32, col_idx as u16);
                match cell {
                    CellValue::Text(value) => {
                        worksheet.write_string(row, col, value)?;
                    }
                    CellValue::Number(value) => {
                        worksheet.write_number(row, col, *value)?;
                    }
                    CellValue::Date(value) => {
                        worksheet.write_datetime_with_format(
                            row,
                            col,
                            &excel_date(*value)?,
                            &date_format,
                        )?;
                    }
                    CellValue::DateTime(value) => {
                        worksheet.write_datetime_with_format(
                            row,
                            col,
                            &excel_datetime(*value)?,
                            &datetime_format,
                        )?;
                    }
                    CellValue::Empty => {}
                }
            }
        }

        add_filter_table(worksheet, table)?;
        worksheet.autofit();
    }

    workbook_writer.save(path)?;
    Ok(())
}

// Excel tables need at least one data row below the header.
fn add_filter_table(worksheet: &mut Worksheet, table: &SheetTable) -> Result<()> {
    if table.rows.is_empty() || table.columns.is_empty() {
        return Ok(());
    }
    let mut excel_table = rust_xlsxwriter::Table::new();
    excel_table.set_autofilter(true);
    let col_end = (table.columns.len() as u16).saturating_sub(1);
    let row_end = table.rows.len() as u32;
    worksheet.add_table(0, 0, row_end, col_end, &excel_table)?;
    Ok(())
}

fn excel_date(date: NaiveDate) -> Result<ExcelDateTime> {
    Ok(ExcelDateTime::from_ymd(
        date.year() as u16,
        date.month() as u8,
        date.day() as u8,
    )?)
}

fn excel_datetime(value: NaiveDateTime) -> Result<ExcelDateTime> {
    let seconds = f64::from(value.second()) + f64::from(value.nanosecond()) / 1e9;
    Ok(excel_date(value.date())?.and_hms(value.hour() as u16, value.minute() as u8, seconds)?)
}

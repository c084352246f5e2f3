use chrono::NaiveDateTime;

use crate::neotass::dimensional::config::{OpportunityColumns, SelloutColumns};
use crate::neotass::dimensional::error::Result;
use crate::neotass::dimensional::model::{RawTable, RowId};
use crate::neotass::dimensional::transform::columns::{OpportunityLayout, SelloutLayout};

/// One opportunity registration with its fields in canonical form.
#[derive(Debug, Clone, PartialEq)]
pub struct OpportunityRecord {
    pub row_id: RowId,
    pub tax_id: String,
    pub partner_name: Option<String>,
    pub product: String,
    pub registered_at: NaiveDateTime,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub status: Option<String>,
}

/// One sell-out invoice line with its fields in canonical form.
#[derive(Debug, Clone, PartialEq)]
pub struct SelloutRecord {
    pub row_id: RowId,
    pub tax_id: String,
    pub partner_name: Option<String>,
    pub product: String,
    pub invoiced_at: NaiveDateTime,
    pub invoice_number: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
}

pub fn opportunities(table: &RawTable, columns: &OpportunityColumns) -> Result<Vec<OpportunityRecord>> {
    let layout = OpportunityLayout::resolve(table, columns)?;
    table
        .rows
        .iter()
        .map(|row| {
            Ok(OpportunityRecord {
                row_id: row.id,
                tax_id: layout.tax_id.text(row)?,
                partner_name: layout.partner_name.optional_text(row),
                product: layout.product.text(row)?,
                registered_at: layout.registered_at.timestamp(row)?,
                quantity: layout.quantity.number(row)?,
                unit_price: layout.unit_price.number(row)?,
                status: layout.status.optional_text(row),
            })
        })
        .collect()
}

pub fn sellout(table: &RawTable, columns: &SelloutColumns) -> Result<Vec<SelloutRecord>> {
    let layout = SelloutLayout::resolve(table, columns)?;
    table
        .rows
        .iter()
        .map(|row| {
            Ok(SelloutRecord {
                row_id: row.id,
                tax_id: layout.tax_id.text(row)?,
                partner_name: layout.partner_name.optional_text(row),
                product: layout.product.text(row)?,
                invoiced_at: layout.invoiced_at.timestamp(row)?,
                invoice_number: layout.invoice_number.optional_text(row),
                quantity: layout.quantity.number(row)?,
                unit_price: layout.unit_price.number(row)?,
            })
        })
        .collect()
}

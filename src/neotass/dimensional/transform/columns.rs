use tracing::debug;

use crate::neotass::dimensional::config::{OpportunityColumns, SelloutColumns};
use crate::neotass::dimensional::error::{EtlError, Result};
use crate::neotass::dimensional::model::RawTable;
use crate::neotass::dimensional::transform::normalize::Field;

/// Resolves configured labels against the headers of one raw table.
pub struct ColumnResolver<'a> {
    table: &'a RawTable,
}

impl<'a> ColumnResolver<'a> {
    pub fn new(table: &'a RawTable) -> Self {
        Self { table }
    }

    /// Finds the header for `label`. A case-insensitive exact match wins; a
    /// single header containing the label is accepted otherwise.
    pub fn resolve(&self, field: &'static str, label: &str) -> Result<Field> {
        let wanted = label.trim().to_lowercase();
        let normalized: Vec<String> = self
            .table
            .headers
            .iter()
            .map(|header| header.trim().to_lowercase())
            .collect();

        let exact: Vec<usize> = positions(&normalized, |header| *header == wanted);
        let candidates = if exact.is_empty() {
            positions(&normalized, |header| header.contains(&wanted))
        } else {
            exact
        };

        match candidates.as_slice() {
            [index] => {
                let header = self.table.headers[*index].clone();
                debug!(source = %self.table.source, field, label, %header, "resolved column");
                Ok(Field {
                    source: self.table.source,
                    index: *index,
                    header,
                })
            }
            [] => Err(EtlError::MissingColumn {
                source_kind: self.table.source,
                field,
                label: label.to_string(),
            }),
            several => Err(EtlError::AmbiguousColumn {
                source_kind: self.table.source,
                label: label.to_string(),
                candidates: several
                    .iter()
                    .map(|index| self.table.headers[*index].clone())
                    .collect(),
            }),
        }
    }
}

fn positions(headers: &[String], predicate: impl Fn(&String) -> bool) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .filter(|(_, header)| predicate(header))
        .map(|(index, _)| index)
        .collect()
}

/// Resolved columns of the opportunity registry.
#[derive(Debug, Clone)]
pub struct OpportunityLayout {
    pub tax_id: Field,
    pub partner_name: Field,
    pub product: Field,
    pub registered_at: Field,
    pub quantity: Field,
    pub unit_price: Field,
    pub status: Field,
}

impl OpportunityLayout {
    pub fn resolve(table: &RawTable, columns: &OpportunityColumns) -> Result<Self> {
        let resolver = ColumnResolver::new(table);
        Ok(Self {
            tax_id: resolver.resolve("tax_id", &columns.tax_id)?,
            partner_name: resolver.resolve("partner_name", &columns.partner_name)?,
            product: resolver.resolve("product", &columns.product)?,
            registered_at: resolver.resolve("registered_at", &columns.registered_at)?,
            quantity: resolver.resolve("quantity", &columns.quantity)?,
            unit_price: resolver.resolve("unit_price", &columns.unit_price)?,
            status: resolver.resolve("status", &columns.status)?,
        })
    }
}

/// Resolved columns of the sell-out ledger.
#[derive(Debug, Clone)]
pub struct SelloutLayout {
    pub tax_id: Field,
    pub partner_name: Field,
    pub product: Field,
    pub invoiced_at: Field,
    pub invoice_number: Field,
    pub quantity: Field,
    pub unit_price: Field,
}

impl SelloutLayout {
    pub fn resolve(table: &RawTable, columns: &SelloutColumns) -> Result<Self> {
        let resolver = ColumnResolver::new(table);
        Ok(Self {
            tax_id: resolver.resolve("tax_id", &columns.tax_id)?,
            partner_name: resolver.resolve("partner_name", &columns.partner_name)?,
            product: resolver.resolve("product", &columns.product)?,
            invoiced_at: resolver.resolve("invoiced_at", &columns.invoiced_at)?,
            invoice_number: resolver.resolve("invoice_number", &columns.invoice_number)?,
            quantity: resolver.resolve("quantity", &columns.quantity)?,
            unit_price: resolver.resolve("unit_price", &columns.unit_price)?,
        })
    }
}

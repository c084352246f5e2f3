use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{instrument, warn};

use crate::neotass::dimensional::model::{OpportunityFact, SelloutFact, TimeKey, TimeRow};
use crate::neotass::dimensional::transform::canonical::{OpportunityRecord, SelloutRecord};

/// Date-only lookup of time dimension keys.
#[derive(Debug, Clone, Default)]
pub struct TimeIndex {
    keys: HashMap<NaiveDate, TimeKey>,
}

impl TimeIndex {
    pub fn new(rows: &[TimeRow]) -> Self {
        Self {
            keys: rows.iter().map(|row| (row.data, row.id_tempo)).collect(),
        }
    }

    /// Key of the row whose date equals `at` without its time of day.
    pub fn resolve(&self, at: NaiveDateTime) -> Option<TimeKey> {
        self.keys.get(&at.date()).copied()
    }
}

fn total(quantity: Option<f64>, unit_price: Option<f64>) -> Option<f64> {
    Some(quantity? * unit_price?)
}

/// Builds `fato_registro_oportunidade`. Rows whose date has no time
/// dimension entry are kept with a null `id_tempo`.
#[instrument(level = "debug", skip_all)]
pub fn build_opportunity_facts(
    records: &[OpportunityRecord],
    time: &TimeIndex,
) -> Vec<OpportunityFact> {
    let facts: Vec<OpportunityFact> = records
        .iter()
        .map(|record| OpportunityFact {
            id_oportunidade: record.row_id,
            id_parceiro: record.tax_id.clone(),
            id_produto: record.product.clone(),
            id_tempo: time.resolve(record.registered_at),
            data_registro: record.registered_at,
            quantidade: record.quantity,
            valor_total: total(record.quantity, record.unit_price),
            status: record.status.clone(),
        })
        .collect();

    let unresolved = facts.iter().filter(|fact| fact.id_tempo.is_none()).count();
    if unresolved > 0 {
        warn!(unresolved, "opportunity rows without a time dimension entry");
    }
    facts
}

/// Builds `fato_sellout` with the same measure and date rules.
#[instrument(level = "debug", skip_all)]
pub fn build_sellout_facts(records: &[SelloutRecord], time: &TimeIndex) -> Vec<SelloutFact> {
    let facts: Vec<SelloutFact> = records
        .iter()
        .map(|record| SelloutFact {
            id_sellout: record.row_id,
            id_parceiro: record.tax_id.clone(),
            id_produto: record.product.clone(),
            id_tempo: time.resolve(record.invoiced_at),
            data_fatura: record.invoiced_at,
            nf: record.invoice_number.clone(),
            quantidade: record.quantity,
            valor_total: total(record.quantity, record.unit_price),
        })
        .collect();

    let unresolved = facts.iter().filter(|fact| fact.id_tempo.is_none()).count();
    if unresolved > 0 {
        warn!(unresolved, "sellout rows without a time dimension entry");
    }
    facts
}

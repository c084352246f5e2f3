use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, instrument, warn};

use crate::neotass::dimensional::model::{PartnerRow, ProductRow, TimeKey, TimeRow};
use crate::neotass::dimensional::transform::calendar::CalendarNames;
use crate::neotass::dimensional::transform::canonical::{OpportunityRecord, SelloutRecord};

/// Consolidates partners from both sources. Opportunity rows come first in
/// union order, and the first display name seen for a tax id is kept.
#[instrument(level = "debug", skip_all)]
pub fn build_partner_dimension(
    opportunities: &[OpportunityRecord],
    sellout: &[SelloutRecord],
) -> Vec<PartnerRow> {
    let projected = opportunities
        .iter()
        .map(|record| (&record.tax_id, &record.partner_name))
        .chain(sellout.iter().map(|record| (&record.tax_id, &record.partner_name)));

    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for (tax_id, name) in projected {
        if seen.insert(tax_id.as_str()) {
            rows.push(PartnerRow {
                id_parceiro: tax_id.clone(),
                nome_parceiro: name.clone(),
            });
        }
    }

    debug!(partner_count = rows.len(), "partner dimension built");
    rows
}

/// Builds the degenerate product dimension: one row per distinct product
/// name, sorted ascending, key equal to the name.
#[instrument(level = "debug", skip_all)]
pub fn build_product_dimension(
    opportunities: &[OpportunityRecord],
    sellout: &[SelloutRecord],
) -> Vec<ProductRow> {
    let names: BTreeSet<&str> = opportunities
        .iter()
        .map(|record| record.product.as_str())
        .chain(sellout.iter().map(|record| record.product.as_str()))
        .collect();

    warn_case_variants(&names);

    names
        .into_iter()
        .map(|name| ProductRow {
            id_produto: name.to_string(),
            descricao_produto: name.to_string(),
        })
        .collect()
}

// Names differing only in capitalization stay distinct rows.
fn warn_case_variants(names: &BTreeSet<&str>) {
    let mut by_folded: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for name in names {
        by_folded.entry(name.to_lowercase()).or_default().push(name);
    }
    for variants in by_folded.values().filter(|variants| variants.len() > 1) {
        warn!(?variants, "product names differ only by capitalization; kept as distinct rows");
    }
}

/// Builds the time dimension from the event dates of both sources.
///
/// Dates are deduplicated and sorted before keys are assigned, so `id_tempo`
/// increases with `data` and starts at 1.
#[instrument(level = "debug", skip_all)]
pub fn build_time_dimension(
    opportunities: &[OpportunityRecord],
    sellout: &[SelloutRecord],
    names: &CalendarNames,
) -> Vec<TimeRow> {
    let dates: BTreeSet<NaiveDate> = opportunities
        .iter()
        .map(|record| record.registered_at.date())
        .chain(sellout.iter().map(|record| record.invoiced_at.date()))
        .collect();

    let rows: Vec<TimeRow> = dates
        .into_iter()
        .enumerate()
        .map(|(index, date)| TimeRow {
            id_tempo: index as TimeKey + 1,
            data: date,
            ano: date.year(),
            mes: date.month(),
            nome_mes: names.month_name(date),
            dia_semana: names.weekday_name(date),
        })
        .collect();

    debug!(date_count = rows.len(), "time dimension built");
    rows
}

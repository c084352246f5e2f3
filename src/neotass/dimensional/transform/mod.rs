//! Builds the star schema from the two extracted relations.
//!
//! Columns are resolved and cells normalized first ([`canonical`]), then the
//! dimensions are derived ([`dimensions`]) and finally the facts are resolved
//! against the finished time dimension ([`facts`]).

pub mod calendar;
pub mod canonical;
pub mod columns;
pub mod dimensions;
pub mod facts;
pub mod normalize;

use tracing::{info, instrument};

use crate::neotass::dimensional::config::SourceMapping;
use crate::neotass::dimensional::error::Result;
use crate::neotass::dimensional::model::{RawTable, StarSchema};

use calendar::CalendarNames;
use facts::TimeIndex;

#[instrument(
    level = "info",
    skip_all,
    fields(opportunity_rows = opportunities.len(), sellout_rows = sellout.len())
)]
pub fn transform(
    opportunities: &RawTable,
    sellout: &RawTable,
    mapping: &SourceMapping,
    calendar: &CalendarNames,
) -> Result<StarSchema> {
    let opportunity_records = canonical::opportunities(opportunities, &mapping.opportunities)?;
    let sellout_records = canonical::sellout(sellout, &mapping.sellout)?;

    let dim_parceiro = dimensions::build_partner_dimension(&opportunity_records, &sellout_records);
    info!(rows = dim_parceiro.len(), "dimension dim_parceiro built");
    let dim_produto = dimensions::build_product_dimension(&opportunity_records, &sellout_records);
    info!(rows = dim_produto.len(), "dimension dim_produto built");
    let dim_tempo =
        dimensions::build_time_dimension(&opportunity_records, &sellout_records, calendar);
    info!(rows = dim_tempo.len(), "dimension dim_tempo built");

    let time_index = TimeIndex::new(&dim_tempo);
    let fato_registro_oportunidade = facts::build_opportunity_facts(&opportunity_records, &time_index);
    info!(
        rows = fato_registro_oportunidade.len(),
        "fact fato_registro_oportunidade built"
    );
    let fato_sellout = facts::build_sellout_facts(&sellout_records, &time_index);
    info!(rows = fato_sellout.len(), "fact fato_sellout built");

    Ok(StarSchema {
        dim_parceiro,
        dim_produto,
        dim_tempo,
        fato_registro_oportunidade,
        fato_sellout,
    })
}

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};
use neotass_dimensional::config::SourceMapping;
use neotass_dimensional::io::{csv_source, json_source};
use neotass_dimensional::model::{RawTable, SourceKind, StarSchema};
use neotass_dimensional::transform::calendar::CalendarNames;
use neotass_dimensional::transform::canonical::OpportunityRecord;
use neotass_dimensional::transform::facts::{TimeIndex, build_opportunity_facts};
use neotass_dimensional::transform::{dimensions, transform};
use neotass_dimensional::EtlError;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, 0).expect("valid time")
}

fn opportunities(document: serde_json::Value) -> RawTable {
    json_source::parse_records(&document, SourceKind::Opportunities).expect("opportunities parsed")
}

fn sellout(content: &str) -> RawTable {
    csv_source::parse_source(content.as_bytes(), SourceKind::Sellout).expect("sellout parsed")
}

fn build(opportunities: &RawTable, sellout: &RawTable) -> StarSchema {
    transform(
        opportunities,
        sellout,
        &SourceMapping::default(),
        &CalendarNames::default(),
    )
    .expect("transform succeeds")
}

fn single_row_sources() -> (RawTable, RawTable) {
    let opportunities = opportunities(serde_json::json!([{
        "CNPJ Parceiro": "11.111.111/0001-11",
        "Nome Fantasia": "Acme",
        "Nome Produto": "Widget",
        "quantidade": 2,
        "Valor Unitário": 10.00,
        "Data de Registro": "2024-01-05",
        "status": "Won"
    }]));
    let sellout = sellout(
        "CNpj Parceiro,Nome Fantasia,Nome_Produto,Quantidade,Valor_Unitario,Data_Fatura,NF\n\
         11.111.111/0001-11,Acme,Widget,3,9.00,2024-01-06,NF-001\n",
    );
    (opportunities, sellout)
}

fn busy_sources() -> (RawTable, RawTable) {
    let opportunities = opportunities(serde_json::json!([
        {
            "CNPJ Parceiro": "22.222.222/0001-22",
            "Nome Fantasia": "Beta Distribuidora",
            "Nome Produto": "Gadget",
            "quantidade": 4,
            "Valor Unitário": 12.5,
            "Data de Registro": "2024-03-10 17:45:00",
            "status": "Open"
        },
        {
            "CNPJ Parceiro": "11.111.111/0001-11",
            "Nome Fantasia": "Acme",
            "Nome Produto": "Widget",
            "quantidade": 1,
            "Valor Unitário": 99.9,
            "Data de Registro": "2024-01-05T08:00:00",
            "status": "Won"
        },
        {
            "CNPJ Parceiro": "22.222.222/0001-22",
            "Nome Fantasia": "Beta",
            "Nome Produto": "Widget",
            "quantidade": 7,
            "Valor Unitário": 3.25,
            "Data de Registro": "2024-03-10 09:00:00",
            "status": "Lost"
        }
    ]));
    let sellout = sellout(
        "CNpj Parceiro,Nome Fantasia,Nome_Produto,Quantidade,Valor_Unitario,Data_Fatura,NF\n\
         33.333.333/0001-33,Gama,gadget,10,2.5,2024-02-01 10:00:00,NF-100\n\
         22.222.222/0001-22,Beta Sellout,Gadget,2,12.5,2024-03-10 23:59:59,NF-101\n\
         11.111.111/0001-11,Acme,Widget,5,8,05/01/2024,NF-102\n",
    );
    (opportunities, sellout)
}

#[test]
fn single_rows_build_the_documented_model() {
    let (opportunities, sellout) = single_row_sources();
    let star = build(&opportunities, &sellout);

    assert_eq!(star.dim_parceiro.len(), 1);
    assert_eq!(star.dim_parceiro[0].id_parceiro, "11.111.111/0001-11");
    assert_eq!(star.dim_parceiro[0].nome_parceiro.as_deref(), Some("Acme"));

    assert_eq!(star.dim_produto.len(), 1);
    assert_eq!(star.dim_produto[0].id_produto, "Widget");
    assert_eq!(star.dim_produto[0].descricao_produto, "Widget");

    assert_eq!(star.dim_tempo.len(), 2);
    assert_eq!(star.dim_tempo[0].id_tempo, 1);
    assert_eq!(star.dim_tempo[0].data, date(2024, 1, 5));
    assert_eq!(star.dim_tempo[1].id_tempo, 2);
    assert_eq!(star.dim_tempo[1].data, date(2024, 1, 6));
    assert_eq!(star.dim_tempo[0].ano, 2024);
    assert_eq!(star.dim_tempo[0].mes, 1);
    assert_eq!(star.dim_tempo[0].nome_mes, "Janeiro");

    let opportunity = &star.fato_registro_oportunidade[0];
    assert_eq!(opportunity.id_oportunidade, 1);
    assert_eq!(opportunity.id_tempo, Some(1));
    assert_eq!(opportunity.valor_total, Some(20.0));
    assert_eq!(opportunity.status.as_deref(), Some("Won"));

    let sale = &star.fato_sellout[0];
    assert_eq!(sale.id_sellout, 1);
    assert_eq!(sale.id_tempo, Some(2));
    assert_eq!(sale.valor_total, Some(27.0));
    assert_eq!(sale.nf.as_deref(), Some("NF-001"));
}

#[test]
fn dimension_keys_are_unique() {
    let (opportunities, sellout) = busy_sources();
    let star = build(&opportunities, &sellout);

    let partners: HashSet<_> = star.dim_parceiro.iter().map(|row| &row.id_parceiro).collect();
    assert_eq!(partners.len(), star.dim_parceiro.len());
    let products: HashSet<_> = star.dim_produto.iter().map(|row| &row.id_produto).collect();
    assert_eq!(products.len(), star.dim_produto.len());
    let times: HashSet<_> = star.dim_tempo.iter().map(|row| row.id_tempo).collect();
    assert_eq!(times.len(), star.dim_tempo.len());
    let dates: HashSet<_> = star.dim_tempo.iter().map(|row| row.data).collect();
    assert_eq!(dates.len(), star.dim_tempo.len());
}

#[test]
fn time_keys_increase_with_date() {
    let (opportunities, sellout) = busy_sources();
    let star = build(&opportunities, &sellout);

    let observed: Vec<(u32, NaiveDate)> = star
        .dim_tempo
        .iter()
        .map(|row| (row.id_tempo, row.data))
        .collect();
    assert_eq!(
        observed,
        vec![
            (1, date(2024, 1, 5)),
            (2, date(2024, 2, 1)),
            (3, date(2024, 3, 10)),
        ]
    );
}

#[test]
fn measures_multiply_quantity_by_unit_price() {
    let (opportunities, sellout) = busy_sources();
    let star = build(&opportunities, &sellout);

    let opportunity_totals: Vec<Option<f64>> = star
        .fato_registro_oportunidade
        .iter()
        .map(|fact| fact.valor_total)
        .collect();
    assert_eq!(opportunity_totals, vec![Some(50.0), Some(99.9), Some(22.75)]);

    let sellout_totals: Vec<Option<f64>> =
        star.fato_sellout.iter().map(|fact| fact.valor_total).collect();
    assert_eq!(sellout_totals, vec![Some(25.0), Some(25.0), Some(40.0)]);
}

#[test]
fn fact_time_keys_reference_the_event_date() {
    let (opportunities, sellout) = busy_sources();
    let star = build(&opportunities, &sellout);
    let dates: HashMap<u32, NaiveDate> = star
        .dim_tempo
        .iter()
        .map(|row| (row.id_tempo, row.data))
        .collect();

    for fact in &star.fato_registro_oportunidade {
        let key = fact.id_tempo.expect("opportunity date resolved");
        assert_eq!(dates[&key], fact.data_registro.date());
    }
    for fact in &star.fato_sellout {
        let key = fact.id_tempo.expect("sellout date resolved");
        assert_eq!(dates[&key], fact.data_fatura.date());
    }

    // Late-evening and morning events on 2024-03-10 share one key.
    assert_eq!(star.fato_registro_oportunidade[0].id_tempo, Some(3));
    assert_eq!(star.fato_registro_oportunidade[2].id_tempo, Some(3));
    assert_eq!(star.fato_sellout[1].id_tempo, Some(3));
}

#[test]
fn partner_keeps_first_display_name_in_union_order() {
    let (opportunities, sellout) = busy_sources();
    let star = build(&opportunities, &sellout);

    let partners: Vec<(&str, Option<&str>)> = star
        .dim_parceiro
        .iter()
        .map(|row| (row.id_parceiro.as_str(), row.nome_parceiro.as_deref()))
        .collect();
    assert_eq!(
        partners,
        vec![
            ("22.222.222/0001-22", Some("Beta Distribuidora")),
            ("11.111.111/0001-11", Some("Acme")),
            ("33.333.333/0001-33", Some("Gama")),
        ]
    );

    let known: HashSet<&str> = partners.iter().map(|(key, _)| *key).collect();
    assert!(star
        .fato_sellout
        .iter()
        .all(|fact| known.contains(fact.id_parceiro.as_str())));
}

#[test]
fn products_are_sorted_and_case_variants_stay_distinct() {
    let (opportunities, sellout) = busy_sources();
    let star = build(&opportunities, &sellout);

    let products: Vec<&str> = star
        .dim_produto
        .iter()
        .map(|row| row.id_produto.as_str())
        .collect();
    assert_eq!(products, vec!["Gadget", "Widget", "gadget"]);
    assert!(star
        .dim_produto
        .iter()
        .all(|row| row.id_produto == row.descricao_produto));
}

#[test]
fn transform_is_idempotent() {
    let (opportunities, sellout) = busy_sources();
    assert_eq!(build(&opportunities, &sellout), build(&opportunities, &sellout));
}

#[test]
fn numeric_tax_ids_keep_their_digits() {
    let opportunities = opportunities(serde_json::json!([{
        "CNPJ Parceiro": 11111111000111u64,
        "Nome Fantasia": "Acme",
        "Nome Produto": "Widget",
        "quantidade": 1,
        "Valor Unitário": 1,
        "Data de Registro": "2024-01-05",
        "status": "Won"
    }]));
    let sellout = sellout(
        "CNPJ PARCEIRO,Nome Fantasia,Nome_Produto,Quantidade,Valor_Unitario,Data_Fatura,NF\n\
         11111111000111,Acme,Widget,1,1,2024-01-05,NF-1\n",
    );
    let star = build(&opportunities, &sellout);

    assert_eq!(star.dim_parceiro.len(), 1);
    assert_eq!(star.dim_parceiro[0].id_parceiro, "11111111000111");
}

#[test]
fn blank_measures_give_null_totals() {
    let (opportunities, _) = single_row_sources();
    let sellout = sellout(
        "CNpj Parceiro,Nome Fantasia,Nome_Produto,Quantidade,Valor_Unitario,Data_Fatura,NF\n\
         11.111.111/0001-11,Acme,Widget,,9.00,2024-01-06,\n",
    );
    let star = build(&opportunities, &sellout);

    assert_eq!(star.fato_sellout[0].quantidade, None);
    assert_eq!(star.fato_sellout[0].valor_total, None);
    assert_eq!(star.fato_sellout[0].nf, None);
}

#[test]
fn missing_column_names_the_field() {
    let (opportunities, _) = single_row_sources();
    let sellout = sellout(
        "CNpj Parceiro,Nome Fantasia,Nome_Produto,Quantidade,Preco,Data_Fatura,NF\n\
         11.111.111/0001-11,Acme,Widget,3,9.00,2024-01-06,NF-001\n",
    );
    let error = transform(
        &opportunities,
        &sellout,
        &SourceMapping::default(),
        &CalendarNames::default(),
    )
    .expect_err("unit price column is missing");

    match error {
        EtlError::MissingColumn {
            source_kind,
            field,
            label,
        } => {
            assert_eq!(source_kind, SourceKind::Sellout);
            assert_eq!(field, "unit_price");
            assert_eq!(label, "Valor_Unitario");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unparseable_dates_are_invalid_values() {
    let (_, sellout) = single_row_sources();
    let opportunities = opportunities(serde_json::json!([{
        "CNPJ Parceiro": "11.111.111/0001-11",
        "Nome Fantasia": "Acme",
        "Nome Produto": "Widget",
        "quantidade": 2,
        "Valor Unitário": 10.0,
        "Data de Registro": "next tuesday",
        "status": "Won"
    }]));
    let error = transform(
        &opportunities,
        &sellout,
        &SourceMapping::default(),
        &CalendarNames::default(),
    )
    .expect_err("date cannot be parsed");

    assert!(matches!(error, EtlError::InvalidValue { row: 1, .. }));
}

#[test]
fn fact_without_time_row_keeps_a_null_time_key() {
    let known = OpportunityRecord {
        row_id: 1,
        tax_id: "11.111.111/0001-11".into(),
        partner_name: Some("Acme".into()),
        product: "Widget".into(),
        registered_at: at(2024, 1, 5, 10, 0),
        quantity: Some(2.0),
        unit_price: Some(10.0),
        status: Some("Won".into()),
    };
    let orphan = OpportunityRecord {
        row_id: 2,
        registered_at: at(2030, 12, 31, 23, 0),
        ..known.clone()
    };

    let time_rows =
        dimensions::build_time_dimension(std::slice::from_ref(&known), &[], &CalendarNames::default());
    let facts = build_opportunity_facts(&[known, orphan], &TimeIndex::new(&time_rows));

    assert_eq!(facts.len(), 2);
    assert_eq!(facts[0].id_tempo, Some(1));
    assert_eq!(facts[1].id_oportunidade, 2);
    assert_eq!(facts[1].id_tempo, None);
    assert_eq!(facts[1].valor_total, Some(20.0));
}

#[test]
fn explicit_name_tables_drive_calendar_columns() {
    let (opportunities, sellout) = single_row_sources();
    let months = [
        "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
    ]
    .iter()
    .map(|name| name.to_string())
    .collect();
    let weekdays = ["seg", "ter", "qua", "qui", "sex", "sab", "dom"]
        .iter()
        .map(|name| name.to_string())
        .collect();
    let names = CalendarNames::from_tables(months, weekdays).expect("valid tables");

    let star = transform(&opportunities, &sellout, &SourceMapping::default(), &names)
        .expect("transform succeeds");

    assert_eq!(star.dim_tempo[0].nome_mes, "Jan");
    assert_eq!(star.dim_tempo[0].dia_semana, "Sex");
    assert_eq!(star.dim_tempo[1].dia_semana, "Sab");
}

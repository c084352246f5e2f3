use chrono::{NaiveDate, NaiveDateTime};

use crate::neotass::dimensional::model::StarSchema;

pub const PARTNER_SHEET: &str = "dim_parceiro";
pub const PRODUCT_SHEET: &str = "dim_produto";
pub const TIME_SHEET: &str = "dim_tempo";
pub const OPPORTUNITY_SHEET: &str = "fato_registro_oportunidade";
pub const SELLOUT_SHEET: &str = "fato_sellout";

/// Sheet names in the order they are written.
pub const SHEET_ORDER: [&str; 5] = [
    PARTNER_SHEET,
    PRODUCT_SHEET,
    TIME_SHEET,
    OPPORTUNITY_SHEET,
    SELLOUT_SHEET,
];

/// A typed cell of an output sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Empty,
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetTable {
    fn new(sheet_name: &str, columns: &[&str]) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// Represents all tables required to materialise the Excel workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

impl WorkbookData {
    pub fn table(&self, sheet_name: &str) -> Option<&SheetTable> {
        self.tables.iter().find(|table| table.sheet_name == sheet_name)
    }
}

/// Lays the five relations out as sheets, one per relation, with the
/// documented column order and no row-index column.
pub fn build_workbook(schema: &StarSchema) -> WorkbookData {
    let mut partners = SheetTable::new(PARTNER_SHEET, &["id_parceiro", "nome_parceiro"]);
    partners.rows = schema
        .dim_parceiro
        .iter()
        .map(|row| vec![row.id_parceiro.clone().into(), row.nome_parceiro.clone().into()])
        .collect();

    let mut products = SheetTable::new(PRODUCT_SHEET, &["id_produto", "descricao_produto"]);
    products.rows = schema
        .dim_produto
        .iter()
        .map(|row| vec![row.id_produto.clone().into(), row.descricao_produto.clone().into()])
        .collect();

    let mut time = SheetTable::new(
        TIME_SHEET,
        &["id_tempo", "data", "ano", "mes", "nome_mes", "dia_semana"],
    );
    time.rows = schema
        .dim_tempo
        .iter()
        .map(|row| {
            vec![
                row.id_tempo.into(),
                row.data.into(),
                row.ano.into(),
                row.mes.into(),
                row.nome_mes.clone().into(),
                row.dia_semana.clone().into(),
            ]
        })
        .collect();

    let mut opportunities = SheetTable::new(
        OPPORTUNITY_SHEET,
        &[
            "id_oportunidade",
            "id_parceiro",
            "id_produto",
            "id_tempo",
            "data_registro",
            "quantidade",
            "valor_total",
            "status",
        ],
    );
    opportunities.rows = schema
        .fato_registro_oportunidade
        .iter()
        .map(|fact| {
            vec![
                fact.id_oportunidade.into(),
                fact.id_parceiro.clone().into(),
                fact.id_produto.clone().into(),
                fact.id_tempo.into(),
                fact.data_registro.into(),
                fact.quantidade.into(),
                fact.valor_total.into(),
                fact.status.clone().into(),
            ]
        })
        .collect();

    let mut sellout = SheetTable::new(
        SELLOUT_SHEET,
        &[
            "id_sellout",
            "id_parceiro",
            "id_produto",
            "id_tempo",
            "data_fatura",
            "nf",
            "quantidade",
            "valor_total",
        ],
    );
    sellout.rows = schema
        .fato_sellout
        .iter()
        .map(|fact| {
            vec![
                fact.id_sellout.into(),
                fact.id_parceiro.clone().into(),
                fact.id_produto.clone().into(),
                fact.id_tempo.into(),
                fact.data_fatura.into(),
                fact.nf.clone().into(),
                fact.quantidade.into(),
                fact.valor_total.into(),
            ]
        })
        .collect();

    WorkbookData {
        tables: vec![partners, products, time, opportunities, sellout],
    }
}

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

/// Sequential identifier stamped on every extracted row, starting at 1.
pub type RowId = u32;

/// Surrogate key of the time dimension.
pub type TimeKey = u32;

/// Identifies which of the two operational extracts a relation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    /// Opportunity registry (semi-structured JSON).
    Opportunities,
    /// Sell-out ledger (columnar CSV or XLSX).
    Sellout,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Opportunities => write!(f, "opportunities"),
            SourceKind::Sellout => write!(f, "sellout"),
        }
    }
}

/// Represents a single cell read from a raw source.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Plain string literal.
    String(String),
    /// Floating point number literal.
    Number(f64),
    /// Boolean literal.
    Boolean(bool),
    /// Date-time carried natively by the source (Excel date cells).
    DateTime(NaiveDateTime),
    /// Blank cell or explicit JSON `null`.
    Null,
}

impl ScalarValue {
    /// Returns `true` when the cell carries no usable content.
    pub fn is_blank(&self) -> bool {
        match self {
            ScalarValue::Null => true,
            ScalarValue::String(value) => value.trim().is_empty(),
            _ => false,
        }
    }

    /// Renders the cell as trimmed text. Integral numbers are rendered without
    /// a fractional part so numeric identifiers keep their digits.
    pub fn to_text(&self) -> String {
        match self {
            ScalarValue::String(value) => value.trim().to_string(),
            ScalarValue::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                format!("{}", *value as i64)
            }
            ScalarValue::Number(value) => value.to_string(),
            ScalarValue::Boolean(value) => value.to_string(),
            ScalarValue::DateTime(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
            ScalarValue::Null => String::new(),
        }
    }
}

/// One extracted row together with its locally unique identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub id: RowId,
    pub cells: Vec<ScalarValue>,
}

impl RawRow {
    /// Returns the cell at `index`, treating short rows as blank.
    pub fn cell(&self, index: usize) -> &ScalarValue {
        const BLANK: &ScalarValue = &ScalarValue::Null;
        self.cells.get(index).unwrap_or(BLANK)
    }
}

/// Canonical tabular relation produced by the extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub source: SourceKind,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Builds a table from header labels and unnumbered rows, stamping each
    /// row with its 1-based position.
    pub fn from_rows(source: SourceKind, headers: Vec<String>, rows: Vec<Vec<ScalarValue>>) -> Self {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, cells)| RawRow {
                id: index as RowId + 1,
                cells,
            })
            .collect();

        Self {
            source,
            headers,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Row of `dim_parceiro`.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerRow {
    pub id_parceiro: String,
    pub nome_parceiro: Option<String>,
}

/// Row of `dim_produto`. The key is the product name itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub id_produto: String,
    pub descricao_produto: String,
}

/// Row of `dim_tempo`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRow {
    pub id_tempo: TimeKey,
    pub data: NaiveDate,
    pub ano: i32,
    pub mes: u32,
    pub nome_mes: String,
    pub dia_semana: String,
}

/// Row of `fato_registro_oportunidade`.
#[derive(Debug, Clone, PartialEq)]
pub struct OpportunityFact {
    pub id_oportunidade: RowId,
    pub id_parceiro: String,
    pub id_produto: String,
    /// `None` when the registration date has no time dimension row.
    pub id_tempo: Option<TimeKey>,
    pub data_registro: NaiveDateTime,
    pub quantidade: Option<f64>,
    pub valor_total: Option<f64>,
    pub status: Option<String>,
}

/// Row of `fato_sellout`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelloutFact {
    pub id_sellout: RowId,
    pub id_parceiro: String,
    pub id_produto: String,
    /// `None` when the invoice date has no time dimension row.
    pub id_tempo: Option<TimeKey>,
    pub data_fatura: NaiveDateTime,
    pub nf: Option<String>,
    pub quantidade: Option<f64>,
    pub valor_total: Option<f64>,
}

/// The complete dimensional model handed to the loader.
#[derive(Debug, Clone, PartialEq)]
pub struct StarSchema {
    pub dim_parceiro: Vec<PartnerRow>,
    pub dim_produto: Vec<ProductRow>,
    pub dim_tempo: Vec<TimeRow>,
    pub fato_registro_oportunidade: Vec<OpportunityFact>,
    pub fato_sellout: Vec<SelloutFact>,
}

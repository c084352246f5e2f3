//! Relational contract of the dimensional model.
//!
//! The tables describe the MySQL layout a relational load would target. The
//! pipeline never executes the DDL; it only renders it and checks a built
//! workbook against the declared keys, nullability and widths.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Write as _};

use crate::neotass::dimensional::tabulate::{
    CellValue, OPPORTUNITY_SHEET, PARTNER_SHEET, PRODUCT_SHEET, SELLOUT_SHEET, SheetTable,
    TIME_SHEET, WorkbookData,
};

pub const DATABASE_NAME: &str = "neotass_dimensional";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Int,
    SmallInt,
    TinyInt,
    Date,
    Varchar(usize),
    Decimal(u8, u8),
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Int => write!(f, "INT"),
            SqlType::SmallInt => write!(f, "SMALLINT"),
            SqlType::TinyInt => write!(f, "TINYINT"),
            SqlType::Date => write!(f, "DATE"),
            SqlType::Varchar(width) => write!(f, "VARCHAR({width})"),
            SqlType::Decimal(precision, scale) => write!(f, "DECIMAL({precision}, {scale})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub table: &'static str,
    pub references: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: Vec<ColumnDef>,
    pub primary_key: &'static str,
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|column| column.name == name)
    }
}

const fn required(name: &'static str, sql_type: SqlType) -> ColumnDef {
    ColumnDef {
        name,
        sql_type,
        nullable: false,
    }
}

const fn optional(name: &'static str, sql_type: SqlType) -> ColumnDef {
    ColumnDef {
        name,
        sql_type,
        nullable: true,
    }
}

fn fact_foreign_keys() -> Vec<ForeignKey> {
    vec![
        ForeignKey {
            column: "id_parceiro",
            table: PARTNER_SHEET,
            references: "id_parceiro",
        },
        ForeignKey {
            column: "id_produto",
            table: PRODUCT_SHEET,
            references: "id_produto",
        },
        ForeignKey {
            column: "id_tempo",
            table: TIME_SHEET,
            references: "id_tempo",
        },
    ]
}

/// The five tables in creation order: dimensions before the facts that
/// reference them.
pub fn contract() -> Vec<TableDef> {
    vec![
        TableDef {
            name: TIME_SHEET,
            columns: vec![
                required("id_tempo", SqlType::Int),
                required("data", SqlType::Date),
                required("ano", SqlType::SmallInt),
                required("mes", SqlType::TinyInt),
                required("nome_mes", SqlType::Varchar(20)),
                required("dia_semana", SqlType::Varchar(20)),
            ],
            primary_key: "id_tempo",
            foreign_keys: Vec::new(),
        },
        TableDef {
            name: PARTNER_SHEET,
            columns: vec![
                required("id_parceiro", SqlType::Varchar(20)),
                optional("nome_parceiro", SqlType::Varchar(255)),
            ],
            primary_key: "id_parceiro",
            foreign_keys: Vec::new(),
        },
        TableDef {
            name: PRODUCT_SHEET,
            columns: vec![
                required("id_produto", SqlType::Varchar(20)),
                required("descricao_produto", SqlType::Varchar(255)),
            ],
            primary_key: "id_produto",
            foreign_keys: Vec::new(),
        },
        TableDef {
            name: OPPORTUNITY_SHEET,
            columns: vec![
                required("id_oportunidade", SqlType::Int),
                required("id_parceiro", SqlType::Varchar(20)),
                required("id_produto", SqlType::Varchar(20)),
                required("id_tempo", SqlType::Int),
                required("data_registro", SqlType::Date),
                optional("quantidade", SqlType::Int),
                optional("valor_total", SqlType::Decimal(10, 2)),
                optional("status", SqlType::Varchar(50)),
            ],
            primary_key: "id_oportunidade",
            foreign_keys: fact_foreign_keys(),
        },
        TableDef {
            name: SELLOUT_SHEET,
            columns: vec![
                required("id_sellout", SqlType::Int),
                required("id_parceiro", SqlType::Varchar(20)),
                required("id_produto", SqlType::Varchar(20)),
                required("id_tempo", SqlType::Int),
                required("data_fatura", SqlType::Date),
                optional("nf", SqlType::Varchar(50)),
                optional("quantidade", SqlType::Int),
                optional("valor_total", SqlType::Decimal(10, 2)),
            ],
            primary_key: "id_sellout",
            foreign_keys: fact_foreign_keys(),
        },
    ]
}

/// Renders the MySQL script creating the database and its tables.
pub fn render_ddl(tables: &[TableDef]) -> String {
    let mut ddl = String::new();
    let _ = writeln!(ddl, "CREATE DATABASE IF NOT EXISTS {DATABASE_NAME};");
    let _ = writeln!(ddl, "USE {DATABASE_NAME};");

    for table in tables {
        let mut lines: Vec<String> = table
            .columns
            .iter()
            .map(|column| {
                let mut line = format!("    {} {}", column.name, column.sql_type);
                if column.name == table.primary_key {
                    line.push_str(" PRIMARY KEY");
                } else if !column.nullable {
                    line.push_str(" NOT NULL");
                }
                line
            })
            .collect();
        lines.extend(table.foreign_keys.iter().map(|fk| {
            format!(
                "    FOREIGN KEY ({}) REFERENCES {}({})",
                fk.column, fk.table, fk.references
            )
        }));

        let _ = writeln!(ddl);
        let _ = writeln!(ddl, "CREATE TABLE {} (", table.name);
        let _ = writeln!(ddl, "{}", lines.join(",\n"));
        let _ = writeln!(ddl, ");");
    }

    ddl
}

/// A way in which built data departs from the relational contract.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    MissingTable {
        table: &'static str,
    },
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
    DuplicateKey {
        table: &'static str,
        key: String,
    },
    NullValue {
        table: &'static str,
        column: &'static str,
        row: usize,
    },
    TooLong {
        table: &'static str,
        column: &'static str,
        value: String,
        width: usize,
    },
    OutOfRange {
        table: &'static str,
        column: &'static str,
        value: f64,
    },
    DanglingReference {
        table: &'static str,
        column: &'static str,
        value: String,
        references: &'static str,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingTable { table } => write!(f, "table {table} is missing"),
            Violation::MissingColumn { table, column } => {
                write!(f, "{table}.{column} is missing")
            }
            Violation::DuplicateKey { table, key } => {
                write!(f, "{table} has duplicate primary key '{key}'")
            }
            Violation::NullValue { table, column, row } => {
                write!(f, "{table}.{column} is null in data row {row} but declared NOT NULL")
            }
            Violation::TooLong {
                table,
                column,
                value,
                width,
            } => write!(f, "{table}.{column} value '{value}' exceeds VARCHAR({width})"),
            Violation::OutOfRange {
                table,
                column,
                value,
            } => write!(f, "{table}.{column} value {value} does not fit the declared type"),
            Violation::DanglingReference {
                table,
                column,
                value,
                references,
            } => write!(f, "{table}.{column} value '{value}' has no row in {references}"),
        }
    }
}

fn key_text(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(value) => Some(value.clone()),
        CellValue::Number(value) if value.fract() == 0.0 => Some(format!("{}", *value as i64)),
        CellValue::Number(value) => Some(value.to_string()),
        CellValue::Date(value) => Some(value.to_string()),
        CellValue::DateTime(value) => Some(value.to_string()),
        CellValue::Empty => None,
    }
}

fn column_values<'a>(
    table: &'a SheetTable,
    column: &str,
) -> Option<impl Iterator<Item = &'a CellValue> + 'a> {
    const EMPTY: &CellValue = &CellValue::Empty;
    let index = table.columns.iter().position(|name| name == column)?;
    Some(table.rows.iter().map(move |row| row.get(index).unwrap_or(EMPTY)))
}

fn check_cell(table: &TableDef, column: &ColumnDef, row: usize, cell: &CellValue) -> Option<Violation> {
    match (cell, column.sql_type) {
        (CellValue::Empty, _) if !column.nullable => Some(Violation::NullValue {
            table: table.name,
            column: column.name,
            row,
        }),
        (CellValue::Text(value), SqlType::Varchar(width)) if value.chars().count() > width => {
            Some(Violation::TooLong {
                table: table.name,
                column: column.name,
                value: value.clone(),
                width,
            })
        }
        (CellValue::Number(value), SqlType::Decimal(precision, scale)) => {
            let limit = 10f64.powi(i32::from(precision) - i32::from(scale));
            (value.abs() >= limit).then(|| Violation::OutOfRange {
                table: table.name,
                column: column.name,
                value: *value,
            })
        }
        (CellValue::Number(value), SqlType::Int) => {
            (value.fract() != 0.0 || value.abs() > f64::from(i32::MAX)).then(|| {
                Violation::OutOfRange {
                    table: table.name,
                    column: column.name,
                    value: *value,
                }
            })
        }
        _ => None,
    }
}

/// Checks the workbook against the contract. An empty result means a
/// relational load with the rendered DDL would accept every row.
pub fn validate(workbook: &WorkbookData, tables: &[TableDef]) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut primary_keys: HashMap<&str, HashSet<String>> = HashMap::new();

    for table in tables {
        let Some(sheet) = workbook.table(table.name) else {
            violations.push(Violation::MissingTable { table: table.name });
            continue;
        };

        for column in &table.columns {
            let Some(values) = column_values(sheet, column.name) else {
                violations.push(Violation::MissingColumn {
                    table: table.name,
                    column: column.name,
                });
                continue;
            };
            violations.extend(
                values
                    .enumerate()
                    .filter_map(|(row, cell)| check_cell(table, column, row + 1, cell)),
            );
        }

        let mut keys = HashSet::new();
        if let Some(values) = column_values(sheet, table.primary_key) {
            for key in values.filter_map(key_text) {
                if !keys.insert(key.clone()) {
                    violations.push(Violation::DuplicateKey {
                        table: table.name,
                        key,
                    });
                }
            }
        }
        primary_keys.insert(table.name, keys);
    }

    for table in tables {
        let Some(sheet) = workbook.table(table.name) else {
            continue;
        };
        for fk in &table.foreign_keys {
            let (Some(values), Some(targets)) =
                (column_values(sheet, fk.column), primary_keys.get(fk.table))
            else {
                continue;
            };
            for value in values.filter_map(key_text) {
                if !targets.contains(&value) {
                    violations.push(Violation::DanglingReference {
                        table: table.name,
                        column: fk.column,
                        value,
                        references: fk.table,
                    });
                }
            }
        }
    }

    violations
}

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::neotass::dimensional::error::{EtlError, Result};
use crate::neotass::dimensional::model::{RawTable, ScalarValue, SourceKind};

/// Reads a JSON document of records into a raw table.
pub fn read_records(path: &Path, source: SourceKind) -> Result<RawTable> {
    let content = fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&content)?;
    parse_records(&document, source)
}

/// Flattens a JSON document into a table. An array yields one row per
/// object and a single object yields one row; nested objects become
/// `outer.inner` columns in order of first appearance.
pub fn parse_records(document: &Value, source: SourceKind) -> Result<RawTable> {
    let records: Vec<&Map<String, Value>> = match document {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_object().ok_or_else(|| EtlError::InvalidSource {
                    source_kind: source,
                    message: format!("record {} is not a JSON object", index + 1),
                })
            })
            .collect::<Result<_>>()?,
        Value::Object(object) => vec![object],
        _ => {
            return Err(EtlError::InvalidSource {
                source_kind: source,
                message: "expected a JSON array of records or a single record".into(),
            });
        }
    };

    let mut headers = HeaderIndex::default();
    let mut flattened = Vec::with_capacity(records.len());
    for record in records {
        let mut cells = Vec::new();
        flatten_object(record, None, &mut headers, &mut cells)?;
        flattened.push(cells);
    }

    let width = headers.labels.len();
    let rows = flattened
        .into_iter()
        .map(|cells| {
            let mut row = vec![ScalarValue::Null; width];
            for (index, value) in cells {
                row[index] = value;
            }
            row
        })
        .collect();

    Ok(RawTable::from_rows(source, headers.labels, rows))
}

#[derive(Default)]
struct HeaderIndex {
    labels: Vec<String>,
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    fn position(&mut self, label: String) -> usize {
        if let Some(index) = self.positions.get(&label) {
            return *index;
        }
        let index = self.labels.len();
        self.positions.insert(label.clone(), index);
        self.labels.push(label);
        index
    }
}

fn flatten_object(
    object: &Map<String, Value>,
    prefix: Option<&str>,
    headers: &mut HeaderIndex,
    cells: &mut Vec<(usize, ScalarValue)>,
) -> Result<()> {
    for (key, value) in object {
        let label = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_object(nested, Some(&label), headers, cells)?,
            other => {
                let scalar = value_to_scalar(other)?;
                cells.push((headers.position(label), scalar));
            }
        }
    }
    Ok(())
}

fn value_to_scalar(value: &Value) -> Result<ScalarValue> {
    Ok(match value {
        Value::Null => ScalarValue::Null,
        Value::Bool(value) => ScalarValue::Boolean(*value),
        Value::Number(number) => match number.as_f64() {
            Some(value) => ScalarValue::Number(value),
            None => ScalarValue::String(number.to_string()),
        },
        Value::String(value) => ScalarValue::String(value.clone()),
        other => ScalarValue::String(serde_json::to_string(other)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_become_dotted_columns() {
        let document = json!([
            {"id": 1, "parceiro": {"CNPJ Parceiro": "11.111.111/0001-11", "Nome Fantasia": "Acme"}},
            {"id": 2, "status": "Won", "tags": ["a", "b"]}
        ]);

        let table = parse_records(&document, SourceKind::Opportunities).expect("records parsed");

        assert_eq!(
            table.headers,
            vec![
                "id",
                "parceiro.CNPJ Parceiro",
                "parceiro.Nome Fantasia",
                "status",
                "tags"
            ]
        );
        assert_eq!(table.rows[0].id, 1);
        assert_eq!(table.rows[1].id, 2);
        assert_eq!(table.rows[0].cell(3), &ScalarValue::Null);
        assert_eq!(
            table.rows[1].cell(4),
            &ScalarValue::String("[\"a\",\"b\"]".into())
        );
    }

    #[test]
    fn single_object_is_one_row() {
        let table = parse_records(&json!({"a": 1}), SourceKind::Opportunities)
            .expect("record parsed");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn scalar_documents_are_rejected() {
        let error = parse_records(&json!(42), SourceKind::Opportunities).expect_err("rejected");
        assert!(matches!(error, EtlError::InvalidSource { .. }));
    }
}

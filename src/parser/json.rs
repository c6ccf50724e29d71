//! JSON parser: an array of records, or one record per line

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use indexmap::IndexSet;
use serde_json::Value;

use crate::config::ReadOptions;
use crate::model::{CellValue, Column, Table};

use super::{parse_temporal, Parser};

/// Parser for JSON array files and JSON Lines files
pub struct JsonParser;

impl Parser for JsonParser {
    fn parse(&self, path: &Path, _options: &ReadOptions) -> Result<Table> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to open JSON file: {}", path.display()))?;

        let is_lines = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("jsonl") || e.eq_ignore_ascii_case("ndjson"));

        let records = if is_lines {
            text.lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(i, line)| {
                    serde_json::from_str(line)
                        .with_context(|| format!("Failed to parse JSON line {}", i + 1))
                })
                .collect::<Result<Vec<Value>>>()?
        } else {
            // Handle both arrays and single objects
            match serde_json::from_str(&text).context("Failed to parse JSON file")? {
                Value::Array(arr) => arr,
                value @ Value::Object(_) => vec![value],
                _ => bail!("JSON must be an array or object"),
            }
        };

        records_to_table(&records)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "json" | "jsonl" | "ndjson")
    }

    fn format_name(&self) -> &'static str {
        "json"
    }
}

fn records_to_table(records: &[Value]) -> Result<Table> {
    // Collect all unique keys across all objects to build column list
    let mut column_names: IndexSet<String> = IndexSet::new();
    for item in records {
        match item {
            Value::Object(obj) => column_names.extend(obj.keys().cloned()),
            _ => bail!("Every JSON record must be an object"),
        }
    }

    let columns: Vec<Column> = column_names
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.clone(), i))
        .collect();

    let mut table = Table::new(columns);

    for (line_num, item) in records.iter().enumerate() {
        if let Value::Object(obj) = item {
            let cells = column_names
                .iter()
                .map(|key| json_value_to_cell(obj.get(key)))
                .collect();
            table.add_row(cells, line_num + 1);
        }
    }

    table.infer_types();
    Ok(table)
}

fn json_value_to_cell(value: Option<&Value>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Null,
        Some(Value::Bool(b)) => CellValue::Bool(*b),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(Cow::Owned(n.to_string()))
            }
        }
        Some(Value::String(s)) => {
            parse_temporal(s).unwrap_or_else(|| CellValue::String(Cow::Owned(s.clone())))
        }
        // Nested structures are kept as their JSON text
        Some(nested @ (Value::Array(_) | Value::Object(_))) => {
            CellValue::String(Cow::Owned(nested.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_with_sparse_keys() {
        let records: Vec<Value> = serde_json::from_str(
            r#"[{"id": 1, "dose": 2.5}, {"id": 2, "arm": "placebo", "tags": [1, 2]}]"#,
        )
        .expect("valid json");
        let table = records_to_table(&records).expect("records convert");

        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["id", "dose", "arm", "tags"]
        );
        assert!(table.cell(1, 1).is_null());
        assert_eq!(table.cell(1, 3), &CellValue::from("[1,2]"));
    }

    #[test]
    fn test_columns_follow_file_order() {
        let records: Vec<Value> =
            serde_json::from_str(r#"[{"usubjid": "01", "age": 40, "arm": "A"}]"#).expect("valid json");
        let table = records_to_table(&records).expect("records convert");
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["usubjid", "age", "arm"]
        );
    }

    #[test]
    fn test_json_lines_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ae.jsonl");
        std::fs::write(&path, "{\"id\": 1}\n\n{\"id\": 2}\n").expect("write");

        let table = JsonParser
            .parse(&path, &ReadOptions::default())
            .expect("jsonl parses");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(1, 0), &CellValue::Int(2));
    }

    #[test]
    fn test_non_object_records_are_rejected() {
        let records = vec![Value::from(1)];
        assert!(records_to_table(&records).is_err());
    }
}

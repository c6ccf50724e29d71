//! CSV file parser

use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::ReadOptions;
use crate::model::{CellValue, Column, Table};

use super::{parse_temporal, Parser};

/// Parser for delimited text files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, _options: &ReadOptions) -> Result<Table> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        };
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(BufReader::new(file));

        let headers = csv_reader
            .headers()
            .context("Failed to read CSV headers")?
            .clone();

        let columns: Vec<Column> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(name.trim(), i))
            .collect();

        let mut table = Table::new(columns);

        for (line_num, result) in csv_reader.records().enumerate() {
            let record = result.with_context(|| format!("Failed to read CSV row {}", line_num + 2))?; // +2 for 1-indexing and header
            table.add_row(record.iter().map(parse_cell_value).collect(), line_num + 2);
        }

        table.infer_types();
        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
    }

    fn format_name(&self) -> &'static str {
        "csv"
    }
}

/// Type one field: missing markers, booleans, integers, floats, dates, then text.
///
/// "NaN" parses as a float and is treated as missing downstream.
fn parse_cell_value(field: &str) -> CellValue {
    let text = field.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("null") || text == "NA" {
        return CellValue::Null;
    }

    match text.to_ascii_lowercase().as_str() {
        "true" => return CellValue::Bool(true),
        "false" => return CellValue::Bool(false),
        _ => {}
    }

    text.parse::<i64>()
        .map(CellValue::Int)
        .or_else(|_| text.parse::<f64>().map(CellValue::Float))
        .ok()
        .or_else(|| parse_temporal(text))
        .unwrap_or_else(|| CellValue::String(Cow::Owned(text.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellType;

    #[test]
    fn test_field_typing() {
        assert!(parse_cell_value(" ").is_null());
        assert!(parse_cell_value("NA").is_null());
        assert_eq!(parse_cell_value("TRUE"), CellValue::Bool(true));
        assert_eq!(parse_cell_value("-7"), CellValue::Int(-7));
        assert_eq!(parse_cell_value("3.25"), CellValue::Float(3.25));
        assert!(parse_cell_value("NaN").is_missing());
        assert_eq!(
            parse_cell_value("2024-01-31"),
            CellValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 1, 31).expect("valid date"))
        );
        assert_eq!(parse_cell_value(" placebo "), CellValue::from("placebo"));
        assert_eq!(parse_cell_value("."), CellValue::from("."));
    }

    #[test]
    fn test_repeated_headers_stay_distinct() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dup.csv");
        std::fs::write(&path, "a,a,b\n1,2,3\n").expect("write");

        let table = CsvParser
            .parse(&path, &ReadOptions::default())
            .expect("csv parses");
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["a", "a.1", "b"]);
        assert_eq!(table.cell(0, 1), &CellValue::Int(2));
    }

    #[test]
    fn test_parse_tsv_and_ragged_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("vitals.tsv");
        std::fs::write(&path, "id\tvalue\n1\t2.5\n2\n").expect("write");

        let table = CsvParser
            .parse(&path, &ReadOptions::default())
            .expect("tsv parses");
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["id", "value"]);
        assert_eq!(table.cell(0, 1), &CellValue::Float(2.5));
        assert!(table.cell(1, 1).is_null());
        assert_eq!(table.columns[1].inferred_type, CellType::Float);
        assert_eq!(table.rows[1].source_line, 3);
    }
}

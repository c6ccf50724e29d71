//! Excel file parser (xlsx, xls, ods)

use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::config::ReadOptions;
use crate::model::{CellValue, Column, Table};

use super::{parse_temporal, Parser};

/// Parser for spreadsheet workbooks
pub struct ExcelParser;

impl Parser for ExcelParser {
    fn parse(&self, path: &Path, options: &ReadOptions) -> Result<Table> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

        let sheet_name = match &options.sheet_name {
            Some(name) => name.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .context("No sheets found in workbook")?,
        };

        let range: Range<Data> = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

        Ok(range_to_table(&range))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "xlsx" | "xls" | "ods" | "xlsm")
    }

    fn format_name(&self) -> &'static str {
        "excel"
    }
}

/// First row is the header; an empty sheet yields an empty table
fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Table::default();
    };

    let columns: Vec<Column> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = cell_to_string(cell);
            Column::new(if name.is_empty() { format!("Column{}", i + 1) } else { name }, i)
        })
        .collect();

    let mut table = Table::new(columns);
    for (line_num, row) in rows.enumerate() {
        table.add_row(row.iter().map(convert_cell).collect(), line_num + 2); // +2 for 1-indexing and header
    }

    table.infer_types();
    table
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::Error(e) => format!("#{:?}", e),
    }
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Null
            } else {
                CellValue::String(Cow::Owned(s.clone()))
            }
        }
        // Spreadsheets store every number as a float; whole numbers become ints
        Data::Float(f) => {
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                CellValue::Int(*f as i64)
            } else {
                CellValue::Float(*f)
            }
        }
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => temporal_or_text(&dt.to_string()),
        Data::DateTimeIso(s) => temporal_or_text(s),
        Data::DurationIso(s) => CellValue::String(Cow::Owned(s.clone())),
        // Formula errors carry no value
        Data::Error(_) => CellValue::Null,
    }
}

fn temporal_or_text(s: &str) -> CellValue {
    parse_temporal(s).unwrap_or_else(|| CellValue::String(Cow::Owned(s.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_to_table() {
        let mut range: Range<Data> = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("USUBJID".into()));
        range.set_value((0, 1), Data::Empty);
        range.set_value((1, 0), Data::String("01-001".into()));
        range.set_value((1, 1), Data::Float(3.0));
        range.set_value((2, 0), Data::String("01-002".into()));
        range.set_value((2, 1), Data::Float(3.5));

        let table = range_to_table(&range);
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["USUBJID", "Column2"]);
        assert_eq!(table.cell(0, 1), &CellValue::Int(3));
        assert_eq!(table.cell(1, 1), &CellValue::Float(3.5));
    }

    #[test]
    fn test_iso_cells_become_temporal() {
        assert!(matches!(
            convert_cell(&Data::DateTimeIso("2024-03-01T08:30:00".into())),
            CellValue::DateTime(_)
        ));
        assert!(matches!(
            convert_cell(&Data::DurationIso("PT1H".into())),
            CellValue::String(_)
        ));
        assert!(convert_cell(&Data::Error(calamine::CellErrorType::Div0)).is_null());
    }
}

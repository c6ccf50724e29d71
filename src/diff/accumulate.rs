//! Walks aligned rows and collects difference records

use std::cmp::Ordering;

use serde::Serialize;

use crate::model::{CellValue, KeyTuple, Table};

use super::cell_diff::{numeric_delta, CellComparator, Classification};
use super::row_diff::Alignment;

/// Kind of discrepancy recorded in a [`Difference`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Issue {
    RowCountMismatch,
    MissingValueMismatch,
    ValueMismatch,
}

/// One discrepancy between the base and comparison tables
#[derive(Debug, Clone, Serialize)]
pub struct Difference {
    /// Key of the by-group, under keyed alignment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyTuple>,
    /// Column name; absent for table-level row count mismatches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    /// Row index within the aligned unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    pub base_value: CellValue,
    pub comp_value: CellValue,
    pub issue: Issue,
    /// `comp - base`, for numeric value mismatches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comp_rows: Option<usize>,
}

impl Difference {
    /// Order by (key, variable, row), absent values first
    fn report_order(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.variable.cmp(&other.variable))
            .then_with(|| self.row.cmp(&other.row))
    }
}

/// A column present in both tables, with its position on each side
#[derive(Debug, Clone)]
pub struct ColumnPair {
    pub name: String,
    pub base_index: usize,
    pub comp_index: usize,
}

impl ColumnPair {
    /// Pair up the named columns; names missing from either table are skipped
    pub fn resolve(base: &Table, comp: &Table, names: &[String]) -> Vec<ColumnPair> {
        names
            .iter()
            .filter_map(|name| {
                Some(ColumnPair {
                    name: name.clone(),
                    base_index: base.column_index(name)?,
                    comp_index: comp.column_index(name)?,
                })
            })
            .collect()
    }
}

/// Collects differences across aligned units
pub struct DiffAccumulator<'a> {
    comparator: &'a CellComparator,
    differences: Vec<Difference>,
}

impl<'a> DiffAccumulator<'a> {
    pub fn new(comparator: &'a CellComparator) -> Self {
        Self {
            comparator,
            differences: Vec::new(),
        }
    }

    /// Record a table-level row count mismatch (positional alignment)
    pub fn row_count_mismatch(&mut self, base_rows: usize, comp_rows: usize) {
        self.differences.push(Difference {
            key: None,
            variable: None,
            row: None,
            base_value: CellValue::Null,
            comp_value: CellValue::Null,
            issue: Issue::RowCountMismatch,
            difference: None,
            base_rows: Some(base_rows),
            comp_rows: Some(comp_rows),
        });
    }

    /// Compare every aligned unit over the given columns
    pub fn accumulate(
        &mut self,
        base: &Table,
        comp: &Table,
        alignment: &Alignment,
        columns: &[ColumnPair],
    ) {
        for unit in &alignment.units {
            if !unit.is_balanced() {
                for column in columns {
                    self.differences.push(Difference {
                        key: unit.key.clone(),
                        variable: Some(column.name.clone()),
                        row: None,
                        base_value: CellValue::Null,
                        comp_value: CellValue::Null,
                        issue: Issue::RowCountMismatch,
                        difference: None,
                        base_rows: Some(unit.base_rows.len()),
                        comp_rows: Some(unit.comp_rows.len()),
                    });
                }
            }

            for (position, (base_row, comp_row)) in unit.pairs().enumerate() {
                for column in columns {
                    let base_value = base.cell(base_row, column.base_index);
                    let comp_value = comp.cell(comp_row, column.comp_index);

                    let issue = match self.comparator.classify(base_value, comp_value) {
                        Classification::Equal => continue,
                        Classification::MissingMismatch => Issue::MissingValueMismatch,
                        Classification::ValueMismatch => Issue::ValueMismatch,
                    };
                    let difference = match issue {
                        Issue::ValueMismatch => numeric_delta(base_value, comp_value),
                        _ => None,
                    };

                    self.differences.push(Difference {
                        key: unit.key.clone(),
                        variable: Some(column.name.clone()),
                        row: Some(position),
                        base_value: base_value.clone(),
                        comp_value: comp_value.clone(),
                        issue,
                        difference,
                        base_rows: None,
                        comp_rows: None,
                    });
                }
            }
        }
    }

    /// Differences sorted by (key, variable, row)
    pub fn finish(mut self) -> Vec<Difference> {
        self.differences.sort_by(Difference::report_order);
        self.differences
    }
}

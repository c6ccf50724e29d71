//! Table, Row, and Cell data structures

use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use rustc_hash::FxHashSet;
use serde::Serialize;

use super::schema::{CellType, Column};

/// Shared missing marker handed out for out-of-range cell lookups
static MISSING: CellValue = CellValue::Null;

/// A cell value with type information
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Cow<'static, str>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (CellValue::String(a), CellValue::String(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a == b,
            // Cross-type numeric comparison
            (CellValue::Int(a), CellValue::Float(b)) => (*a as f64) == *b,
            (CellValue::Float(a), CellValue::Int(b)) => *a == (*b as f64),
            _ => false,
        }
    }
}

impl CellValue {
    /// Check if the value is the literal null marker
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Check if the value is missing: null, or a NaN float
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Check if the value is an integer or a non-missing float
    pub fn is_numeric(&self) -> bool {
        CellType::of(self).is_numeric()
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) if !f.is_nan() => Some(*f),
            _ => None,
        }
    }

    /// SAS-style missing value codes: "." and ".A" through ".Z"
    pub fn is_sas_missing_code(&self) -> bool {
        let CellValue::String(s) = self else {
            return false;
        };
        match s.as_bytes() {
            [b'.'] => true,
            [b'.', c] => c.is_ascii_uppercase(),
            _ => false,
        }
    }

    /// Convert to a display string
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed("NULL"),
            CellValue::Bool(b) => Cow::Owned(b.to_string()),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Float(f) => Cow::Owned(f.to_string()),
            CellValue::String(s) => Cow::Borrowed(s.as_ref()),
            CellValue::Date(d) => Cow::Owned(d.to_string()),
            CellValue::DateTime(dt) => Cow::Owned(dt.to_string()),
        }
    }

    /// Sort rank of the value's kind; missing values rank first
    fn rank(&self) -> u8 {
        match CellType::of(self) {
            CellType::Null => 0,
            CellType::Bool => 1,
            CellType::Int | CellType::Float => 2,
            CellType::Date => 3,
            CellType::DateTime => 4,
            CellType::String | CellType::Mixed => 5,
        }
    }

    /// Total order used for sorting and key grouping.
    ///
    /// Missing values sort before everything else and are equal to each
    /// other. Integers and floats are ordered by exact numeric value, so
    /// `Int(1)` and `Float(1.0)` compare equal, as do `-0.0` and `0.0`.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        let by_rank = self.rank().cmp(&other.rank());
        if by_rank != Ordering::Equal {
            return by_rank;
        }

        match (self, other) {
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (CellValue::Float(a), CellValue::Float(b)) => cmp_floats(*a, *b),
            (CellValue::Int(a), CellValue::Float(b)) => cmp_int_float(*a, *b),
            (CellValue::Float(a), CellValue::Int(b)) => cmp_int_float(*b, *a).reverse(),
            (CellValue::String(a), CellValue::String(b)) => a.cmp(b),
            (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a.cmp(b),
            // Both missing
            _ => Ordering::Equal,
        }
    }
}

/// IEEE order with signed zeros equal; NaN never reaches here (it ranks as missing)
fn cmp_floats(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Exact order of an integer against a float, without rounding the integer
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    // 2^63 as f64; every float in [-2^63, 2^63) truncates to a valid i64
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() {
        return Ordering::Equal;
    }
    if f >= BOUND {
        return Ordering::Less;
    }
    if f < -BOUND {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    i.cmp(&(whole as i64)).then_with(|| {
        // same integral part: the fraction decides
        0.0_f64.partial_cmp(&(f - whole)).unwrap_or(Ordering::Equal)
    })
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(Cow::Owned(s.to_string()))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(Cow::Owned(s))
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

/// A row in the table
#[derive(Debug, Clone)]
pub struct Row {
    /// Cell values in column order
    pub cells: Vec<CellValue>,
    /// Original line/row number in source file (1-indexed)
    pub source_line: usize,
}

impl Row {
    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// A table containing columns and rows
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// All rows in the table
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table with column definitions.
    ///
    /// Repeated names are made unique with a `.N` suffix (`a`, `a.1`, ...),
    /// so every column stays addressable by name.
    pub fn new(mut columns: Vec<Column>) -> Self {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        for column in &mut columns {
            if !seen.insert(column.name.clone()) {
                let base = column.name.clone();
                let mut n = 1;
                while seen.contains(&format!("{}.{}", base, n)) {
                    n += 1;
                }
                column.name = format!("{}.{}", base, n);
                seen.insert(column.name.clone());
            }
        }
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from named columns of cells.
    ///
    /// Shorter columns are padded with nulls to the longest column's length.
    /// Column types are inferred from the data.
    pub fn from_columns<N, I>(columns: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Vec<CellValue>)>,
    {
        let (names, data): (Vec<String>, Vec<Vec<CellValue>>) =
            columns.into_iter().map(|(n, c)| (n.into(), c)).unzip();

        let mut table = Table::new(
            names
                .into_iter()
                .enumerate()
                .map(|(i, name)| Column::new(name, i))
                .collect(),
        );

        let row_count = data.iter().map(Vec::len).max().unwrap_or(0);
        for row_idx in 0..row_count {
            let cells = data
                .iter()
                .map(|col| col.get(row_idx).cloned().unwrap_or(CellValue::Null))
                .collect();
            table.add_row(cells, row_idx + 1);
        }

        table.infer_types();
        table
    }

    /// Add a row to the table, padding or truncating it to the column count
    pub fn add_row(&mut self, mut cells: Vec<CellValue>, source_line: usize) {
        cells.resize(self.column_count(), CellValue::Null);
        self.rows.push(Row { cells, source_line });
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in table order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Whether the table has a column with this name
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (row, column); out-of-range lookups read as missing
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&MISSING)
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Recompute each column's type from its cells
    pub fn infer_types(&mut self) {
        for (col_idx, column) in self.columns.iter_mut().enumerate() {
            column.inferred_type = self
                .rows
                .iter()
                .filter_map(|row| row.get(col_idx))
                .fold(CellType::Null, |acc, cell| acc.widen(CellType::of(cell)));
        }
    }

    /// Row indices in ascending order of the given columns, missing first.
    ///
    /// The sort is stable, so rows with equal keys keep their input order.
    pub fn sort_order(&self, column_indices: &[usize]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.row_count()).collect();
        order.sort_by(|&a, &b| {
            column_indices
                .iter()
                .map(|&col| self.cell(a, col).total_cmp(self.cell(b, col)))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        order
    }

    /// A copy of this table with rows sorted by the named columns.
    ///
    /// Names that are not columns of this table are ignored.
    pub fn sorted_by(&self, names: &[String]) -> Table {
        let indices: Vec<usize> = names.iter().filter_map(|n| self.column_index(n)).collect();
        let rows = self
            .sort_order(&indices)
            .into_iter()
            .map(|i| self.rows[i].clone())
            .collect();
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// A copy of this table restricted to the named columns, in the given order
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Table {
        let picked: Vec<usize> = names
            .iter()
            .filter_map(|n| self.column_index(n.as_ref()))
            .collect();

        let columns = picked
            .iter()
            .enumerate()
            .map(|(new_idx, &old_idx)| {
                let old = &self.columns[old_idx];
                Column::with_type(old.name.clone(), new_idx, old.inferred_type)
            })
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| Row {
                cells: picked.iter().map(|&i| row.cells[i].clone()).collect(),
                source_line: row.source_line,
            })
            .collect();

        Table { columns, rows }
    }

    /// Replace NaN floats and SAS missing codes with the null marker
    pub fn normalize_missing(mut self) -> Table {
        for cell in self.rows.iter_mut().flat_map(|row| row.cells.iter_mut()) {
            if cell.is_missing() || cell.is_sas_missing_code() {
                *cell = CellValue::Null;
            }
        }
        self.infer_types();
        self
    }
}

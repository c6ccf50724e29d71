//! Composite key handling

use std::cmp::Ordering;

use serde::Serialize;

use super::table::{CellValue, Table};

/// The values of one row's key columns, used as a grouping identity.
///
/// Keys compare exactly (no numeric tolerance). Missing values are equal to
/// each other and order before every other value.
#[derive(Debug, Clone, Serialize)]
pub struct KeyTuple(pub Vec<CellValue>);

impl KeyTuple {
    /// Build the key for `row` from the given column indices
    pub fn from_row(table: &Table, row: usize, column_indices: &[usize]) -> Self {
        KeyTuple(
            column_indices
                .iter()
                .map(|&col| table.cell(row, col).clone())
                .collect(),
        )
    }

    /// Key values in column order
    pub fn values(&self) -> &[CellValue] {
        &self.0
    }
}

impl PartialEq for KeyTuple {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyTuple {}

impl PartialOrd for KeyTuple {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyTuple {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| a.total_cmp(b))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| self.0.len().cmp(&other.0.len()))
    }
}

impl std::fmt::Display for KeyTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<_> = self.0.iter().map(|c| c.display()).collect();
        write!(f, "{}", parts.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_group_missing_values_together() {
        let a = KeyTuple(vec![CellValue::Null, CellValue::Int(1)]);
        let b = KeyTuple(vec![CellValue::Float(f64::NAN), CellValue::Int(1)]);
        assert_eq!(a, b);
    }

    #[test]
    fn keys_are_exact_without_tolerance() {
        let a = KeyTuple(vec![CellValue::Float(1.0)]);
        let b = KeyTuple(vec![CellValue::Float(1.0 + 1e-12)]);
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn signed_zeros_and_int_float_keys_are_equal() {
        assert_eq!(
            KeyTuple(vec![CellValue::Float(-0.0)]),
            KeyTuple(vec![CellValue::Float(0.0)])
        );
        assert_eq!(
            KeyTuple(vec![CellValue::Int(3)]),
            KeyTuple(vec![CellValue::Float(3.0)])
        );
        assert_ne!(
            KeyTuple(vec![CellValue::Int((1 << 53) + 1)]),
            KeyTuple(vec![CellValue::Float((1_i64 << 53) as f64)])
        );
    }

    #[test]
    fn key_from_row_follows_column_order() {
        let table = Table::from_columns([
            ("a", vec![CellValue::Int(1)]),
            ("b", vec![CellValue::from("x")]),
        ]);
        let key = KeyTuple::from_row(&table, 0, &[1, 0]);
        assert_eq!(key.to_string(), "x|1");
    }
}

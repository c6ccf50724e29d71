//! Schema comparison logic

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::model::Table;

/// Partition of two tables' column names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnSets {
    /// Columns only in the base table, in base order
    #[serde(rename = "vars_left")]
    pub only_in_base: Vec<String>,
    /// Columns only in the comparison table, in comparison order
    #[serde(rename = "vars_right")]
    pub only_in_comp: Vec<String>,
    /// Columns present in both, in base order
    #[serde(rename = "vars_both")]
    pub in_both: Vec<String>,
}

impl ColumnSets {
    /// Whether both tables have exactly the same column names
    pub fn names_match(&self) -> bool {
        self.only_in_base.is_empty() && self.only_in_comp.is_empty()
    }
}

/// Schema comparison engine
pub struct SchemaDiff;

impl SchemaDiff {
    /// Compare the column names of two tables (case-sensitive)
    pub fn compare_columns(base: &Table, comp: &Table) -> ColumnSets {
        let base_names: FxHashSet<&str> = base.column_names().collect();
        let comp_names: FxHashSet<&str> = comp.column_names().collect();

        let (in_both, only_in_base): (Vec<String>, Vec<String>) = base
            .column_names()
            .map(str::to_string)
            .partition(|name| comp_names.contains(name.as_str()));

        let only_in_comp = comp
            .column_names()
            .filter(|name| !base_names.contains(name))
            .map(str::to_string)
            .collect();

        ColumnSets {
            only_in_base,
            only_in_comp,
            in_both,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    fn table(names: &[&str]) -> Table {
        Table::from_columns(names.iter().map(|n| (*n, vec![CellValue::Int(1)])))
    }

    #[test]
    fn test_different_columns() {
        let sets = SchemaDiff::compare_columns(&table(&["a", "b", "c"]), &table(&["a", "b", "d"]));
        assert_eq!(sets.only_in_base, vec!["c"]);
        assert_eq!(sets.only_in_comp, vec!["d"]);
        assert_eq!(sets.in_both, vec!["a", "b"]);
        assert!(!sets.names_match());
    }

    #[test]
    fn test_self_comparison() {
        let t = table(&["x", "y"]);
        let sets = SchemaDiff::compare_columns(&t, &t);
        assert!(sets.only_in_base.is_empty());
        assert!(sets.only_in_comp.is_empty());
        assert_eq!(sets.in_both, vec!["x", "y"]);
    }

    #[test]
    fn test_partition_covers_union() {
        let a = table(&["id", "AGE", "sex"]);
        let b = table(&["sex", "age", "id", "arm"]);
        let sets = SchemaDiff::compare_columns(&a, &b);

        let mut all: Vec<_> = sets
            .only_in_base
            .iter()
            .chain(&sets.only_in_comp)
            .chain(&sets.in_both)
            .cloned()
            .collect();
        all.sort();
        let before = all.len();
        all.dedup();
        assert_eq!(before, all.len(), "sets must not overlap");
        assert_eq!(all, vec!["AGE", "age", "arm", "id", "sex"]);
    }

    #[test]
    fn test_empty_tables() {
        let sets = SchemaDiff::compare_columns(&Table::default(), &Table::default());
        assert_eq!(sets, ColumnSets::default());
        assert!(sets.names_match());
    }
}

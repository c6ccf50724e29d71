//! Row alignment: by key columns, or by position

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{KeyTuple, Table};

/// How rows were matched between the two tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AlignmentMode {
    /// Rows matched by the values of these key columns
    Keyed { by: Vec<String> },
    /// No key columns requested; rows matched by index
    Positional,
    /// Key columns were requested but some are absent, so rows were matched
    /// by index instead
    PositionalFallback {
        by: Vec<String>,
        missing_in_base: Vec<String>,
        missing_in_comp: Vec<String>,
    },
}

impl AlignmentMode {
    pub fn is_keyed(&self) -> bool {
        matches!(self, AlignmentMode::Keyed { .. })
    }
}

/// By-group counts, only computed for keyed alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupCounts {
    pub by_group_count_match: bool,
    pub base_only_groups: usize,
    pub comp_only_groups: usize,
    pub common_groups: usize,
}

/// Rows from each side that correspond to one another.
///
/// `base_rows[i]` pairs with `comp_rows[i]`; under keyed alignment the two
/// lists may differ in length.
#[derive(Debug, Clone)]
pub struct AlignedUnit {
    pub key: Option<KeyTuple>,
    pub base_rows: Vec<usize>,
    pub comp_rows: Vec<usize>,
}

impl AlignedUnit {
    pub fn is_balanced(&self) -> bool {
        self.base_rows.len() == self.comp_rows.len()
    }

    /// (base row, comp row) pairs up to the shorter side
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.base_rows
            .iter()
            .copied()
            .zip(self.comp_rows.iter().copied())
    }
}

/// Result of aligning two tables
#[derive(Debug, Clone)]
pub struct Alignment {
    pub mode: AlignmentMode,
    pub units: Vec<AlignedUnit>,
    pub groups: Option<GroupCounts>,
}

/// Row aligner for a fixed list of key columns
pub struct RowAligner<'a> {
    by: &'a [String],
}

impl<'a> RowAligner<'a> {
    /// Create a new row aligner; an empty `by` selects positional matching
    pub fn new(by: &'a [String]) -> Self {
        Self { by }
    }

    /// Align rows of the base and comparison tables
    pub fn align(&self, base: &Table, comp: &Table) -> Alignment {
        if self.by.is_empty() {
            return Self::positional(base, comp, AlignmentMode::Positional);
        }

        let missing_in_base = self.absent_from(base);
        let missing_in_comp = self.absent_from(comp);
        if !missing_in_base.is_empty() || !missing_in_comp.is_empty() {
            let mode = AlignmentMode::PositionalFallback {
                by: self.by.to_vec(),
                missing_in_base,
                missing_in_comp,
            };
            return Self::positional(base, comp, mode);
        }

        self.keyed(base, comp)
    }

    fn absent_from(&self, table: &Table) -> Vec<String> {
        self.by
            .iter()
            .filter(|name| !table.has_column(name))
            .cloned()
            .collect()
    }

    fn positional(base: &Table, comp: &Table, mode: AlignmentMode) -> Alignment {
        let shared = base.row_count().min(comp.row_count());
        Alignment {
            mode,
            units: vec![AlignedUnit {
                key: None,
                base_rows: (0..shared).collect(),
                comp_rows: (0..shared).collect(),
            }],
            groups: None,
        }
    }

    fn keyed(&self, base: &Table, comp: &Table) -> Alignment {
        let mut base_groups = self.group(base);
        let mut comp_groups = self.group(comp);
        let by_group_count_match = base_groups.len() == comp_groups.len();

        let base_only_groups = base_groups
            .keys()
            .filter(|k| !comp_groups.contains_key(k))
            .count();
        let comp_only_groups = comp_groups
            .keys()
            .filter(|k| !base_groups.contains_key(k))
            .count();

        let common: Vec<KeyTuple> = base_groups
            .keys()
            .filter(|k| comp_groups.contains_key(k))
            .cloned()
            .collect();

        let units = common
            .into_iter()
            .filter_map(|key| {
                let base_rows = base_groups.remove(&key)?;
                let comp_rows = comp_groups.remove(&key)?;
                Some(AlignedUnit {
                    key: Some(key),
                    base_rows,
                    comp_rows,
                })
            })
            .collect::<Vec<_>>();

        let groups = GroupCounts {
            by_group_count_match,
            base_only_groups,
            comp_only_groups,
            common_groups: units.len(),
        };

        Alignment {
            mode: AlignmentMode::Keyed {
                by: self.by.to_vec(),
            },
            units,
            groups: Some(groups),
        }
    }

    /// Group row indices by key, walking rows in key-sorted order
    fn group(&self, table: &Table) -> BTreeMap<KeyTuple, Vec<usize>> {
        let indices: Vec<usize> = self
            .by
            .iter()
            .filter_map(|name| table.column_index(name))
            .collect();

        let mut groups: BTreeMap<KeyTuple, Vec<usize>> = BTreeMap::new();
        for row in table.sort_order(&indices) {
            groups
                .entry(KeyTuple::from_row(table, row, &indices))
                .or_default()
                .push(row);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    fn ints(values: &[i64]) -> Vec<CellValue> {
        values.iter().map(|&v| CellValue::Int(v)).collect()
    }

    fn by(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positional_truncates_to_shorter_table() {
        let base = Table::from_columns([("v", ints(&[1, 2, 3]))]);
        let comp = Table::from_columns([("v", ints(&[1, 2]))]);
        let alignment = RowAligner::new(&[]).align(&base, &comp);

        assert_eq!(alignment.mode, AlignmentMode::Positional);
        assert_eq!(alignment.units.len(), 1);
        assert_eq!(alignment.units[0].pairs().collect::<Vec<_>>(), vec![(0, 0), (1, 1)]);
        assert!(alignment.groups.is_none());
    }

    #[test]
    fn test_keyed_groups_and_counts() {
        let base = Table::from_columns([("id", ints(&[3, 1, 2, 2])), ("v", ints(&[0, 0, 0, 0]))]);
        let comp = Table::from_columns([("id", ints(&[2, 4, 1])), ("v", ints(&[0, 0, 0]))]);
        let keys = by(&["id"]);
        let alignment = RowAligner::new(&keys).align(&base, &comp);

        assert!(alignment.mode.is_keyed());
        let groups = alignment.groups.expect("keyed alignment has group counts");
        assert_eq!(groups.common_groups, 2);
        assert_eq!(groups.base_only_groups, 1);
        assert_eq!(groups.comp_only_groups, 1);
        assert!(groups.by_group_count_match);

        let keys: Vec<String> = alignment
            .units
            .iter()
            .map(|u| u.key.as_ref().map(ToString::to_string).unwrap_or_default())
            .collect();
        assert_eq!(keys, vec!["1", "2"]);

        let two = &alignment.units[1];
        assert_eq!(two.base_rows, vec![2, 3]);
        assert_eq!(two.comp_rows, vec![0]);
        assert!(!two.is_balanced());
    }

    #[test]
    fn test_missing_key_values_form_one_group_sorted_first() {
        let base = Table::from_columns([(
            "id",
            vec![CellValue::Int(1), CellValue::Null, CellValue::Float(f64::NAN)],
        )]);
        let keys = by(&["id"]);
        let alignment = RowAligner::new(&keys).align(&base, &base);

        assert_eq!(alignment.units.len(), 2);
        assert!(alignment.units[0].key.as_ref().is_some_and(|k| k.values()[0].is_missing()));
        assert_eq!(alignment.units[0].base_rows, vec![1, 2]);
    }

    #[test]
    fn test_absent_key_column_falls_back_to_positional() {
        let base = Table::from_columns([("id", ints(&[1])), ("site", ints(&[1]))]);
        let comp = Table::from_columns([("id", ints(&[1]))]);
        let keys = by(&["id", "site"]);
        let alignment = RowAligner::new(&keys).align(&base, &comp);

        assert_eq!(
            alignment.mode,
            AlignmentMode::PositionalFallback {
                by: keys.clone(),
                missing_in_base: vec![],
                missing_in_comp: vec!["site".to_string()],
            }
        );
        assert!(alignment.groups.is_none());
        assert_eq!(alignment.units[0].key, None);
    }
}

//! Comparison engine for two tables

mod accumulate;
pub mod cell_diff;
mod row_diff;
mod schema_diff;

use serde::Serialize;

use crate::config::CompareOptions;
use crate::model::Table;

pub use accumulate::{ColumnPair, DiffAccumulator, Difference, Issue};
pub use cell_diff::{CellComparator, Classification, ValueKind};
pub use row_diff::{AlignedUnit, Alignment, AlignmentMode, GroupCounts, RowAligner};
pub use schema_diff::{ColumnSets, SchemaDiff};

/// Result of comparing two tables
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub row_count_match: bool,
    pub base_rows: usize,
    pub comp_rows: usize,
    pub column_count_match: bool,
    pub base_columns: usize,
    pub comp_columns: usize,
    pub column_names_match: bool,
    /// How rows were matched
    pub alignment: AlignmentMode,
    /// By-group counts, present only under keyed alignment
    #[serde(flatten)]
    pub groups: Option<GroupCounts>,
    pub differences: Vec<Difference>,
    #[serde(rename = "match")]
    pub is_match: bool,
    pub difference_count: usize,
}

impl ComparisonReport {
    /// Check if there are any differences
    pub fn has_changes(&self) -> bool {
        !self.is_match
    }

    /// Differences of one kind
    pub fn differences_of(&self, issue: Issue) -> impl Iterator<Item = &Difference> {
        self.differences.iter().filter(move |d| d.issue == issue)
    }
}

/// Main comparison engine
pub struct DiffEngine {
    options: CompareOptions,
    comparator: CellComparator,
}

impl DiffEngine {
    /// Create a new engine with comparison options
    pub fn new(options: CompareOptions) -> Self {
        let comparator = CellComparator::new(options.tolerance);
        Self {
            options,
            comparator,
        }
    }

    /// Compare two tables. Neither input is modified.
    pub fn compare(&self, base: &Table, comp: &Table) -> ComparisonReport {
        let columns = SchemaDiff::compare_columns(base, comp);
        let alignment = RowAligner::new(&self.options.by).align(base, comp);

        let checked: Vec<String> = match &alignment.mode {
            AlignmentMode::Keyed { by } => columns
                .in_both
                .iter()
                .filter(|name| !by.contains(*name))
                .cloned()
                .collect(),
            AlignmentMode::Positional | AlignmentMode::PositionalFallback { .. } => {
                columns.in_both.clone()
            }
        };
        let pairs = ColumnPair::resolve(base, comp, &checked);

        let mut accumulator = DiffAccumulator::new(&self.comparator);
        if !alignment.mode.is_keyed() && base.row_count() != comp.row_count() {
            accumulator.row_count_mismatch(base.row_count(), comp.row_count());
        }
        accumulator.accumulate(base, comp, &alignment, &pairs);
        let differences = accumulator.finish();

        ComparisonReport {
            row_count_match: base.row_count() == comp.row_count(),
            base_rows: base.row_count(),
            comp_rows: comp.row_count(),
            column_count_match: base.column_count() == comp.column_count(),
            base_columns: base.column_count(),
            comp_columns: comp.column_count(),
            column_names_match: columns.names_match(),
            alignment: alignment.mode,
            groups: alignment.groups,
            is_match: differences.is_empty(),
            difference_count: differences.len(),
            differences,
        }
    }
}

/// Convenience function to compare two tables
pub fn compare_tables(base: &Table, comp: &Table, options: &CompareOptions) -> ComparisonReport {
    DiffEngine::new(options.clone()).compare(base, comp)
}

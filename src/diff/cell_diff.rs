//! Cell-level comparison logic

use crate::config::Tolerance;
use crate::model::{CellType, CellValue};

/// How a pair of cells is compared, decided per pair rather than per column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// At least one side is missing
    Missing,
    /// Both integers; compared exactly
    Integer,
    /// Both numeric with at least one float; compared with tolerance
    Numeric,
    /// Same non-numeric kind; compared exactly
    Exact,
    /// Different kinds, e.g. a number against text
    Mixed,
}

impl ValueKind {
    pub fn of_pair(a: &CellValue, b: &CellValue) -> ValueKind {
        let (ta, tb) = (CellType::of(a), CellType::of(b));
        match (ta, tb) {
            (CellType::Null, _) | (_, CellType::Null) => ValueKind::Missing,
            (CellType::Int, CellType::Int) => ValueKind::Integer,
            (x, y) if x.is_numeric() && y.is_numeric() => ValueKind::Numeric,
            (x, y) if x == y => ValueKind::Exact,
            _ => ValueKind::Mixed,
        }
    }
}

/// Outcome of comparing two cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Equal,
    MissingMismatch,
    ValueMismatch,
}

/// Cell comparator with configured numeric tolerances
#[derive(Debug, Clone, Copy, Default)]
pub struct CellComparator {
    tolerance: Tolerance,
}

impl CellComparator {
    /// Create a new cell comparator
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Classify a (base, comp) cell pair. Total over all inputs.
    pub fn classify(&self, a: &CellValue, b: &CellValue) -> Classification {
        let equal = match ValueKind::of_pair(a, b) {
            ValueKind::Missing => {
                return if a.is_missing() && b.is_missing() {
                    Classification::Equal
                } else {
                    Classification::MissingMismatch
                };
            }
            ValueKind::Numeric => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => is_close(x, y, self.tolerance),
                _ => false,
            },
            ValueKind::Integer | ValueKind::Exact => a == b,
            ValueKind::Mixed => false,
        };

        if equal {
            Classification::Equal
        } else {
            Classification::ValueMismatch
        }
    }

    /// Compare two cell values for equality
    pub fn equal(&self, a: &CellValue, b: &CellValue) -> bool {
        self.classify(a, b) == Classification::Equal
    }
}

/// Union of absolute and relative closeness, relative to the larger magnitude
pub fn is_close(a: f64, b: f64, tolerance: Tolerance) -> bool {
    if a == b {
        // also covers matching infinities, where a - b is NaN
        return true;
    }
    // an infinity is only close to the same infinity
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    let diff = (a - b).abs();
    diff <= tolerance.abs_tol || diff <= tolerance.rel_tol * a.abs().max(b.abs())
}

/// `comp - base` when both cells are numeric
pub fn numeric_delta(base: &CellValue, comp: &CellValue) -> Option<f64> {
    if let (CellValue::Int(a), CellValue::Int(b)) = (base, comp) {
        return b.checked_sub(*a).map(|d| d as f64);
    }
    Some(comp.as_f64()? - base.as_f64()?)
}

/// Calculate percentage change for numeric values
pub fn percentage_change(old: &CellValue, new: &CellValue) -> Option<f64> {
    let old_num = old.as_f64()?;
    let new_num = new.as_f64()?;

    if old_num == 0.0 {
        if new_num == 0.0 {
            Some(0.0)
        } else {
            None // Infinite change
        }
    } else {
        Some((new_num - old_num) / old_num * 100.0)
    }
}

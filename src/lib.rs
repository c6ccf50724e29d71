//! dscompare - Dataset comparison in the manner of PROC COMPARE
//!
//! Compares the variables of two tables, their observations (matched by key
//! columns or by position, with numeric tolerance), and whole directories of
//! datasets (CSV, Excel, Parquet, JSON).

pub mod config;
pub mod diff;
pub mod error;
pub mod library;
pub mod model;
pub mod output;
pub mod parser;

pub use config::{CompareOptions, Settings, Tolerance};
pub use diff::{compare_tables, ComparisonReport};
pub use error::{CompareError, Result};
pub use library::{compare_libraries, LibraryReport};
pub use model::Table;

//! Output formatting for comparison reports

mod json;
mod terminal;

use anyhow::Result;
use termcolor::WriteColor;

use crate::config::{OutputFormat, Settings};
use crate::diff::{ColumnSets, ComparisonReport};
use crate::library::LibraryReport;

pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render a column-set comparison (`compvars`)
    fn render_columns(&self, sets: &ColumnSets, writer: &mut dyn WriteColor) -> Result<()>;

    /// Render a single dataset comparison (`compare`)
    fn render_comparison(&self, report: &ComparisonReport, writer: &mut dyn WriteColor)
        -> Result<()>;

    /// Render a library comparison (`complibs`)
    fn render_library(&self, report: &LibraryReport, writer: &mut dyn WriteColor) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat, settings: Settings) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Json => Box::new(JsonOutput::new()),
            OutputFormat::Terminal => Box::new(TerminalOutput::new(settings)),
        }
    }
}

//! JSON output format

use anyhow::Result;
use serde::Serialize;
use termcolor::WriteColor;

use crate::diff::{ColumnSets, ComparisonReport};
use crate::library::LibraryReport;

use super::OutputFormatter;

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    fn write<T: Serialize>(&self, value: &T, writer: &mut dyn WriteColor) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, value)?;
        } else {
            serde_json::to_writer(&mut *writer, value)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn render_columns(&self, sets: &ColumnSets, writer: &mut dyn WriteColor) -> Result<()> {
        self.write(sets, writer)
    }

    fn render_comparison(
        &self,
        report: &ComparisonReport,
        writer: &mut dyn WriteColor,
    ) -> Result<()> {
        self.write(report, writer)
    }

    fn render_library(&self, report: &LibraryReport, writer: &mut dyn WriteColor) -> Result<()> {
        self.write(report, writer)
    }
}

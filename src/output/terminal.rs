//! Colored terminal output

use anyhow::Result;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::config::Settings;
use crate::diff::cell_diff::percentage_change;
use crate::diff::{AlignmentMode, ColumnSets, ComparisonReport, Difference, Issue};
use crate::library::LibraryReport;
use crate::model::CellValue;

use super::OutputFormatter;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Terminal output with colors
pub struct TerminalOutput {
    settings: Settings,
}

impl TerminalOutput {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    fn write_header(&self, writer: &mut dyn WriteColor, title: &str) -> Result<()> {
        writeln!(writer, "{}", RULE)?;
        writer.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(writer, " dscompare: {}", title)?;
        writer.reset()?;
        writeln!(writer, "{}", RULE)?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_status(&self, writer: &mut dyn WriteColor, is_match: bool) -> Result<()> {
        let (color, text) = if is_match {
            (Color::Green, "MATCH")
        } else {
            (Color::Red, "DIFFERENT")
        };
        writer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(writer, "{}", text)?;
        writer.reset()?;
        Ok(())
    }

    fn write_name_list(
        &self,
        writer: &mut dyn WriteColor,
        label: &str,
        names: &[String],
        color: Option<Color>,
    ) -> Result<()> {
        write!(writer, "{:<24}", label)?;
        if names.is_empty() {
            writeln!(writer, "(none)")?;
            return Ok(());
        }
        writer.set_color(ColorSpec::new().set_fg(color))?;
        writeln!(writer, "{}", names.join(", "))?;
        writer.reset()?;
        Ok(())
    }

    fn write_summary(&self, report: &ComparisonReport, writer: &mut dyn WriteColor) -> Result<()> {
        writeln!(
            writer,
            "Rows:    {} base, {} comp{}",
            report.base_rows,
            report.comp_rows,
            mismatch_marker(report.row_count_match)
        )?;
        writeln!(
            writer,
            "Columns: {} base, {} comp{}",
            report.base_columns,
            report.comp_columns,
            mismatch_marker(report.column_count_match && report.column_names_match)
        )?;

        match &report.alignment {
            AlignmentMode::Keyed { by } => {
                write!(writer, "Matched by: {}", by.join(", "))?;
                if let Some(groups) = &report.groups {
                    write!(
                        writer,
                        " ({} common, {} base only, {} comp only groups)",
                        groups.common_groups, groups.base_only_groups, groups.comp_only_groups
                    )?;
                }
                writeln!(writer)?;
            }
            AlignmentMode::Positional => writeln!(writer, "Matched by: row position")?,
            AlignmentMode::PositionalFallback {
                by,
                missing_in_base,
                missing_in_comp,
            } => {
                writer.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
                write!(writer, "Matched by: row position")?;
                writer.reset()?;
                let mut missing = missing_in_base.clone();
                missing.extend(missing_in_comp.iter().cloned());
                writeln!(
                    writer,
                    " (key {} unavailable: {} missing)",
                    by.join(", "),
                    missing.join(", ")
                )?;
            }
        }

        write!(writer, "Result:  ")?;
        self.write_status(writer, report.is_match)?;
        if report.is_match {
            writeln!(writer)?;
        } else {
            writeln!(
                writer,
                " ({} value, {} missing value, {} row count)",
                report.differences_of(Issue::ValueMismatch).count(),
                report.differences_of(Issue::MissingValueMismatch).count(),
                report.differences_of(Issue::RowCountMismatch).count()
            )?;
        }
        writeln!(writer)?;
        Ok(())
    }

    fn write_differences(&self, differences: &[Difference], writer: &mut dyn WriteColor) -> Result<()> {
        if differences.is_empty() {
            return Ok(());
        }

        let mut table_data: Vec<Vec<String>> = vec![[
            "Key", "Variable", "Row", "Base", "Comp", "Issue", "Difference",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect()];

        for diff in differences {
            table_data.push(vec![
                diff.key.as_ref().map(ToString::to_string).unwrap_or_default(),
                diff.variable.clone().unwrap_or_default(),
                diff.row.map(|r| r.to_string()).unwrap_or_default(),
                self.value_text(diff, &diff.base_value, diff.base_rows),
                self.value_text(diff, &diff.comp_value, diff.comp_rows),
                issue_label(diff.issue).to_string(),
                self.delta_text(diff),
            ]);
        }

        writeln!(writer, "Differences:")?;
        write!(writer, "{}", build_table(&table_data))?;
        Ok(())
    }

    /// Row-count records show the group sizes in place of cell values
    fn value_text(&self, diff: &Difference, value: &CellValue, rows: Option<usize>) -> String {
        match (diff.issue, rows) {
            (Issue::RowCountMismatch, Some(n)) => format!("{} rows", n),
            _ => match value {
                CellValue::Float(f) => self.settings.format_float(*f),
                other => other.display().into_owned(),
            },
        }
    }

    fn delta_text(&self, diff: &Difference) -> String {
        let Some(delta) = diff.difference else {
            return String::new();
        };
        let pct = percentage_change(&diff.base_value, &diff.comp_value)
            .map(|p| format!(" ({:+.1}%)", p))
            .unwrap_or_default();
        format!("{}{}", self.settings.format_float(delta), pct)
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl OutputFormatter for TerminalOutput {
    fn render_columns(&self, sets: &ColumnSets, writer: &mut dyn WriteColor) -> Result<()> {
        self.write_header(writer, "variables")?;
        self.write_name_list(writer, "Only in base:", &sets.only_in_base, Some(Color::Red))?;
        self.write_name_list(writer, "Only in comp:", &sets.only_in_comp, Some(Color::Green))?;
        self.write_name_list(writer, "In both:", &sets.in_both, None)?;
        Ok(())
    }

    fn render_comparison(
        &self,
        report: &ComparisonReport,
        writer: &mut dyn WriteColor,
    ) -> Result<()> {
        self.write_header(writer, "compare")?;
        self.write_summary(report, writer)?;
        self.write_differences(&report.differences, writer)?;
        Ok(())
    }

    fn render_library(&self, report: &LibraryReport, writer: &mut dyn WriteColor) -> Result<()> {
        self.write_header(writer, "libraries")?;

        if report.datasets.is_empty() {
            writeln!(writer, "No datasets in common.")?;
        }
        for (name, dataset) in &report.datasets {
            write!(
                writer,
                "{:<20} {:>7} / {:<7} rows  {:>3} shared vars  ",
                name,
                dataset.ds1_rows,
                dataset.ds2_rows,
                dataset.vars_both.len()
            )?;
            self.write_status(writer, dataset.comparison.is_match)?;
            if !dataset.comparison.is_match {
                write!(writer, " ({} differences)", dataset.comparison.difference_count)?;
            }
            writeln!(writer)?;
        }

        if !report.base_only_datasets.is_empty() || !report.comp_only_datasets.is_empty() {
            writeln!(writer)?;
            self.write_name_list(writer, "Only in base:", &report.base_only_datasets, Some(Color::Red))?;
            self.write_name_list(writer, "Only in comp:", &report.comp_only_datasets, Some(Color::Green))?;
        }
        Ok(())
    }
}

fn mismatch_marker(matches: bool) -> &'static str {
    if matches {
        ""
    } else {
        "  (mismatch)"
    }
}

fn issue_label(issue: Issue) -> &'static str {
    match issue {
        Issue::RowCountMismatch => "row count",
        Issue::MissingValueMismatch => "missing value",
        Issue::ValueMismatch => "value",
    }
}

/// Build a box-drawn table; the first row is the header
fn build_table(data: &[Vec<String>]) -> String {
    let Some(header) = data.first() else {
        return String::new();
    };
    if header.is_empty() {
        return String::new();
    }

    let mut col_widths: Vec<usize> = vec![0; header.len()];
    for row in data {
        for (width, cell) in col_widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = |left: char, mid: char, right: char| {
        let inner: Vec<String> = col_widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}\n", left, inner.join(&mid.to_string()), right)
    };
    let line = |row: &[String]| {
        let mut out = String::from("│");
        for (cell, width) in row.iter().zip(&col_widths) {
            out.push_str(&format!(" {:width$} │", cell, width = width));
        }
        out.push('\n');
        out
    };

    let mut output = border('┌', '┬', '┐');
    output.push_str(&line(header.as_slice()));
    output.push_str(&border('├', '┼', '┤'));
    for row in &data[1..] {
        output.push_str(&line(row.as_slice()));
    }
    output.push_str(&border('└', '┴', '┘'));
    output
}

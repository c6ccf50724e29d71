//! Reader layer: loads tabular files into [`Table`]s

mod csv;
mod excel;
mod json;
mod parquet;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::ReadOptions;
use crate::error::{CompareError, Result};
use crate::model::{CellType, CellValue, Table};

pub use self::csv::CsvParser;
pub use self::excel::ExcelParser;
pub use self::json::JsonParser;
pub use self::parquet::ParquetParser;

/// Trait for parsing tabular data files
pub trait Parser: Send + Sync {
    /// Parse a file and return a Table
    fn parse(&self, path: &Path, options: &ReadOptions) -> anyhow::Result<Table>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;

    /// Short name of the format, e.g. "csv"
    fn format_name(&self) -> &'static str;
}

/// What the reader learned about a file's columns
#[derive(Debug, Clone, Serialize)]
pub struct ColumnMetadata {
    pub source: PathBuf,
    pub format: &'static str,
    /// Column name to type, in file order
    pub column_types: IndexMap<String, CellType>,
}

impl ColumnMetadata {
    fn describe(source: &Path, format: &'static str, table: &Table) -> Self {
        Self {
            source: source.to_path_buf(),
            format,
            column_types: table
                .columns
                .iter()
                .map(|c| (c.name.clone(), c.inferred_type))
                .collect(),
        }
    }
}

/// Datetime or date written in one of the ISO layouts the readers accept
pub(crate) fn parse_temporal(text: &str) -> Option<CellValue> {
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(CellValue::DateTime)
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(CellValue::Date)
        })
}

/// Factory for picking a parser based on file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(CsvParser),
                Box::new(ExcelParser),
                Box::new(ParquetParser),
                Box::new(JsonParser),
            ],
        }
    }

    fn extension(path: &Path) -> String {
        path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase()
    }

    /// Whether some parser handles this path's extension
    pub fn supports(&self, path: &Path) -> bool {
        let ext = Self::extension(path);
        self.parsers.iter().any(|p| p.supports_extension(&ext))
    }

    /// Get a parser for the given file path
    pub fn get_parser(&self, path: &Path) -> Result<&dyn Parser> {
        let ext = Self::extension(path);
        self.parsers
            .iter()
            .find(|p| p.supports_extension(&ext))
            .map(|p| p.as_ref())
            .ok_or_else(|| CompareError::unsupported_format(path))
    }

    /// Read a file into a table, along with its column metadata
    pub fn read(&self, path: &Path, options: &ReadOptions) -> Result<(Table, ColumnMetadata)> {
        if !path.exists() {
            return Err(CompareError::path_not_found(path));
        }
        let parser = self.get_parser(path)?;
        log::debug!("Reading {} as {}", path.display(), parser.format_name());

        let table = parser
            .parse(path, options)
            .map_err(|e| CompareError::read(path, &e))?;
        let metadata = ColumnMetadata::describe(path, parser.format_name(), &table);
        Ok((table, metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.sas7bdat");
        std::fs::write(&path, b"not really").expect("write");

        let err = ParserFactory::new()
            .read(&path, &ReadOptions::default())
            .expect_err("extension is not supported");
        assert!(matches!(err, CompareError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_file_is_path_not_found() {
        let err = ParserFactory::new()
            .read(Path::new("/definitely/not/here.csv"), &ReadOptions::default())
            .expect_err("file does not exist");
        assert!(matches!(err, CompareError::PathNotFound { .. }));
    }

    #[test]
    fn test_parse_temporal_layouts() {
        assert!(matches!(parse_temporal("2024-03-01"), Some(CellValue::Date(_))));
        assert!(matches!(parse_temporal("2024-03-01T08:30:00"), Some(CellValue::DateTime(_))));
        assert!(matches!(parse_temporal("2024-03-01 08:30:00.250"), Some(CellValue::DateTime(_))));
        assert!(parse_temporal("03/01/2024").is_none());
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let factory = ParserFactory::new();
        assert!(factory.supports(Path::new("DEMO.CSV")));
        assert!(factory.supports(Path::new("adsl.Parquet")));
        assert!(!factory.supports(Path::new("notes")));
    }

    #[test]
    fn test_read_returns_metadata() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("demo.csv");
        std::fs::write(&path, "id,name\n1,a\n2,b\n").expect("write");

        let (table, meta) = ParserFactory::new()
            .read(&path, &ReadOptions::default())
            .expect("csv parses");
        assert_eq!(table.row_count(), 2);
        assert_eq!(meta.format, "csv");
        assert_eq!(meta.column_types.get("id"), Some(&CellType::Int));
        assert_eq!(meta.column_types.get("name"), Some(&CellType::String));

        let json = serde_json::to_value(&meta).expect("metadata serializes");
        assert_eq!(json["format"], "csv");
        assert_eq!(json["column_types"], serde_json::json!({"id": "int", "name": "string"}));
    }
}

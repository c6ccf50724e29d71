//! Parquet file parser

use std::borrow::Cow;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType as ArrowType, Date32Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type,
    Int8Type, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::config::ReadOptions;
use crate::model::{CellType, CellValue, Column, Table};

use super::Parser;

/// Days from 0001-01-01 (CE) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Parser for Parquet files
pub struct ParquetParser;

impl Parser for ParquetParser {
    fn parse(&self, path: &Path, _options: &ReadOptions) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open Parquet file: {}", path.display()))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .context("Failed to create Parquet reader")?;

        let schema = builder.schema().clone();
        let reader = builder.build().context("Failed to build Parquet reader")?;

        // Declared types win over inference for parquet
        let columns: Vec<Column> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, field)| {
                Column::with_type(field.name().clone(), i, arrow_type_to_cell_type(field.data_type()))
            })
            .collect();

        let mut table = Table::new(columns);

        let mut line_num = 0usize;
        for batch_result in reader {
            let batch = batch_result.context("Failed to read Parquet batch")?;

            for row_idx in 0..batch.num_rows() {
                line_num += 1;
                let cells: Vec<CellValue> = batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell_value(col, row_idx))
                    .collect();

                table.add_row(cells, line_num);
            }
        }

        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "parquet" | "pq")
    }

    fn format_name(&self) -> &'static str {
        "parquet"
    }
}

fn arrow_type_to_cell_type(arrow_type: &ArrowType) -> CellType {
    match arrow_type {
        ArrowType::Null => CellType::Null,
        ArrowType::Boolean => CellType::Bool,
        ArrowType::Int8
        | ArrowType::Int16
        | ArrowType::Int32
        | ArrowType::Int64
        | ArrowType::UInt8
        | ArrowType::UInt16
        | ArrowType::UInt32
        | ArrowType::UInt64 => CellType::Int,
        ArrowType::Float16 | ArrowType::Float32 | ArrowType::Float64 => CellType::Float,
        ArrowType::Utf8 | ArrowType::LargeUtf8 => CellType::String,
        ArrowType::Date32 | ArrowType::Date64 => CellType::Date,
        ArrowType::Timestamp(_, _) => CellType::DateTime,
        _ => CellType::String, // Fallback to string for complex types
    }
}

macro_rules! int_cell {
    ($array:expr, $row:expr, $ty:ty) => {
        $array
            .as_primitive_opt::<$ty>()
            .map(|arr| CellValue::Int(i64::from(arr.value($row))))
    };
}

fn extract_cell_value(array: &ArrayRef, row_idx: usize) -> CellValue {
    if array.is_null(row_idx) {
        return CellValue::Null;
    }

    let value = match array.data_type() {
        ArrowType::Boolean => array
            .as_boolean_opt()
            .map(|arr| CellValue::Bool(arr.value(row_idx))),
        ArrowType::Int8 => int_cell!(array, row_idx, Int8Type),
        ArrowType::Int16 => int_cell!(array, row_idx, Int16Type),
        ArrowType::Int32 => int_cell!(array, row_idx, Int32Type),
        ArrowType::Int64 => int_cell!(array, row_idx, Int64Type),
        ArrowType::UInt8 => int_cell!(array, row_idx, UInt8Type),
        ArrowType::UInt16 => int_cell!(array, row_idx, UInt16Type),
        ArrowType::UInt32 => int_cell!(array, row_idx, UInt32Type),
        ArrowType::UInt64 => array.as_primitive_opt::<UInt64Type>().map(|arr| {
            let v = arr.value(row_idx);
            i64::try_from(v).map_or(CellValue::Float(v as f64), CellValue::Int)
        }),
        ArrowType::Float32 => array
            .as_primitive_opt::<Float32Type>()
            .map(|arr| CellValue::Float(f64::from(arr.value(row_idx)))),
        ArrowType::Float64 => array
            .as_primitive_opt::<Float64Type>()
            .map(|arr| CellValue::Float(arr.value(row_idx))),
        ArrowType::Utf8 => array
            .as_string_opt::<i32>()
            .map(|arr| CellValue::String(Cow::Owned(arr.value(row_idx).to_string()))),
        ArrowType::LargeUtf8 => array
            .as_string_opt::<i64>()
            .map(|arr| CellValue::String(Cow::Owned(arr.value(row_idx).to_string()))),
        ArrowType::Date32 => array.as_primitive_opt::<Date32Type>().and_then(|arr| {
            let days = arr.value(row_idx);
            chrono::NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
                .map(CellValue::Date)
        }),
        ArrowType::Timestamp(unit, _) => timestamp_nanos(array, row_idx, unit).map(|nanos| {
            CellValue::DateTime(chrono::DateTime::from_timestamp_nanos(nanos).naive_utc())
        }),
        _ => None,
    };

    value.unwrap_or_else(|| format_fallback(array, row_idx))
}

fn timestamp_nanos(array: &ArrayRef, row_idx: usize, unit: &TimeUnit) -> Option<i64> {
    match unit {
        TimeUnit::Second => array
            .as_primitive_opt::<TimestampSecondType>()?
            .value(row_idx)
            .checked_mul(1_000_000_000),
        TimeUnit::Millisecond => array
            .as_primitive_opt::<TimestampMillisecondType>()?
            .value(row_idx)
            .checked_mul(1_000_000),
        TimeUnit::Microsecond => array
            .as_primitive_opt::<TimestampMicrosecondType>()?
            .value(row_idx)
            .checked_mul(1_000),
        TimeUnit::Nanosecond => Some(
            array
                .as_primitive_opt::<TimestampNanosecondType>()?
                .value(row_idx),
        ),
    }
}

/// Render any other arrow type through arrow's own formatter
fn format_fallback(array: &ArrayRef, row_idx: usize) -> CellValue {
    match ArrayFormatter::try_new(array.as_ref(), &FormatOptions::default()) {
        Ok(fmt) => CellValue::String(Cow::Owned(fmt.value(row_idx).to_string())),
        Err(_) => CellValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int32Array, StringArray};

    use super::*;

    #[test]
    fn test_extract_cell_value() {
        let ints: ArrayRef = Arc::new(Int32Array::from(vec![Some(7), None]));
        let floats: ArrayRef = Arc::new(Float64Array::from(vec![1.5]));
        let strings: ArrayRef = Arc::new(StringArray::from(vec!["F"]));

        assert_eq!(extract_cell_value(&ints, 0), CellValue::Int(7));
        assert!(extract_cell_value(&ints, 1).is_null());
        assert_eq!(extract_cell_value(&floats, 0), CellValue::Float(1.5));
        assert_eq!(extract_cell_value(&strings, 0), CellValue::from("F"));
    }

    #[test]
    fn test_arrow_type_mapping() {
        assert_eq!(arrow_type_to_cell_type(&ArrowType::UInt16), CellType::Int);
        assert_eq!(arrow_type_to_cell_type(&ArrowType::Float32), CellType::Float);
        assert_eq!(arrow_type_to_cell_type(&ArrowType::Date32), CellType::Date);
    }
}

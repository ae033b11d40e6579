//! Helpers for pulling typed values out of query results.
//!
//! Warehouses disagree on result types (`COUNT(*)` is `Int64` in DataFusion
//! and `NUMBER` in Snowflake), so every accessor casts to its target Arrow
//! type before reading.

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type, UInt64Type};
use arrow::record_batch::RecordBatch;

use crate::error::{CatalogError, Result};

/// Finds a column by name, ignoring ASCII case.
pub fn column_by_name<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a ArrayRef> {
    batch
        .schema()
        .fields()
        .iter()
        .position(|f| f.name().eq_ignore_ascii_case(name))
        .map(|idx| batch.column(idx))
}

/// Like [`column_by_name`] but fails when the column is missing.
pub fn required_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    column_by_name(batch, name)
        .ok_or_else(|| CatalogError::invalid_data(format!("Result is missing column '{name}'")))
}

/// Reads every value of an integer-like column as `u64`.
pub fn u64_values(array: &ArrayRef) -> Result<Vec<Option<u64>>> {
    let casted = cast(array, &DataType::UInt64)?;
    Ok(casted.as_primitive::<UInt64Type>().iter().collect())
}

/// Reads every value of a numeric column as `i64`.
pub fn i64_values(array: &ArrayRef) -> Result<Vec<Option<i64>>> {
    let casted = cast(array, &DataType::Int64)?;
    Ok(casted.as_primitive::<Int64Type>().iter().collect())
}

/// Reads every value of a numeric column as `f64`.
pub fn f64_values(array: &ArrayRef) -> Result<Vec<Option<f64>>> {
    let casted = cast(array, &DataType::Float64)?;
    Ok(casted.as_primitive::<Float64Type>().iter().collect())
}

/// Renders every value of a column as a string.
///
/// Dates and timestamps use Arrow's display format (`2024-01-31`,
/// `2024-01-31T12:00:00`).
pub fn string_values(array: &ArrayRef) -> Result<Vec<Option<String>>> {
    let casted = cast(array, &DataType::Utf8)?;
    Ok(casted
        .as_string::<i32>()
        .iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Returns the first batch that has at least one row.
pub fn first_row(batches: &[RecordBatch]) -> Option<&RecordBatch> {
    batches.iter().find(|b| b.num_rows() > 0)
}

fn first_value<T>(
    batches: &[RecordBatch],
    col_idx: usize,
    read: impl Fn(&ArrayRef) -> Result<Vec<Option<T>>>,
) -> Result<Option<T>> {
    let Some(batch) = first_row(batches) else {
        return Ok(None);
    };
    if col_idx >= batch.num_columns() {
        return Err(CatalogError::invalid_data(format!(
            "Expected at least {} result columns, got {}",
            col_idx + 1,
            batch.num_columns()
        )));
    }
    let column = batch.column(col_idx).slice(0, 1);
    Ok(read(&column)?.into_iter().next().flatten())
}

/// Reads a non-null `u64` from the first row, e.g. a `COUNT`.
pub fn scalar_u64(batches: &[RecordBatch], col_idx: usize, col_name: &str) -> Result<u64> {
    first_value(batches, col_idx, u64_values)?
        .ok_or_else(|| CatalogError::invalid_data(format!("Null value in {col_name} column")))
}

/// Reads a nullable `f64` from the first row, e.g. an `AVG`.
pub fn scalar_f64(batches: &[RecordBatch], col_idx: usize) -> Result<Option<f64>> {
    first_value(batches, col_idx, f64_values)
}

/// Reads a nullable string rendering from the first row, e.g. a `MIN`.
pub fn scalar_string(batches: &[RecordBatch], col_idx: usize) -> Result<Option<String>> {
    first_value(batches, col_idx, string_values)
}

/// Collects the non-null string renderings of one column across all batches.
pub fn collect_strings(batches: &[RecordBatch], col_idx: usize) -> Result<Vec<String>> {
    let mut values = Vec::new();
    for batch in batches {
        if batch.num_rows() == 0 {
            continue;
        }
        if col_idx >= batch.num_columns() {
            return Err(CatalogError::invalid_data(format!(
                "Expected at least {} result columns, got {}",
                col_idx + 1,
                batch.num_columns()
            )));
        }
        values.extend(string_values(batch.column(col_idx))?.into_iter().flatten());
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Date32Array, Float64Array, Int64Array, NullArray, StringArray};
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    fn batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("CNT", DataType::Int64, true),
            Field::new("avg", DataType::Float64, true),
            Field::new("label", DataType::Utf8, true),
            Field::new("day", DataType::Date32, true),
            Field::new("nothing", DataType::Null, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![Some(42), None])),
                Arc::new(Float64Array::from(vec![None, Some(1.5)])),
                Arc::new(StringArray::from(vec![Some("a"), None])),
                Arc::new(Date32Array::from(vec![Some(19_723), None])),
                Arc::new(NullArray::new(2)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_scalars_from_first_row() {
        let batches = vec![batch()];
        assert_eq!(scalar_u64(&batches, 0, "cnt").unwrap(), 42);
        assert_eq!(scalar_f64(&batches, 1).unwrap(), None);
        assert_eq!(scalar_string(&batches, 2).unwrap().as_deref(), Some("a"));
        assert_eq!(
            scalar_string(&batches, 3).unwrap().as_deref(),
            Some("2024-01-01")
        );
        assert_eq!(scalar_string(&batches, 4).unwrap(), None);
    }

    #[test]
    fn test_scalar_on_empty_result() {
        assert_eq!(scalar_f64(&[], 0).unwrap(), None);
        assert!(scalar_u64(&[], 0, "count").is_err());
    }

    #[test]
    fn test_column_lookup_is_case_insensitive() {
        let batch = batch();
        assert!(column_by_name(&batch, "cnt").is_some());
        assert!(column_by_name(&batch, "LABEL").is_some());
        assert!(required_column(&batch, "comment").is_err());
    }

    #[test]
    fn test_null_array_reads_as_nulls() {
        let batch = batch();
        let values = string_values(required_column(&batch, "nothing").unwrap()).unwrap();
        assert_eq!(values, vec![None, None]);
    }

    #[test]
    fn test_collect_strings_skips_nulls() {
        let batches = vec![batch(), batch()];
        assert_eq!(collect_strings(&batches, 2).unwrap(), vec!["a", "a"]);
    }

    #[test]
    fn test_out_of_range_column() {
        assert!(scalar_f64(&[batch()], 9).is_err());
    }
}

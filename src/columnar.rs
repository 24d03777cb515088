//! Arrow output adapter.
//!
//! Maps a [`TypedTable`] onto an Arrow [`RecordBatch`] so it can be handed
//! to any Arrow-speaking writer (Parquet, Iceberg, IPC):
//!
//! | [`ColumnType`] | Arrow type |
//! |----------------|------------|
//! | Boolean        | `Boolean`  |
//! | Integer        | `Int64`    |
//! | Float          | `Float64`  |
//! | String         | `Utf8`     |
//!
//! Every field is nullable. Requires the `arrow` feature.

use crate::resolve::{ColumnType, TypedCell, TypedColumn, TypedTable};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use std::sync::Arc;

/// Arrow type for a resolved column type
pub fn data_type(column_type: ColumnType) -> DataType {
    match column_type {
        ColumnType::Boolean => DataType::Boolean,
        ColumnType::Integer => DataType::Int64,
        ColumnType::Float => DataType::Float64,
        ColumnType::String => DataType::Utf8,
    }
}

/// Arrow schema for a table, fields in column order
pub fn schema(table: &TypedTable) -> Schema {
    let fields: Vec<Field> = table
        .columns()
        .iter()
        .map(|column| Field::new(column.name(), data_type(column.column_type()), true))
        .collect();
    Schema::new(fields)
}

/// Convert a typed table into a single record batch
///
/// A table without columns still carries its row count.
///
/// # Errors
/// Returns the Arrow error if the arrays do not agree with the schema.
pub fn to_record_batch(table: &TypedTable) -> Result<RecordBatch, ArrowError> {
    let schema = Arc::new(schema(table));
    let arrays: Vec<ArrayRef> = table.columns().iter().map(to_array).collect();
    let options = RecordBatchOptions::new().with_row_count(Some(table.num_rows()));
    RecordBatch::try_new_with_options(schema, arrays, &options)
}

fn to_array(column: &TypedColumn) -> ArrayRef {
    let cells = column.cells();
    match column.column_type() {
        ColumnType::Boolean => Arc::new(cells.iter().map(TypedCell::as_bool).collect::<BooleanArray>()),
        ColumnType::Integer => Arc::new(cells.iter().map(TypedCell::as_i64).collect::<Int64Array>()),
        ColumnType::Float => Arc::new(cells.iter().map(TypedCell::as_f64).collect::<Float64Array>()),
        ColumnType::String => Arc::new(cells.iter().map(TypedCell::as_str).collect::<StringArray>()),
    }
}

//! # Ingot - JSON to typed tables
//!
//! Turns arbitrarily nested JSON payloads, as returned by SaaS and REST
//! APIs, into a flat, strongly typed, column-oriented table ready for a
//! columnar writer.
//!
//! ## Modules
//!
//! - **extract**: find the records inside a document (array, `data` envelope, or single object)
//! - **flatten**: collapse each record into dot-delimited scalar columns
//! - **resolve**: pick one type per column and coerce every cell to it
//! - **columnar** (feature `arrow`): map a typed table onto an Arrow `RecordBatch`
//!
//! ## Quick Start
//!
//! ```rust
//! use ingot::{ingest, ColumnType, IngestConfig, TypedCell};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let data = json!([
//!     {"id": 1, "addr": {"city": "NYC", "zip": null}},
//!     {"id": 2, "addr": {"city": "LA", "zip": "90001"}}
//! ]);
//!
//! let table = ingest(data, &IngestConfig::default())?;
//!
//! assert_eq!(table.column_type("id"), Some(ColumnType::Integer));
//! assert_eq!(table.column_type("addr.zip"), Some(ColumnType::String));
//! assert_eq!(table.column("addr.zip").unwrap().get(0), Some(&TypedCell::Null));
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::{BufReader, Read};
use tracing::info;

pub mod extract;
pub mod flatten;
pub mod resolve;

#[cfg(feature = "arrow")]
pub mod columnar;

// Re-export commonly used types for convenience
pub use extract::{extract, select_path, ExtractError, JsonKind, RecordSet};
pub use flatten::{flatten, FlatRow, FlatTable, FlattenConfig, Flattener, Scalar};
pub use resolve::{
    resolve, ColumnType, ResolveConfig, SchemaField, TypeResolver, TypedCell, TypedColumn,
    TypedTable,
};

/// Configuration for a full ingestion run
#[derive(Debug, Clone, Default)]
pub struct IngestConfig {
    pub flatten: FlattenConfig,

    pub resolve: ResolveConfig,

    /// Where the records live, overriding detection (`results.items` or `/results/items`)
    pub record_path: Option<String>,
}

/// Main entry point: detect, flatten, and type the records in a parsed document
pub fn ingest(root: Value, config: &IngestConfig) -> Result<TypedTable, ExtractError> {
    let root = match &config.record_path {
        Some(path) => select_path(root, path)?,
        None => root,
    };

    let records = extract(root)?;
    let flat = Flattener::new(config.flatten.clone()).flatten(records);
    let table = TypeResolver::new(config.resolve.clone()).resolve(flat);

    info!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        "ingested JSON document"
    );
    Ok(table)
}

/// Parse one JSON document from `reader` and ingest it
///
/// The reader is buffered internally, so a bare `File` is fine.
pub fn ingest_reader<R: Read>(reader: R, config: &IngestConfig) -> Result<TypedTable> {
    let root: Value =
        serde_json::from_reader(BufReader::new(reader)).context("Failed to parse JSON")?;
    Ok(ingest(root, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_basic_ingest() {
        let input = json!({
            "data": [
                {"id": 1, "user": {"name": "Alice"}, "tags": ["a"]},
                {"id": 2, "user": {"name": "Bob"}, "tags": []}
            ],
            "meta": {"page": 1}
        });

        let table = ingest(input, &IngestConfig::default()).unwrap();

        assert_eq!(table.num_rows(), 2);
        let names: Vec<&str> = table.columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["id", "user.name", "tags.0"]);
        assert_eq!(table.column("tags.0").unwrap().get(1), Some(&TypedCell::Null));
    }

    #[test]
    fn test_record_path_override() {
        let input = json!({"results": [{"id": 1}, {"id": 2}], "count": 2});
        let config = IngestConfig {
            record_path: Some("results".to_string()),
            ..IngestConfig::default()
        };

        let table = ingest(input, &config).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.num_columns(), 1);
    }

    #[test]
    fn test_empty_data_page_keeps_envelope_fields() {
        let table = ingest(json!({"data": [], "x": 1}), &IngestConfig::default()).unwrap();

        assert_eq!(table.num_rows(), 1);
        let names: Vec<&str> = table.columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["x"]);
        assert_eq!(table.column_type("x"), Some(ColumnType::Integer));
    }

    #[test]
    fn test_unrecognized_shape_is_surfaced() {
        let err = ingest(json!("nope"), &IngestConfig::default()).unwrap_err();
        assert_eq!(err, ExtractError::UnrecognizedShape(JsonKind::String));
    }

    #[test]
    fn test_ingest_reader_rejects_malformed_json() {
        let err = ingest_reader("{not json".as_bytes(), &IngestConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }

    #[test]
    fn test_ingest_reader() {
        let table = ingest_reader(r#"{"name": "x", "score": null}"#.as_bytes(), &IngestConfig::default())
            .unwrap();
        assert_eq!(table.column_type("score"), Some(ColumnType::String));
    }
}

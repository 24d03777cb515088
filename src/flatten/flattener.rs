use crate::extract::RecordSet;
use crate::flatten::types::{FlatRow, FlatTable, FlattenConfig, Scalar};
use rayon::prelude::*;
use serde_json::{Map, Value};
use tracing::debug;

/// Collapses nested records into dot-delimited scalar columns
///
/// Objects recurse under `prefix.key`, arrays under `prefix.index`, and
/// scalars end the path. Records that disagree about a field's shape are
/// not reconciled: `addr` and `addr.city` simply become two columns.
pub struct Flattener {
    config: FlattenConfig,
}

impl Flattener {
    pub fn new(config: FlattenConfig) -> Self {
        Flattener { config }
    }

    pub fn config(&self) -> &FlattenConfig {
        &self.config
    }

    /// Flatten every record into one row each
    ///
    /// Rows come back in record order whether or not they were flattened in
    /// parallel, and the column union is computed from that order.
    pub fn flatten(&self, records: RecordSet) -> FlatTable {
        let records = records.into_inner();
        let parallel = self.config.parallel && records.len() >= self.config.parallel_threshold;

        let rows: Vec<FlatRow> = if parallel {
            records
                .into_par_iter()
                .map(|record| self.flatten_record(record))
                .collect()
        } else {
            records
                .into_iter()
                .map(|record| self.flatten_record(record))
                .collect()
        };

        let table = FlatTable::from_rows(rows);
        debug!(
            rows = table.len(),
            columns = table.columns().len(),
            parallel,
            "flattened records"
        );
        table
    }

    /// Flatten a single record
    pub fn flatten_record(&self, record: Map<String, Value>) -> FlatRow {
        let mut row = FlatRow::new();
        let mut path = String::new();
        self.flatten_object(record, &mut path, 0, &mut row);
        row
    }

    fn flatten_value(&self, value: Value, path: &mut String, depth: usize, row: &mut FlatRow) {
        match value {
            Value::Object(obj) => self.flatten_object(obj, path, depth, row),
            Value::Array(items) => {
                // An empty array contributes no columns
                for (idx, item) in items.into_iter().enumerate() {
                    self.descend(item, &idx.to_string(), path, depth, row);
                }
            }
            Value::Null => row.insert(path.as_str(), Scalar::Null),
            Value::Bool(b) => row.insert(path.as_str(), Scalar::Bool(b)),
            Value::Number(n) => row.insert(path.as_str(), Scalar::Number(n)),
            Value::String(s) => row.insert(path.as_str(), Scalar::String(s)),
        }
    }

    fn flatten_object(
        &self,
        obj: Map<String, Value>,
        path: &mut String,
        depth: usize,
        row: &mut FlatRow,
    ) {
        for (key, value) in obj.into_iter() {
            self.descend(value, &key, path, depth, row);
        }
    }

    /// Recurse into `value` with `segment` appended to the path, then restore it
    fn descend(
        &self,
        value: Value,
        segment: &str,
        path: &mut String,
        depth: usize,
        row: &mut FlatRow,
    ) {
        let mark = path.len();
        if depth > 0 {
            path.push_str(&self.config.separator);
        }
        path.push_str(segment);

        self.flatten_value(value, path, depth + 1, row);

        path.truncate(mark);
    }
}

impl Default for Flattener {
    fn default() -> Self {
        Flattener::new(FlattenConfig::default())
    }
}

/// Flatten with the default configuration
pub fn flatten(records: RecordSet) -> FlatTable {
    Flattener::default().flatten(records)
}

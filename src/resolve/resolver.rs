use crate::flatten::{FlatRow, FlatTable, Scalar};
use crate::resolve::types::{ColumnType, TypedCell, TypedColumn, TypedTable};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Configuration for type resolution
#[derive(Debug, Clone)]
pub struct ResolveConfig {
    /// Resolve columns on the rayon pool
    pub parallel: bool,

    /// Minimum column count before going parallel
    pub parallel_threshold: usize,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        ResolveConfig {
            parallel: true,
            parallel_threshold: 64,
        }
    }
}

/// Picks one type per column and coerces every cell to it
///
/// Runs in two passes: the flat rows are first split into columns, then
/// each column is classified over all of its values before any cell is
/// coerced. A column with no non-null value resolves to String.
pub struct TypeResolver {
    config: ResolveConfig,
}

impl TypeResolver {
    pub fn new(config: ResolveConfig) -> Self {
        TypeResolver { config }
    }

    pub fn resolve(&self, table: FlatTable) -> TypedTable {
        let (names, rows) = table.into_parts();
        let num_rows = rows.len();
        let cells = split_columns(&names, rows);
        let parallel = self.config.parallel && names.len() >= self.config.parallel_threshold;

        let columns: Vec<TypedColumn> = if parallel {
            names
                .into_par_iter()
                .zip(cells.into_par_iter())
                .map(|(name, cells)| resolve_column(name, cells))
                .collect()
        } else {
            names
                .into_iter()
                .zip(cells)
                .map(|(name, cells)| resolve_column(name, cells))
                .collect()
        };

        debug!(
            rows = num_rows,
            columns = columns.len(),
            parallel,
            "resolved column types"
        );
        TypedTable::new(columns, num_rows)
    }
}

impl Default for TypeResolver {
    fn default() -> Self {
        TypeResolver::new(ResolveConfig::default())
    }
}

/// Resolve with the default configuration
pub fn resolve(table: FlatTable) -> TypedTable {
    TypeResolver::default().resolve(table)
}

/// The type a column resolves to, given all of its cells
pub fn classify<'a>(cells: impl IntoIterator<Item = &'a Scalar>) -> ColumnType {
    widest(cells).unwrap_or(ColumnType::String)
}

/// Least upper bound of the non-null cells, `None` when there are none
fn widest<'a>(cells: impl IntoIterator<Item = &'a Scalar>) -> Option<ColumnType> {
    cells
        .into_iter()
        .filter_map(ColumnType::observe)
        .reduce(ColumnType::widen)
}

/// Whether a String column is holding booleans or numbers that will be rendered as text
fn has_non_text(cells: &[Scalar]) -> bool {
    cells
        .iter()
        .any(|cell| matches!(cell, Scalar::Bool(_) | Scalar::Number(_)))
}

/// Transpose rows into one cell vector per column, absent cells as Null
fn split_columns(names: &[String], rows: Vec<FlatRow>) -> Vec<Vec<Scalar>> {
    let index: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();

    let mut columns: Vec<Vec<Scalar>> = vec![vec![Scalar::Null; rows.len()]; names.len()];
    for (row_idx, row) in rows.into_iter().enumerate() {
        for (path, value) in row.into_cells() {
            if let Some(&col_idx) = index.get(path.as_str()) {
                columns[col_idx][row_idx] = value;
            }
        }
    }

    columns
}

fn resolve_column(name: String, cells: Vec<Scalar>) -> TypedColumn {
    let column_type = match widest(&cells) {
        Some(ColumnType::String) => {
            if has_non_text(&cells) {
                debug!(column = %name, "mixed-kind column widened to string");
            }
            ColumnType::String
        }
        Some(column_type) => column_type,
        None => {
            debug!(column = %name, "all-null column defaulted to string");
            ColumnType::String
        }
    };
    trace!(column = %name, %column_type, "column resolved");

    let cells = cells
        .into_iter()
        .map(|cell| TypedCell::coerce(cell, column_type))
        .collect();

    TypedColumn::new(name, column_type, cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::flatten::flatten;
    use serde_json::{json, Value};

    fn typed(value: Value) -> TypedTable {
        resolve(flatten(extract(value).unwrap()))
    }

    #[test]
    fn test_single_kind_columns() {
        let table = typed(json!([
            {"b": true, "i": 1, "f": 1.5, "s": "x"},
            {"b": false, "i": 2, "f": 2.5, "s": "y"}
        ]));

        assert_eq!(table.column_type("b"), Some(ColumnType::Boolean));
        assert_eq!(table.column_type("i"), Some(ColumnType::Integer));
        assert_eq!(table.column_type("f"), Some(ColumnType::Float));
        assert_eq!(table.column_type("s"), Some(ColumnType::String));
    }

    #[test]
    fn test_all_null_column_defaults_to_string() {
        let table = typed(json!([{"a": null}, {"a": null, "b": 1}]));

        let column = table.column("a").unwrap();
        assert_eq!(column.column_type(), ColumnType::String);
        assert_eq!(column.cells(), &[TypedCell::Null, TypedCell::Null]);
    }

    #[test]
    fn test_absent_cells_count_as_null() {
        let table = typed(json!([{"a": 1}, {"b": 2}]));

        assert_eq!(table.column("a").unwrap().cells(), &[TypedCell::Integer(1), TypedCell::Null]);
        assert_eq!(table.column("b").unwrap().cells(), &[TypedCell::Null, TypedCell::Integer(2)]);
    }

    #[test]
    fn test_single_fraction_forces_float() {
        let table = typed(json!([{"n": 1}, {"n": 2}, {"n": 2.5}]));

        let column = table.column("n").unwrap();
        assert_eq!(column.column_type(), ColumnType::Float);
        assert_eq!(
            column.cells(),
            &[TypedCell::Float(1.0), TypedCell::Float(2.0), TypedCell::Float(2.5)]
        );
    }

    #[test]
    fn test_boolean_and_number_widen_to_string() {
        let table = typed(json!([{"v": true}, {"v": 3}]));

        let column = table.column("v").unwrap();
        assert_eq!(column.column_type(), ColumnType::String);
        assert_eq!(
            column.cells(),
            &[TypedCell::String("true".to_string()), TypedCell::String("3".to_string())]
        );
    }

    #[test]
    fn test_string_and_number_widen_to_string() {
        let table = typed(json!([{"zip": 90001}, {"zip": "10001-1234"}, {"zip": null}]));

        let column = table.column("zip").unwrap();
        assert_eq!(column.column_type(), ColumnType::String);
        assert_eq!(column.get(0), Some(&TypedCell::String("90001".to_string())));
        assert_eq!(column.get(2), Some(&TypedCell::Null));
    }

    #[test]
    fn test_classify_empty_is_string() {
        assert_eq!(classify(std::iter::empty()), ColumnType::String);
        assert_eq!(classify(&[Scalar::Null, Scalar::Null]), ColumnType::String);
    }

    #[test]
    fn test_column_order_survives_parallel_resolution() {
        let rows: Vec<Value> = (0..5)
            .map(|r| {
                let obj: serde_json::Map<String, Value> =
                    (0..100).map(|c| (format!("c{}", c), json!(r * c))).collect();
                Value::Object(obj)
            })
            .collect();
        let flat = flatten(extract(Value::Array(rows)).unwrap());
        let expected: Vec<String> = flat.columns().to_vec();

        let table = TypeResolver::new(ResolveConfig {
            parallel: true,
            parallel_threshold: 0,
        })
        .resolve(flat);

        let names: Vec<String> = table.columns().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_empty_table() {
        let table = typed(json!([]));
        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.num_columns(), 0);
    }

    #[test]
    fn test_widening_to_string_detects_non_text_cells() {
        let mixed = vec![Scalar::Bool(true), Scalar::Null, Scalar::String("x".into())];
        assert!(has_non_text(&mixed));
        assert_eq!(classify(&mixed), ColumnType::String);

        let text = vec![Scalar::String("x".into()), Scalar::Null];
        assert!(!has_non_text(&text));
    }
}

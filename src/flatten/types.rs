use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::{Number, Value};

/// A flattened cell: JSON scalars only
///
/// Arrays and objects never survive flattening, so they have no variant here.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

impl TryFrom<Value> for Scalar {
    type Error = Value;

    /// Arrays and objects are handed back unchanged
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Scalar::Null),
            Value::Bool(b) => Ok(Scalar::Bool(b)),
            Value::Number(n) => Ok(Scalar::Number(n)),
            Value::String(s) => Ok(Scalar::String(s)),
            nested => Err(nested),
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(b),
            Scalar::Number(n) => Value::Number(n),
            Scalar::String(s) => Value::String(s),
        }
    }
}

/// One flattened record: column path -> scalar, in traversal order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FlatRow {
    cells: IndexMap<String, Scalar>,
}

impl FlatRow {
    pub fn new() -> Self {
        FlatRow::default()
    }

    /// Set a cell; a repeated path keeps its first position and takes the new value
    pub fn insert(&mut self, path: impl Into<String>, value: Scalar) {
        self.cells.insert(path.into(), value);
    }

    pub fn get(&self, path: &str) -> Option<&Scalar> {
        self.cells.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.cells.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.cells.iter().map(|(path, value)| (path.as_str(), value))
    }

    pub fn into_cells(self) -> impl Iterator<Item = (String, Scalar)> {
        self.cells.into_iter()
    }
}

impl FromIterator<(String, Scalar)> for FlatRow {
    fn from_iter<I: IntoIterator<Item = (String, Scalar)>>(iter: I) -> Self {
        FlatRow {
            cells: iter.into_iter().collect(),
        }
    }
}

static NULL: Scalar = Scalar::Null;

/// Flattened records plus the union of every column path they use
///
/// Columns are ordered by first appearance: records in order, then paths
/// in traversal order within each record. A row without a column holds
/// Null there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatTable {
    columns: Vec<String>,
    rows: Vec<FlatRow>,
}

impl FlatTable {
    /// Build a table from rows, computing the column union after the fact
    pub fn from_rows(rows: Vec<FlatRow>) -> Self {
        let mut columns: IndexSet<String> = IndexSet::new();
        for row in &rows {
            for path in row.paths() {
                if !columns.contains(path) {
                    columns.insert(path.to_string());
                }
            }
        }

        FlatTable {
            columns: columns.into_iter().collect(),
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (`row`, `column`); absent cells read as Null
    pub fn get(&self, row: usize, column: &str) -> Option<&Scalar> {
        let row = self.rows.get(row)?;
        Some(row.get(column).unwrap_or(&NULL))
    }

    /// A copy of one row holding every column, absent ones as Null
    pub fn materialize_row(&self, index: usize) -> Option<FlatRow> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .map(|column| {
                    let value = row.get(column).cloned().unwrap_or_default();
                    (column.clone(), value)
                })
                .collect(),
        )
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<FlatRow>) {
        (self.columns, self.rows)
    }
}

/// Configuration for the flattening pass
#[derive(Debug, Clone)]
pub struct FlattenConfig {
    /// Joins path segments, including array indices
    pub separator: String,

    /// Flatten records on the rayon pool
    pub parallel: bool,

    /// Minimum record count before going parallel
    pub parallel_threshold: usize,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig {
            separator: String::from("."),
            parallel: true,
            parallel_threshold: 256,
        }
    }
}

use crate::flatten::Scalar;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// Largest magnitude at which every integer is exactly representable in an f64
const MAX_EXACT_F64_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Resolved type of a column
///
/// Widening runs Integer < Float < String. Boolean only widens to String.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Boolean,
    Integer,
    Float,
    String,
}

impl ColumnType {
    /// The narrowest type for one scalar, or `None` for Null
    pub fn observe(scalar: &Scalar) -> Option<ColumnType> {
        match scalar {
            Scalar::Null => None,
            Scalar::Bool(_) => Some(ColumnType::Boolean),
            Scalar::Number(n) if is_integral(n) => Some(ColumnType::Integer),
            Scalar::Number(_) => Some(ColumnType::Float),
            Scalar::String(_) => Some(ColumnType::String),
        }
    }

    /// Least upper bound of two types
    pub fn widen(self, other: ColumnType) -> ColumnType {
        match (self, other) {
            (a, b) if a == b => a,
            (ColumnType::Integer, ColumnType::Float) | (ColumnType::Float, ColumnType::Integer) => {
                ColumnType::Float
            }
            _ => ColumnType::String,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Boolean => "boolean",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::String => "string",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A number is integral when it has no fractional part and fits an i64 losslessly
fn is_integral(n: &Number) -> bool {
    if n.is_i64() {
        return true;
    }
    if n.is_u64() {
        // Above i64::MAX
        return false;
    }
    match n.as_f64() {
        Some(f) => f.fract() == 0.0 && f.abs() <= MAX_EXACT_F64_INTEGER,
        None => false,
    }
}

/// A cell after coercion to its column's type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedCell {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl TypedCell {
    /// Coerce a scalar into `column_type`
    ///
    /// Null stays Null. Anything that is not a matching boolean or number is
    /// rendered as text, so coercion cannot fail.
    pub fn coerce(scalar: Scalar, column_type: ColumnType) -> TypedCell {
        match (column_type, scalar) {
            (_, Scalar::Null) => TypedCell::Null,
            (ColumnType::Boolean, Scalar::Bool(b)) => TypedCell::Boolean(b),
            (ColumnType::Integer, Scalar::Number(n)) => match n.as_i64() {
                Some(i) => TypedCell::Integer(i),
                None => TypedCell::Integer(n.as_f64().unwrap_or_default() as i64),
            },
            (ColumnType::Float, Scalar::Number(n)) => {
                TypedCell::Float(n.as_f64().unwrap_or_default())
            }
            (_, scalar) => TypedCell::String(render(scalar)),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, TypedCell::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedCell::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedCell::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedCell::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedCell::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Canonical text for a scalar landing in a String column
fn render(scalar: Scalar) -> String {
    match scalar {
        Scalar::Null => String::new(),
        Scalar::Bool(b) => b.to_string(),
        Scalar::Number(n) => n.to_string(),
        Scalar::String(s) => s,
    }
}

/// One resolved column: every non-null cell conforms to `column_type`
#[derive(Debug, Clone, PartialEq)]
pub struct TypedColumn {
    name: String,
    column_type: ColumnType,
    cells: Vec<TypedCell>,
}

impl TypedColumn {
    pub fn new(name: String, column_type: ColumnType, cells: Vec<TypedCell>) -> Self {
        TypedColumn {
            name,
            column_type,
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn cells(&self) -> &[TypedCell] {
        &self.cells
    }

    pub fn get(&self, row: usize) -> Option<&TypedCell> {
        self.cells.get(row)
    }

    pub fn null_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_null()).count()
    }
}

/// Schema entry handed to the writer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub null_count: usize,
}

/// Column-oriented table with one resolved type per column
///
/// Built once per ingestion run and immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedTable {
    columns: Vec<TypedColumn>,
    num_rows: usize,
}

impl TypedTable {
    pub fn new(columns: Vec<TypedColumn>, num_rows: usize) -> Self {
        TypedTable { columns, num_rows }
    }

    pub fn columns(&self) -> &[TypedColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&TypedColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column(name).map(TypedColumn::column_type)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Ordered column names and types
    pub fn schema(&self) -> Vec<SchemaField> {
        self.columns
            .iter()
            .map(|column| SchemaField {
                name: column.name.clone(),
                column_type: column.column_type,
                null_count: column.null_count(),
            })
            .collect()
    }

    /// One row, keyed by column name in column order
    pub fn row(&self, index: usize) -> Option<IndexMap<&str, &TypedCell>> {
        if index >= self.num_rows {
            return None;
        }

        self.columns
            .iter()
            .map(|column| column.get(index).map(|cell| (column.name(), cell)))
            .collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = IndexMap<&str, &TypedCell>> + '_ {
        (0..self.num_rows).filter_map(move |index| self.row(index))
    }
}

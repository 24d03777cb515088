//! Column type resolution
//!
//! Turns the loosely typed flat table into a column-oriented table with
//! exactly one [`ColumnType`] per column. Mixed columns widen along
//! Integer < Float < String (Boolean only widens to String), and columns
//! with no type evidence at all become String so they stay writable.

pub mod types;
pub mod resolver;

pub use types::{ColumnType, SchemaField, TypedCell, TypedColumn, TypedTable};
pub use resolver::{classify, resolve, ResolveConfig, TypeResolver};

//! JSON flattening - collapse nested records into a flat table
//!
//! Each record becomes one row and each distinct key path becomes one
//! column. Nested objects and arrays are addressed with dot-delimited
//! paths (`user.address.city`, `tags.0`), so no row holds anything but
//! scalars.
//!
//! Flattening is independent per record. Large record sets are spread
//! over the rayon pool; column order is always derived from record order,
//! never from completion order.

pub mod types;
pub mod flattener;

pub use types::{FlatRow, FlatTable, FlattenConfig, Scalar};
pub use flattener::{flatten, Flattener};

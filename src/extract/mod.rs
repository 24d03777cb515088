//! Record detection - locate the records collection inside a JSON document
//!
//! SaaS and REST APIs hand back records in a few recognisable envelopes: a
//! bare array of objects, an object with the records under `data`, or a
//! single object. This module picks the records out of those shapes and
//! refuses anything else rather than guessing.

pub mod error;
pub mod detector;

pub use error::{ExtractError, JsonKind};
pub use detector::{extract, select_path, RecordSet, DATA_KEY};

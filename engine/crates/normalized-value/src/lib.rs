//! Data as it is held in, or about to be written to, a normalized cache.
//!
//! A [`DataNode`] is a plain JSON-like tree. Records keep the order their
//! fields were inserted in, so whatever reads a node back sees the same field
//! order that was written.

mod value;

pub use serde_json::Number;
pub use value::{DataNode, Record, TYPENAME_FIELD};


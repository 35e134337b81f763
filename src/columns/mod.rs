//! Columns - Descriptors and the live collection that orders them.
//!
//! - [`Column`] - One field: name, label, flags, cell type
//! - [`ColumnSpec`] - Plain description a column is built from
//! - [`Columns`] - Ordered, shared collection that emits structural events

mod collection;
mod column;

pub use collection::*;
pub use column::*;

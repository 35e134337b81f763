//! # spark-grid
//!
//! Row/cell synchronization engine for column-driven data grids.
//!
//! A [`Row`] renders one [`Record`] as a sequence of cell widgets, one per
//! column of a live [`Columns`] collection. Columns can be added, removed,
//! shown or hidden at any time; each change becomes a targeted patch of the
//! row's visual subtree instead of a rebuild.
//!
//! ## Architecture
//!
//! ```text
//! Columns ──(renderable / added / removed)──▶ Row ──▶ cells ──▶ visual tree
//! ```
//!
//! The visual tree is a thread-local node arena (see [`engine`]). Rows and
//! cells hold node ids into it and only ever touch their own subtree.
//!
//! ## Modules
//!
//! - [`types`] - Core types (NodeId, Value, ColumnFlags)
//! - [`engine`] - Visual tree: node arena and patch operations
//! - [`columns`] - Column descriptors and the live collection
//! - [`primitives`] - Widget contracts and the built-in text cell
//! - [`row`] - The row synchronizer

pub mod columns;
pub mod engine;
pub mod error;
pub mod primitives;
pub mod record;
pub mod row;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{GridError, Result};

pub use record::Record;

pub use columns::{AddOptions, CellType, Column, ColumnSpec, Columns};

pub use primitives::{CellFactory, CellWidget, Cleanup, DestroyOptions, TextCell, View};

pub use row::{ColumnSource, Row, RowOptions};

//! Primitives - Widget contracts and built-in cells.
//!
//! - [`View`] - Anything that owns a node and can render and be destroyed
//! - [`CellWidget`] - A view bound to one column and one record
//! - [`CellFactory`] - Builds cell widgets for a column
//! - [`TextCell`] - The built-in text cell
//!
//! # Lifecycle
//!
//! A widget:
//! 1. Is constructed from its column and record (no node yet)
//! 2. Creates its node on the first `render()`
//! 3. Refreshes the same node on later renders
//! 4. Releases its node on `destroy()`
//!
//! Widgets never attach their own node. The owner decides where it goes.

mod types;
mod text_cell;

pub use types::*;
pub use text_cell::{TextCell, TEXT_CELL_CLASS};

//! Placement - Map a structural index to an insertion point.
//!
//! A row has two coordinate systems:
//!
//! ```text
//! structural:  0:A   1:B   2:C   3:D      (every column)
//! attached:    A           C              (only nodes currently in the row)
//! ```
//!
//! Showing `B` must land between `A` and `C`, even though `C` is the row's
//! second child, not its third. The anchor is the first cell *after* `B` in
//! structural order whose node is attached.

use crate::types::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Insert as the first child.
    First,
    /// Insert as the last child.
    Last,
    /// Insert immediately before this attached sibling.
    Before(NodeId),
}

/// Resolve where the cell at structural `index` goes.
///
/// `attached[i]` is the node of cell `i` when it is currently a child of the
/// row, `None` otherwise. Entry `index` itself is ignored.
pub fn resolve(index: usize, attached: &[Option<NodeId>]) -> Placement {
    if index == 0 {
        return Placement::First;
    }
    if index + 1 >= attached.len() {
        return Placement::Last;
    }
    attached[index + 1..]
        .iter()
        .flatten()
        .next()
        .map_or(Placement::Last, |&anchor| Placement::Before(anchor))
}

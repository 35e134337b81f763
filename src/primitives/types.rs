//! Primitive types - Widget contracts and cleanup.
//!
//! A widget owns one root node in the visual tree. Cells and rows both speak
//! the same [`View`] contract, so a row can sit wherever a renderable,
//! destroyable unit is expected.

use std::rc::Rc;

use crate::columns::Column;
use crate::record::Record;
use crate::types::NodeId;

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by subscriptions.
///
/// Call this to unsubscribe.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Destroy Options
// =============================================================================

/// Arguments forwarded through a widget teardown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DestroyOptions {
    /// Leave visual nodes alive. Set this when an ancestor node is about to
    /// be released anyway, so each widget skips its own release.
    pub keep_nodes: bool,
}

impl DestroyOptions {
    pub fn keep_nodes() -> Self {
        Self { keep_nodes: true }
    }
}

// =============================================================================
// View - Renderable, destroyable unit
// =============================================================================

/// A renderable unit that owns one root node.
pub trait View {
    /// The widget's root node, if it has been created yet.
    fn el(&self) -> Option<NodeId>;

    /// Produce or refresh the widget's node and return it.
    ///
    /// Idempotent: rendering again replaces the previous content of the same
    /// node. Rendering never attaches the node anywhere; the caller places it.
    fn render(&mut self) -> NodeId;

    /// Tear the widget down. Consumes it, so it can only happen once.
    fn destroy(self: Box<Self>, options: DestroyOptions);
}

// =============================================================================
// Cell Widget
// =============================================================================

/// A widget rendering one (column, record) pair.
pub trait CellWidget: View {
    fn column(&self) -> &Rc<Column>;

    fn record(&self) -> &Record;
}

/// Builds cell widgets for a column.
///
/// Each column carries its factory (see [`crate::columns::CellType`]), so
/// the row never needs to know concrete cell types.
pub trait CellFactory {
    fn create(&self, column: Rc<Column>, record: Record) -> Box<dyn CellWidget>;
}

/// Any `Fn(column, record) -> Box<dyn CellWidget>` is a factory.
impl<F> CellFactory for F
where
    F: Fn(Rc<Column>, Record) -> Box<dyn CellWidget>,
{
    fn create(&self, column: Rc<Column>, record: Record) -> Box<dyn CellWidget> {
        self(column, record)
    }
}

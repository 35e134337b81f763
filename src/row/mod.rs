//! Row - Keeps a record's cells in step with its columns.
//!
//! A row owns one cell per column, in column order, and a `tr` node whose
//! children are the nodes of the cells whose column is renderable.
//!
//! # Synchronization
//!
//! The row subscribes to its [`Columns`] and patches itself per event, never
//! rebuilding:
//! - Renderable changed: render + insert, or detach (the cell survives)
//! - Added: build a cell, splice it in at the column's index, insert if visible
//! - Removed: detach, drop from the cell list, destroy
//!
//! Invariants, held between any two events:
//! - `cells[i].column()` is `columns.at(i)` for every `i`
//! - the row node's children are exactly the renderable cells' nodes, in
//!   column order (unless an `add` deferred rendering)
//!
//! # Example
//!
//! ```ignore
//! use spark_grid::{CellType, ColumnSpec, Record, Row, RowOptions};
//!
//! let row = Row::new(RowOptions::new(
//!     vec![
//!         ColumnSpec::new("name", CellType::Text),
//!         ColumnSpec::new("age", CellType::Text).hidden(),
//!     ],
//!     Record::new().with("name", "Ada").with("age", 36),
//! ))?;
//!
//! row.render();                                   // <tr><td>Ada</td></tr>
//! row.columns().set_renderable("age", true)?;     // <tr><td>Ada</td><td>36</td></tr>
//! row.destroy(Default::default());
//! ```
//!
//! # Re-entrancy
//!
//! Column events must not be triggered from inside a cell's `render()`;
//! the row's state is mutably borrowed while it patches and such an event
//! panics on the borrow.

mod placement;

pub use placement::{resolve, Placement};

use std::cell::RefCell;
use std::rc::Rc;

use crate::columns::{AddOptions, Column, ColumnSpec, Columns};
use crate::engine;
use crate::error::{GridError, Result};
use crate::primitives::{CellWidget, Cleanup, DestroyOptions, View};
use crate::record::Record;
use crate::types::NodeId;

// =============================================================================
// Options
// =============================================================================

/// Where a row gets its columns from.
pub enum ColumnSource {
    /// A live collection, shared with whoever else holds it.
    Live(Columns),
    /// Plain specs, wrapped into a new collection owned by the row.
    Specs(Vec<ColumnSpec>),
}

impl ColumnSource {
    fn into_columns(self) -> Result<Columns> {
        match self {
            Self::Live(columns) => Ok(columns),
            Self::Specs(specs) => Columns::from_specs(specs),
        }
    }
}

impl From<Columns> for ColumnSource {
    fn from(columns: Columns) -> Self {
        Self::Live(columns)
    }
}

impl From<Vec<ColumnSpec>> for ColumnSource {
    fn from(specs: Vec<ColumnSpec>) -> Self {
        Self::Specs(specs)
    }
}

/// Row construction options. Both fields are required.
#[derive(Default)]
pub struct RowOptions {
    pub columns: Option<ColumnSource>,
    pub model: Option<Record>,
}

impl RowOptions {
    pub fn new(columns: impl Into<ColumnSource>, model: Record) -> Self {
        Self {
            columns: Some(columns.into()),
            model: Some(model),
        }
    }
}

// =============================================================================
// Row State
// =============================================================================

struct RowState {
    columns: Columns,
    model: Record,
    cells: Vec<Box<dyn CellWidget>>,
    el: NodeId,
}

impl RowState {
    fn position_of(&self, name: &str) -> Option<usize> {
        self.cells.iter().position(|cell| cell.column().name() == name)
    }

    fn is_attached(&self, node: NodeId) -> bool {
        engine::parent(node) == Some(self.el)
    }

    /// Node of each cell if it is currently a child of the row.
    fn attached_nodes(&self) -> Vec<Option<NodeId>> {
        self.cells
            .iter()
            .map(|cell| cell.el().filter(|&el| self.is_attached(el)))
            .collect()
    }

    /// Insert the column's cell at its structural position, or detach it.
    fn render_column(&mut self, column: &Column, renderable: bool) {
        let Some(index) = self.position_of(column.name()) else {
            tracing::warn!(column = column.name(), "no cell for column; event ignored");
            return;
        };

        if renderable {
            let placement = resolve(index, &self.attached_nodes());
            let node = self.cells[index].render();
            match placement {
                Placement::First => engine::prepend_child(self.el, node),
                Placement::Last => engine::append_child(self.el, node),
                Placement::Before(anchor) => engine::insert_before(anchor, node),
            };
            tracing::debug!(column = column.name(), index, ?placement, "cell inserted");
        } else if let Some(el) = self.cells[index].el() {
            if self.is_attached(el) {
                engine::detach(el);
                tracing::debug!(column = column.name(), index, "cell detached");
            }
        }
    }

    fn add_cell(&mut self, column: &Rc<Column>, columns: &Columns, options: &AddOptions) {
        let Some(at) = columns.index_of(column.name()) else {
            tracing::warn!(column = column.name(), "added column not in collection; event ignored");
            return;
        };
        debug_assert_eq!(Some(at), options.at);
        if at > self.cells.len() {
            tracing::warn!(column = column.name(), at, cells = self.cells.len(), "cells out of step; event ignored");
            return;
        }

        let cell = column.cell_type().create(column.clone(), self.model.clone());
        self.cells.insert(at, cell);
        self.render_column(column, column.is_renderable() && options.render);
    }

    fn remove_cell(&mut self, column: &Column) {
        self.render_column(column, false);
        if let Some(index) = self.position_of(column.name()) {
            let cell = self.cells.remove(index);
            cell.destroy(DestroyOptions::default());
        }
    }

    fn render(&mut self) {
        engine::empty(self.el);

        let fragment = engine::create_fragment();
        for cell in self.cells.iter_mut() {
            if cell.column().is_renderable() {
                let node = cell.render();
                engine::append_child(fragment, node);
            }
        }
        engine::append_child(self.el, fragment);
        engine::release(fragment);

        tracing::trace!(node = %self.el, children = engine::child_count(self.el), "row rendered");
    }
}

// =============================================================================
// Row
// =============================================================================

/// The row synchronizer.
///
/// Dropping a row tears it down like `destroy(DestroyOptions::default())`.
pub struct Row {
    state: Rc<RefCell<RowState>>,
    subscriptions: Vec<Cleanup>,
    destroyed: bool,
}

impl Row {
    /// Build one cell per column and subscribe to column changes.
    ///
    /// Fails if `columns` or `model` is missing, or if plain specs are invalid.
    pub fn new(options: RowOptions) -> Result<Self> {
        let source = options.columns.ok_or(GridError::MissingOption("columns"))?;
        let model = options.model.ok_or(GridError::MissingOption("model"))?;
        let columns = source.into_columns()?;

        let cells: Vec<Box<dyn CellWidget>> = columns
            .to_vec()
            .into_iter()
            .map(|column| column.cell_type().create(column.clone(), model.clone()))
            .collect();
        let el = engine::create_element("tr");
        tracing::debug!(node = %el, cells = cells.len(), "row created");

        let state = Rc::new(RefCell::new(RowState {
            columns: columns.clone(),
            model,
            cells,
            el,
        }));

        let subscriptions = vec![
            columns.on_renderable_changed({
                let state = Rc::downgrade(&state);
                move |column, renderable| {
                    if let Some(state) = state.upgrade() {
                        state.borrow_mut().render_column(column, renderable);
                    }
                }
            }),
            columns.on_added({
                let state = Rc::downgrade(&state);
                move |column, columns, options| {
                    if let Some(state) = state.upgrade() {
                        state.borrow_mut().add_cell(column, columns, options);
                    }
                }
            }),
            columns.on_removed({
                let state = Rc::downgrade(&state);
                move |column, _index| {
                    if let Some(state) = state.upgrade() {
                        state.borrow_mut().remove_cell(column);
                    }
                }
            }),
        ];

        Ok(Self {
            state,
            subscriptions,
            destroyed: false,
        })
    }

    /// The row's `tr` node.
    pub fn el(&self) -> NodeId {
        self.state.borrow().el
    }

    pub fn columns(&self) -> Columns {
        self.state.borrow().columns.clone()
    }

    pub fn model(&self) -> Record {
        self.state.borrow().model.clone()
    }

    pub fn cell_count(&self) -> usize {
        self.state.borrow().cells.len()
    }

    /// The column each cell is bound to, in cell order.
    pub fn cell_columns(&self) -> Vec<Rc<Column>> {
        self.state
            .borrow()
            .cells
            .iter()
            .map(|cell| cell.column().clone())
            .collect()
    }

    /// Node of the cell at `index`, if it has rendered.
    pub fn cell_el(&self, index: usize) -> Option<NodeId> {
        self.state.borrow().cells.get(index).and_then(|cell| cell.el())
    }

    /// Rebuild the row's children from scratch.
    ///
    /// Children are detached (not destroyed), every renderable cell is
    /// rendered into a fragment in column order, and the fragment is attached
    /// in one step. Idempotent.
    pub fn render(&self) -> &Self {
        self.state.borrow_mut().render();
        self
    }

    /// Destroy every cell, unsubscribe, and release the row node.
    ///
    /// `options` is forwarded to each cell. Consumes the row.
    pub fn destroy(mut self, options: DestroyOptions) {
        self.teardown(options);
    }

    fn teardown(&mut self, options: DestroyOptions) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        for cleanup in self.subscriptions.drain(..) {
            cleanup();
        }

        let (cells, el) = {
            let mut state = self.state.borrow_mut();
            (std::mem::take(&mut state.cells), state.el)
        };
        for cell in cells {
            cell.destroy(options);
        }
        if !options.keep_nodes {
            engine::release(el);
        }
        tracing::debug!(node = %el, keep_nodes = options.keep_nodes, "row destroyed");
    }
}

impl Drop for Row {
    fn drop(&mut self) {
        self.teardown(DestroyOptions::default());
    }
}

impl View for Row {
    fn el(&self) -> Option<NodeId> {
        Some(Row::el(self))
    }

    fn render(&mut self) -> NodeId {
        Row::render(self).el()
    }

    fn destroy(self: Box<Self>, options: DestroyOptions) {
        Row::destroy(*self, options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::CellType;
    use crate::engine::reset_tree;
    use crate::primitives::TextCell;
    use std::cell::Cell;

    fn text(name: &str) -> ColumnSpec {
        ColumnSpec::new(name, CellType::Text)
    }

    fn record() -> Record {
        Record::new().with("a", "A").with("b", "B").with("c", "C").with("d", "D")
    }

    /// Text of each child of the row node.
    fn child_texts(row: &Row) -> Vec<String> {
        engine::children(row.el())
            .into_iter()
            .map(|node| engine::text(node).unwrap_or_default())
            .collect()
    }

    fn names(row: &Row) -> Vec<String> {
        row.cell_columns().iter().map(|c| c.name().to_string()).collect()
    }

    #[test]
    fn test_missing_options() {
        reset_tree();

        let err = Row::new(RowOptions {
            columns: None,
            model: Some(record()),
        })
        .err();
        assert_eq!(err, Some(GridError::MissingOption("columns")));

        let err = Row::new(RowOptions {
            columns: Some(vec![text("a")].into()),
            model: None,
        })
        .err();
        assert_eq!(err, Some(GridError::MissingOption("model")));

        assert_eq!(engine::node_count(), 0);
    }

    #[test]
    fn test_invalid_specs() {
        reset_tree();

        let err = Row::new(RowOptions::new(vec![text("a"), text("a")], record())).err();
        assert_eq!(err, Some(GridError::DuplicateColumn("a".into())));
    }

    #[test]
    fn test_one_cell_per_column() {
        reset_tree();

        let row = Row::new(RowOptions::new(vec![text("a"), text("b").hidden()], record())).unwrap();
        assert_eq!(row.cell_count(), 2);
        assert_eq!(names(&row), vec!["a", "b"]);
        assert_eq!(engine::tag(row.el()).as_deref(), Some("tr"));
        // Nothing rendered yet
        assert_eq!(row.cell_el(0), None);
        assert_eq!(engine::child_count(row.el()), 0);
    }

    #[test]
    fn test_render_skips_hidden() {
        reset_tree();

        let row = Row::new(RowOptions::new(
            vec![text("a"), text("b").hidden(), text("c")],
            record(),
        ))
        .unwrap();
        row.render();

        assert_eq!(child_texts(&row), vec!["A", "C"]);
        assert!(row.cell_el(1).is_none());
    }

    #[test]
    fn test_render_is_idempotent() {
        reset_tree();

        let row = Row::new(RowOptions::new(vec![text("a"), text("b"), text("c")], record())).unwrap();
        let first = engine::children(row.render().el());
        let count = engine::node_count();
        let second = engine::children(row.render().el());

        assert_eq!(first, second);
        assert_eq!(engine::node_count(), count);
    }

    #[test]
    fn test_show_hidden_column_between_neighbours() {
        reset_tree();

        let row = Row::new(RowOptions::new(
            vec![text("a"), text("b").hidden(), text("c")],
            record(),
        ))
        .unwrap();
        row.render();
        let a = row.cell_el(0).unwrap();
        let c = row.cell_el(2).unwrap();

        row.columns().set_renderable("b", true).unwrap();

        assert_eq!(child_texts(&row), vec!["A", "B", "C"]);
        let children = engine::children(row.el());
        assert_eq!(children[0], a);
        assert_eq!(children[2], c);
    }

    #[test]
    fn test_hide_keeps_cell() {
        reset_tree();

        let row = Row::new(RowOptions::new(vec![text("a"), text("b"), text("c")], record())).unwrap();
        row.render();
        let b = row.cell_el(1).unwrap();

        row.columns().set_renderable("b", false).unwrap();
        assert_eq!(child_texts(&row), vec!["A", "C"]);
        assert!(engine::is_alive(b));
        assert_eq!(row.cell_count(), 3);

        row.columns().set_renderable("b", true).unwrap();
        assert_eq!(child_texts(&row), vec!["A", "B", "C"]);
        assert_eq!(row.cell_el(1), Some(b));
    }

    #[test]
    fn test_show_first_and_last() {
        reset_tree();

        let row = Row::new(RowOptions::new(
            vec![text("a").hidden(), text("b"), text("c").hidden()],
            record(),
        ))
        .unwrap();
        row.render();

        row.columns().set_renderable("c", true).unwrap();
        row.columns().set_renderable("a", true).unwrap();
        assert_eq!(child_texts(&row), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_show_uses_structural_index() {
        reset_tree();

        // Only d visible; showing c must land before d, not at child index 2
        let row = Row::new(RowOptions::new(
            vec![text("a").hidden(), text("b").hidden(), text("c").hidden(), text("d")],
            record(),
        ))
        .unwrap();
        row.render();

        row.columns().set_renderable("c", true).unwrap();
        assert_eq!(child_texts(&row), vec!["C", "D"]);
        row.columns().set_renderable("a", true).unwrap();
        row.columns().set_renderable("b", true).unwrap();
        assert_eq!(child_texts(&row), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_add_column() {
        reset_tree();

        let row = Row::new(RowOptions::new(vec![text("a"), text("c")], record())).unwrap();
        row.render();

        row.columns().add(text("d"), AddOptions::at_index(1)).unwrap();
        assert_eq!(names(&row), vec!["a", "d", "c"]);
        assert_eq!(child_texts(&row), vec!["A", "D", "C"]);
    }

    #[test]
    fn test_add_hidden_or_deferred_column() {
        reset_tree();

        let row = Row::new(RowOptions::new(vec![text("a"), text("c")], record())).unwrap();
        row.render();

        row.columns().add(text("b").hidden(), AddOptions::at_index(1)).unwrap();
        row.columns()
            .add(text("d"), AddOptions::default().without_render())
            .unwrap();

        assert_eq!(names(&row), vec!["a", "b", "c", "d"]);
        assert_eq!(child_texts(&row), vec!["A", "C"]);
        assert_eq!(row.cell_el(3), None);

        // A later full render picks up the deferred cell
        row.render();
        assert_eq!(child_texts(&row), vec!["A", "C", "D"]);
    }

    #[test]
    fn test_remove_column_destroys_cell() {
        reset_tree();

        let row = Row::new(RowOptions::new(vec![text("a"), text("b"), text("c")], record())).unwrap();
        row.render();
        let b = row.cell_el(1).unwrap();

        row.columns().remove("b").unwrap();
        assert_eq!(names(&row), vec!["a", "c"]);
        assert_eq!(child_texts(&row), vec!["A", "C"]);
        assert!(!engine::is_alive(b));
    }

    #[test]
    fn test_cells_bound_to_model() {
        reset_tree();

        let model = record();
        let row = Row::new(RowOptions::new(vec![text("a")], model.clone())).unwrap();
        assert!(row.model().same(&model));

        model.set("a", "changed");
        row.render();
        assert_eq!(child_texts(&row), vec!["changed"]);
    }

    #[test]
    fn test_shared_live_columns() {
        reset_tree();

        let columns = Columns::from_specs(vec![text("a"), text("b")]).unwrap();
        let first = Row::new(RowOptions::new(columns.clone(), record())).unwrap();
        let second = Row::new(RowOptions::new(columns.clone(), record().with("a", "A2"))).unwrap();
        first.render();
        second.render();

        columns.set_renderable("a", false).unwrap();
        assert_eq!(child_texts(&first), vec!["B"]);
        assert_eq!(child_texts(&second), vec!["B"]);
        assert!(first.columns().same(&columns));
    }

    #[test]
    fn test_destroy_releases_everything() {
        reset_tree();

        let columns = Columns::from_specs(vec![text("a"), text("b").hidden()]).unwrap();
        let row = Row::new(RowOptions::new(columns.clone(), record())).unwrap();
        row.render();
        assert_eq!(columns.subscriber_count(), 3);

        row.destroy(DestroyOptions::default());
        assert_eq!(engine::node_count(), 0);
        assert_eq!(columns.subscriber_count(), 0);

        // Events after teardown reach nobody
        columns.set_renderable("b", true).unwrap();
    }

    #[test]
    fn test_destroy_forwards_options() {
        reset_tree();

        let destroyed = Rc::new(Cell::new(0));
        let keep_seen = Rc::new(Cell::new(false));

        struct Probe {
            inner: TextCell,
            destroyed: Rc<Cell<usize>>,
            keep_seen: Rc<Cell<bool>>,
        }

        impl View for Probe {
            fn el(&self) -> Option<NodeId> {
                self.inner.el()
            }

            fn render(&mut self) -> NodeId {
                self.inner.render()
            }

            fn destroy(self: Box<Self>, options: DestroyOptions) {
                self.destroyed.set(self.destroyed.get() + 1);
                self.keep_seen.set(options.keep_nodes);
                Box::new(self.inner).destroy(options);
            }
        }

        impl CellWidget for Probe {
            fn column(&self) -> &Rc<Column> {
                self.inner.column()
            }

            fn record(&self) -> &Record {
                self.inner.record()
            }
        }

        let factory = {
            let destroyed = destroyed.clone();
            let keep_seen = keep_seen.clone();
            CellType::custom(move |column: Rc<Column>, record: Record| -> Box<dyn CellWidget> {
                Box::new(Probe {
                    inner: TextCell::new(column, record),
                    destroyed: destroyed.clone(),
                    keep_seen: keep_seen.clone(),
                })
            })
        };

        let row = Row::new(RowOptions::new(
            vec![ColumnSpec::new("a", factory.clone()), ColumnSpec::new("b", factory)],
            record(),
        ))
        .unwrap();
        row.render();
        let el = row.el();

        row.destroy(DestroyOptions::keep_nodes());
        assert_eq!(destroyed.get(), 2);
        assert!(keep_seen.get());
        assert!(engine::is_alive(el));
        assert_eq!(engine::child_count(el), 2);
    }

    #[test]
    fn test_drop_unsubscribes() {
        reset_tree();

        let columns = Columns::from_specs(vec![text("a")]).unwrap();
        {
            let _row = Row::new(RowOptions::new(columns.clone(), record())).unwrap();
            assert_eq!(columns.subscriber_count(), 3);
        }
        assert_eq!(columns.subscriber_count(), 0);
    }

    #[test]
    fn test_drop_releases_nodes() {
        reset_tree();

        let columns = Columns::from_specs(vec![text("a"), text("b")]).unwrap();
        let mut rows: Vec<Row> = (0..100)
            .map(|_| Row::new(RowOptions::new(columns.clone(), record())).unwrap())
            .collect();
        for row in &rows {
            row.render();
        }
        columns.set_renderable("b", false).unwrap();
        assert_eq!(engine::node_count(), 300);

        rows.clear();
        assert_eq!(engine::node_count(), 0);
        assert_eq!(columns.subscriber_count(), 0);
    }

    #[test]
    fn test_destroy_then_drop_runs_once() {
        reset_tree();

        let row = Row::new(RowOptions::new(vec![text("a")], record())).unwrap();
        row.render();
        let el = row.el();
        let td = row.cell_el(0).unwrap();

        row.destroy(DestroyOptions::keep_nodes());
        // The drop that follows destroy must not release the kept nodes
        assert!(engine::is_alive(el));
        assert!(engine::is_alive(td));
        assert_eq!(engine::node_count(), 2);
    }

    #[test]
    fn test_row_as_view() {
        reset_tree();

        let body = engine::create_element("tbody");
        let mut rows: Vec<Box<dyn View>> = vec![
            Box::new(Row::new(RowOptions::new(vec![text("a")], record())).unwrap()),
            Box::new(Row::new(RowOptions::new(vec![text("b")], record())).unwrap()),
        ];
        for row in rows.iter_mut() {
            let node = row.render();
            engine::append_child(body, node);
        }

        assert_eq!(
            engine::to_markup(body),
            "<tbody><tr><td class=\"text-cell a\">A</td></tr><tr><td class=\"text-cell b\">B</td></tr></tbody>"
        );

        for row in rows {
            row.destroy(DestroyOptions::default());
        }
        assert_eq!(engine::child_count(body), 0);
        assert_eq!(engine::node_count(), 1);
    }
}

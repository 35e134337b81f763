//! Columns - The live, ordered column collection.
//!
//! Owns the column order and announces every structural change:
//!
//! - `on_renderable_changed(handler)` - a column was shown or hidden
//! - `on_added(handler)` - a column was inserted
//! - `on_removed(handler)` - a column was removed
//!
//! Each subscription returns a cleanup function that unsubscribes.
//!
//! # Example
//!
//! ```ignore
//! let columns = Columns::from_specs(vec![
//!     ColumnSpec::new("name", CellType::Text),
//!     ColumnSpec::new("age", CellType::Text).hidden(),
//! ])?;
//!
//! let cleanup = columns.on_renderable_changed(|column, renderable| {
//!     println!("{} -> {}", column.name(), renderable);
//! });
//!
//! columns.set_renderable("age", true)?; // prints "age -> true"
//! cleanup();
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::column::{Column, ColumnSpec};
use crate::error::{GridError, Result};
use crate::primitives::Cleanup;

// =============================================================================
// TYPES
// =============================================================================

/// Options for [`Columns::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOptions {
    /// Insert position. `None` appends. Handlers always see the resolved index.
    pub at: Option<usize>,
    /// Whether subscribed rows should insert the new cell into the visual
    /// tree right away. When false the cell is tracked but left detached
    /// until the next full render.
    pub render: bool,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            at: None,
            render: true,
        }
    }
}

impl AddOptions {
    pub fn at_index(index: usize) -> Self {
        Self {
            at: Some(index),
            ..Self::default()
        }
    }

    pub fn without_render(mut self) -> Self {
        self.render = false;
        self
    }
}

/// Handler for visibility changes.
pub type RenderableHandler = Rc<dyn Fn(&Rc<Column>, bool)>;

/// Handler for insertions: (column, collection, options with `at` resolved).
pub type AddedHandler = Rc<dyn Fn(&Rc<Column>, &Columns, &AddOptions)>;

/// Handler for removals: (column, index it was removed from).
pub type RemovedHandler = Rc<dyn Fn(&Rc<Column>, usize)>;

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

#[derive(Default)]
struct HandlerRegistry {
    renderable: Vec<(usize, RenderableHandler)>,
    added: Vec<(usize, AddedHandler)>,
    removed: Vec<(usize, RemovedHandler)>,
    next_id: usize,
}

impl HandlerRegistry {
    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn remove(&mut self, id: usize) {
        self.renderable.retain(|(handler_id, _)| *handler_id != id);
        self.added.retain(|(handler_id, _)| *handler_id != id);
        self.removed.retain(|(handler_id, _)| *handler_id != id);
    }

    fn count(&self) -> usize {
        self.renderable.len() + self.added.len() + self.removed.len()
    }
}

#[derive(Default)]
struct Inner {
    columns: RefCell<Vec<Rc<Column>>>,
    handlers: RefCell<HandlerRegistry>,
}

// =============================================================================
// COLUMNS
// =============================================================================

/// Shared handle to an ordered column collection.
///
/// Clones see the same columns and the same subscribers.
#[derive(Clone, Default)]
pub struct Columns {
    inner: Rc<Inner>,
}

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from plain specs, in order.
    ///
    /// Fails on an empty or duplicate name.
    pub fn from_specs(specs: impl IntoIterator<Item = ColumnSpec>) -> Result<Self> {
        let columns = Self::new();
        {
            let mut list = columns.inner.columns.borrow_mut();
            for spec in specs {
                let column = Column::from_spec(spec)?;
                if list.iter().any(|c| c.name() == column.name()) {
                    return Err(GridError::DuplicateColumn(column.name().to_string()));
                }
                list.push(Rc::new(column));
            }
        }
        Ok(columns)
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.inner.columns.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column at a position.
    pub fn at(&self, index: usize) -> Option<Rc<Column>> {
        self.inner.columns.borrow().get(index).cloned()
    }

    /// Column by name.
    pub fn get(&self, name: &str) -> Option<Rc<Column>> {
        self.inner
            .columns
            .borrow()
            .iter()
            .find(|c| c.name() == name)
            .cloned()
    }

    /// Position of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.inner
            .columns
            .borrow()
            .iter()
            .position(|c| c.name() == name)
    }

    /// Snapshot of the current columns, in order.
    pub fn to_vec(&self) -> Vec<Rc<Column>> {
        self.inner.columns.borrow().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.inner
            .columns
            .borrow()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Check if two handles point at the same collection.
    pub fn same(&self, other: &Columns) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Insert a new column, then notify `added` subscribers.
    pub fn add(&self, spec: ColumnSpec, options: AddOptions) -> Result<Rc<Column>> {
        let column = Rc::new(Column::from_spec(spec)?);
        let index = {
            let mut list = self.inner.columns.borrow_mut();
            if list.iter().any(|c| c.name() == column.name()) {
                return Err(GridError::DuplicateColumn(column.name().to_string()));
            }
            let index = options.at.unwrap_or(list.len());
            if index > list.len() {
                return Err(GridError::IndexOutOfBounds {
                    index,
                    len: list.len(),
                });
            }
            list.insert(index, column.clone());
            index
        };

        let resolved = AddOptions {
            at: Some(index),
            ..options
        };
        self.emit_added(&column, &resolved);
        Ok(column)
    }

    /// Remove a column by name, then notify `removed` subscribers.
    pub fn remove(&self, name: &str) -> Result<Rc<Column>> {
        let (index, column) = {
            let mut list = self.inner.columns.borrow_mut();
            let index = list
                .iter()
                .position(|c| c.name() == name)
                .ok_or_else(|| GridError::UnknownColumn(name.to_string()))?;
            (index, list.remove(index))
        };

        self.emit_removed(&column, index);
        Ok(column)
    }

    /// Show or hide a column.
    ///
    /// Subscribers are only notified when the flag actually changes; the
    /// return value says whether it did.
    pub fn set_renderable(&self, name: &str, renderable: bool) -> Result<bool> {
        let column = self
            .get(name)
            .ok_or_else(|| GridError::UnknownColumn(name.to_string()))?;
        if !column.set_renderable(renderable) {
            return Ok(false);
        }
        self.emit_renderable(&column, renderable);
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    /// Subscribe to visibility changes. Returns cleanup function.
    pub fn on_renderable_changed<F>(&self, handler: F) -> Cleanup
    where
        F: Fn(&Rc<Column>, bool) + 'static,
    {
        let id = {
            let mut handlers = self.inner.handlers.borrow_mut();
            let id = handlers.next_id();
            handlers.renderable.push((id, Rc::new(handler)));
            id
        };
        self.unsubscriber(id)
    }

    /// Subscribe to insertions. Returns cleanup function.
    pub fn on_added<F>(&self, handler: F) -> Cleanup
    where
        F: Fn(&Rc<Column>, &Columns, &AddOptions) + 'static,
    {
        let id = {
            let mut handlers = self.inner.handlers.borrow_mut();
            let id = handlers.next_id();
            handlers.added.push((id, Rc::new(handler)));
            id
        };
        self.unsubscriber(id)
    }

    /// Subscribe to removals. Returns cleanup function.
    pub fn on_removed<F>(&self, handler: F) -> Cleanup
    where
        F: Fn(&Rc<Column>, usize) + 'static,
    {
        let id = {
            let mut handlers = self.inner.handlers.borrow_mut();
            let id = handlers.next_id();
            handlers.removed.push((id, Rc::new(handler)));
            id
        };
        self.unsubscriber(id)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.handlers.borrow().count()
    }

    fn unsubscriber(&self, id: usize) -> Cleanup {
        let inner: Weak<Inner> = Rc::downgrade(&self.inner);
        Box::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.handlers.borrow_mut().remove(id);
            }
        })
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------
    //
    // Handlers are cloned out of the registry first so no borrow is held while
    // they run; a handler may read this collection freely.

    fn emit_renderable(&self, column: &Rc<Column>, renderable: bool) {
        let handlers: Vec<RenderableHandler> = self
            .inner
            .handlers
            .borrow()
            .renderable
            .iter()
            .map(|(_, h)| h.clone())
            .collect();
        tracing::debug!(column = column.name(), renderable, "column renderable changed");
        for handler in handlers {
            handler(column, renderable);
        }
    }

    fn emit_added(&self, column: &Rc<Column>, options: &AddOptions) {
        let handlers: Vec<AddedHandler> = self
            .inner
            .handlers
            .borrow()
            .added
            .iter()
            .map(|(_, h)| h.clone())
            .collect();
        tracing::debug!(column = column.name(), at = ?options.at, render = options.render, "column added");
        for handler in handlers {
            handler(column, self, options);
        }
    }

    fn emit_removed(&self, column: &Rc<Column>, index: usize) {
        let handlers: Vec<RemovedHandler> = self
            .inner
            .handlers
            .borrow()
            .removed
            .iter()
            .map(|(_, h)| h.clone())
            .collect();
        tracing::debug!(column = column.name(), index, "column removed");
        for handler in handlers {
            handler(column, index);
        }
    }
}

impl fmt::Debug for Columns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Columns")
            .field("columns", &self.names())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

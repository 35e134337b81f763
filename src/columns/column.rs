//! Column descriptors.
//!
//! A [`Column`] names a record attribute, carries its visibility flag, and
//! the [`CellType`] used to render it.
//! [`ColumnSpec`] is the plain description columns are built from.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::error::{GridError, Result};
use crate::primitives::{CellFactory, CellWidget, TextCell};
use crate::record::Record;
use crate::types::ColumnFlags;

// =============================================================================
// CellType
// =============================================================================

/// Which widget renders a column's cells.
#[derive(Clone, Default)]
pub enum CellType {
    /// The built-in [`TextCell`].
    #[default]
    Text,
    /// A caller-supplied factory.
    Custom(Rc<dyn CellFactory>),
}

impl CellType {
    /// Wrap a factory.
    pub fn custom(factory: impl CellFactory + 'static) -> Self {
        Self::Custom(Rc::new(factory))
    }

    /// Build a cell widget for `column` bound to `record`.
    pub fn create(&self, column: Rc<Column>, record: Record) -> Box<dyn CellWidget> {
        match self {
            Self::Text => Box::new(TextCell::new(column, record)),
            Self::Custom(factory) => factory.create(column, record),
        }
    }
}

impl fmt::Debug for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("Text"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// =============================================================================
// ColumnSpec
// =============================================================================

/// Plain column description.
///
/// ```ignore
/// ColumnSpec::new("age", CellType::Text).label("Age").hidden()
/// ```
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub name: String,
    pub label: Option<String>,
    pub cell: CellType,
    pub flags: ColumnFlags,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, cell: CellType) -> Self {
        Self {
            name: name.into(),
            label: None,
            cell,
            flags: ColumnFlags::default(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn renderable(mut self, renderable: bool) -> Self {
        self.flags.set(ColumnFlags::RENDERABLE, renderable);
        self
    }

    /// Shorthand for `renderable(false)`.
    pub fn hidden(self) -> Self {
        self.renderable(false)
    }
}

// =============================================================================
// Column
// =============================================================================

/// A column descriptor.
///
/// Flags are interior-mutable, but only [`super::Columns`] changes
/// `RENDERABLE`, so that every change is announced to subscribers.
pub struct Column {
    name: String,
    label: String,
    cell: CellType,
    flags: Cell<ColumnFlags>,
}

impl Column {
    /// Build a column. The name must not be empty; the label defaults to it.
    pub fn from_spec(spec: ColumnSpec) -> Result<Self> {
        if spec.name.trim().is_empty() {
            return Err(GridError::EmptyColumnName);
        }
        let label = spec.label.unwrap_or_else(|| spec.name.clone());
        Ok(Self {
            name: spec.name,
            label,
            cell: spec.cell,
            flags: Cell::new(spec.flags),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn cell_type(&self) -> &CellType {
        &self.cell
    }

    pub fn flags(&self) -> ColumnFlags {
        self.flags.get()
    }

    pub fn is_renderable(&self) -> bool {
        self.flags().contains(ColumnFlags::RENDERABLE)
    }

    /// Returns true if the flag actually changed.
    pub(crate) fn set_renderable(&self, renderable: bool) -> bool {
        let flags = self.flags.get();
        if flags.contains(ColumnFlags::RENDERABLE) == renderable {
            return false;
        }
        let mut next = flags;
        next.set(ColumnFlags::RENDERABLE, renderable);
        self.flags.set(next);
        true
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("cell", &self.cell)
            .field("flags", &self.flags.get())
            .finish()
    }
}

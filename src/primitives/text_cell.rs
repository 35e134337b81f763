//! Text Cell - The built-in cell widget.
//!
//! Displays a record attribute as plain text inside a `td` node.
//!
//! # Example
//!
//! ```ignore
//! use spark_grid::{Columns, ColumnSpec, CellType, Record};
//!
//! let columns = Columns::from_specs(vec![ColumnSpec::new("name", CellType::Text)])?;
//! let record = Record::new().with("name", "Ada");
//!
//! let mut cell = columns.at(0).unwrap().cell_type().create(columns.at(0).unwrap(), record);
//! let node = cell.render(); // <td class="text-cell name">Ada</td>
//! ```

use std::rc::Rc;

use crate::columns::Column;
use crate::engine;
use crate::record::Record;
use crate::types::NodeId;
use super::types::{CellWidget, DestroyOptions, View};

/// Class every text cell node carries.
pub const TEXT_CELL_CLASS: &str = "text-cell";

pub struct TextCell {
    column: Rc<Column>,
    record: Record,
    el: Option<NodeId>,
}

impl TextCell {
    pub fn new(column: Rc<Column>, record: Record) -> Self {
        Self {
            column,
            record,
            el: None,
        }
    }

    /// Node is created on first render.
    fn ensure_el(&mut self) -> NodeId {
        if let Some(el) = self.el {
            return el;
        }
        let el = engine::create_element("td");
        engine::add_class(el, TEXT_CELL_CLASS);
        engine::add_class(el, self.column.name());
        self.el = Some(el);
        el
    }
}

impl View for TextCell {
    fn el(&self) -> Option<NodeId> {
        self.el
    }

    fn render(&mut self) -> NodeId {
        let el = self.ensure_el();
        let content = self
            .record
            .get(self.column.name())
            .map(|value| value.to_string())
            .unwrap_or_default();
        tracing::trace!(column = self.column.name(), node = %el, "text cell rendered");
        engine::set_text(el, content);
        el
    }

    fn destroy(self: Box<Self>, options: DestroyOptions) {
        if let Some(el) = self.el {
            if !options.keep_nodes {
                engine::release(el);
            }
        }
    }
}

impl CellWidget for TextCell {
    fn column(&self) -> &Rc<Column> {
        &self.column
    }

    fn record(&self) -> &Record {
        &self.record
    }
}

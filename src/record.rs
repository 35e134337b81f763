//! Record - The model a row renders.
//!
//! A `Record` is a cheaply clonable handle: every clone sees the same
//! attribute map, so a row and all of its cells read live values.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::types::Value;

#[derive(Debug, Clone, Default)]
pub struct Record {
    attributes: Rc<RefCell<BTreeMap<String, Value>>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style set.
    pub fn with(self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Get an attribute value.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.attributes.borrow().get(name).cloned()
    }

    /// Set an attribute value, returning the previous one.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Option<Value> {
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.into())
    }

    pub fn has(&self, name: &str) -> bool {
        self.attributes.borrow().contains_key(name)
    }

    /// Check if two handles point at the same record.
    pub fn same(&self, other: &Record) -> bool {
        Rc::ptr_eq(&self.attributes, &other.attributes)
    }
}

//! Engine - The visual tree rows and cells patch.
//!
//! - Node: one arena entry (element or fragment)
//! - Tree: index allocation, parent/child structure, release callbacks
//!
//! # Architecture
//!
//! Nodes are NOT objects. They are indices into a thread-local arena:
//!
//! ```text
//! #0: tr  (parent=None, children=[#1, #3])
//! #1: td  (parent=#0,   text="Ada")
//! #2: td  (parent=None, text="42")     <- detached, still alive
//! #3: td  (parent=#0,   text="London")
//! ```
//!
//! Detaching a node keeps it alive so it can be reinserted later; only
//! `release` destroys it.

mod node;
mod tree;

pub use node::NodeKind;
pub use tree::*;

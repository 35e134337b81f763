//! Visual Tree - Node arena with DOM-like patch operations.
//!
//! Manages the lifecycle and structure of visual nodes:
//! - Index allocation with a free pool for O(1) reuse
//! - Parent/child links with move-on-insert semantics
//! - Fragments (off-tree containers whose children move on insert)
//! - Recursive release of whole subtrees
//!
//! The arena is thread-local. Every row and cell on a thread shares it, and
//! each of them only touches its own subtree.

use std::cell::RefCell;

use super::node::{Node, NodeKind};
use crate::types::NodeId;

// =============================================================================
// Arena State
// =============================================================================

struct Arena {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
}

/// Where an inserted node lands among its new siblings.
#[derive(Clone, Copy)]
enum Position {
    Start,
    End,
    Before(usize),
}

impl Arena {
    const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
        }
    }

    fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_mut(index).and_then(Option::as_mut)
    }

    fn alloc(&mut self, node: Node) -> usize {
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                index
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    /// Remove `index` from its parent's child list. Returns false if it had no parent.
    fn unlink(&mut self, index: usize) -> bool {
        let Some(parent) = self.get(index).and_then(|n| n.parent) else {
            return false;
        };
        if let Some(parent) = self.get_mut(parent) {
            parent.children.retain(|&c| c != index);
        }
        if let Some(node) = self.get_mut(index) {
            node.parent = None;
        }
        true
    }

    fn is_ancestor_or_self(&self, ancestor: usize, mut index: usize) -> bool {
        loop {
            if index == ancestor {
                return true;
            }
            match self.get(index).and_then(|n| n.parent) {
                Some(parent) => index = parent,
                None => return false,
            }
        }
    }

    /// Insert `child` under `parent`. Fragments contribute their children.
    fn insert(&mut self, parent: usize, child: usize, position: Position) -> bool {
        if self.get(parent).is_none() || self.get(child).is_none() {
            return false;
        }
        if self.is_ancestor_or_self(child, parent) {
            tracing::warn!(parent, child, "refusing to insert a node into its own subtree");
            return false;
        }
        if let Position::Before(anchor) = position {
            if anchor == child {
                return true;
            }
        }

        // Detach what is being moved
        let moved: Vec<usize> = if self.get(child).is_some_and(Node::is_fragment) {
            self.get_mut(child)
                .map(|fragment| std::mem::take(&mut fragment.children))
                .unwrap_or_default()
        } else {
            self.unlink(child);
            vec![child]
        };

        let Some(parent_node) = self.get_mut(parent) else {
            return false;
        };
        let at = match position {
            Position::Start => 0,
            Position::End => parent_node.children.len(),
            Position::Before(anchor) => parent_node
                .children
                .iter()
                .position(|&c| c == anchor)
                .unwrap_or(parent_node.children.len()),
        };
        parent_node.children.splice(at..at, moved.iter().copied());

        for index in moved {
            if let Some(node) = self.get_mut(index) {
                node.parent = Some(parent);
            }
        }
        true
    }

    /// Collect a subtree in post-order (children before parents).
    fn collect_subtree(&self, index: usize, out: &mut Vec<usize>) {
        if let Some(node) = self.get(index) {
            for &child in &node.children {
                self.collect_subtree(child, out);
            }
            out.push(index);
        }
    }

    fn write_markup(&self, index: usize, out: &mut String) {
        let Some(node) = self.get(index) else { return };
        if node.is_fragment() {
            for &child in &node.children {
                self.write_markup(child, out);
            }
            return;
        }

        out.push('<');
        out.push_str(&node.tag);
        if !node.classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&node.classes.join(" "));
            out.push('"');
        }
        out.push('>');
        if let Some(text) = &node.text {
            escape_into(text, out);
        }
        for &child in &node.children {
            self.write_markup(child, out);
        }
        out.push_str("</");
        out.push_str(&node.tag);
        out.push('>');
    }
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
}

thread_local! {
    static ARENA: RefCell<Arena> = const { RefCell::new(Arena::new()) };
}

fn with_arena<R>(f: impl FnOnce(&mut Arena) -> R) -> R {
    ARENA.with(|arena| f(&mut arena.borrow_mut()))
}

// =============================================================================
// Node Creation
// =============================================================================

/// Create a detached element node.
pub fn create_element(tag: &str) -> NodeId {
    NodeId(with_arena(|arena| arena.alloc(Node::element(tag))))
}

/// Create an empty fragment.
///
/// Appending a fragment moves its children into the target in order and
/// leaves the fragment empty (and still alive, so release it when done).
pub fn create_fragment() -> NodeId {
    NodeId(with_arena(|arena| arena.alloc(Node::fragment())))
}

// =============================================================================
// Structure
// =============================================================================

/// Append `child` as the last child of `parent`.
pub fn append_child(parent: NodeId, child: NodeId) -> bool {
    with_arena(|arena| arena.insert(parent.0, child.0, Position::End))
}

/// Insert `child` as the first child of `parent`.
pub fn prepend_child(parent: NodeId, child: NodeId) -> bool {
    with_arena(|arena| arena.insert(parent.0, child.0, Position::Start))
}

/// Insert `child` immediately before `anchor`, under `anchor`'s parent.
///
/// Returns false if `anchor` is detached.
pub fn insert_before(anchor: NodeId, child: NodeId) -> bool {
    with_arena(|arena| {
        let Some(parent) = arena.get(anchor.0).and_then(|n| n.parent) else {
            return false;
        };
        arena.insert(parent, child.0, Position::Before(anchor.0))
    })
}

/// Remove a node from its parent without destroying it.
///
/// Returns false if the node was not attached.
pub fn detach(node: NodeId) -> bool {
    with_arena(|arena| arena.unlink(node.0))
}

/// Detach every child of `node`.
pub fn empty(node: NodeId) {
    with_arena(|arena| {
        let children = match arena.get_mut(node.0) {
            Some(n) => std::mem::take(&mut n.children),
            None => return,
        };
        for child in children {
            if let Some(c) = arena.get_mut(child) {
                c.parent = None;
            }
        }
    });
}

// =============================================================================
// Release
// =============================================================================

/// Destroy a node and its whole subtree.
///
/// The node is detached from its parent first. Releasing a dead node is a
/// no-op.
pub fn release(node: NodeId) {
    with_arena(|arena| {
        let mut subtree = Vec::new();
        arena.collect_subtree(node.0, &mut subtree);
        if subtree.is_empty() {
            return;
        }
        arena.unlink(node.0);
        for &index in &subtree {
            arena.nodes[index] = None;
            arena.free.push(index);
        }
    });
}

// =============================================================================
// Content
// =============================================================================

/// Replace a node's text content.
pub fn set_text(node: NodeId, text: impl Into<String>) {
    with_arena(|arena| {
        if let Some(n) = arena.get_mut(node.0) {
            n.text = Some(text.into());
        }
    });
}

/// Add a class name (no-op if already present).
pub fn add_class(node: NodeId, class: &str) {
    with_arena(|arena| {
        if let Some(n) = arena.get_mut(node.0) {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_string());
            }
        }
    });
}

// =============================================================================
// Lookups
// =============================================================================

/// Check if a node is currently alive.
pub fn is_alive(node: NodeId) -> bool {
    with_arena(|arena| arena.get(node.0).is_some())
}

pub fn kind(node: NodeId) -> Option<NodeKind> {
    with_arena(|arena| arena.get(node.0).map(|n| n.kind))
}

pub fn parent(node: NodeId) -> Option<NodeId> {
    with_arena(|arena| arena.get(node.0).and_then(|n| n.parent).map(NodeId))
}

/// Children of `node`, in order.
pub fn children(node: NodeId) -> Vec<NodeId> {
    with_arena(|arena| {
        arena
            .get(node.0)
            .map(|n| n.children.iter().copied().map(NodeId).collect())
            .unwrap_or_default()
    })
}

pub fn child_count(node: NodeId) -> usize {
    with_arena(|arena| arena.get(node.0).map_or(0, |n| n.children.len()))
}

pub fn tag(node: NodeId) -> Option<String> {
    with_arena(|arena| arena.get(node.0).map(|n| n.tag.clone()))
}

pub fn text(node: NodeId) -> Option<String> {
    with_arena(|arena| arena.get(node.0).and_then(|n| n.text.clone()))
}

pub fn classes(node: NodeId) -> Vec<String> {
    with_arena(|arena| arena.get(node.0).map(|n| n.classes.clone()).unwrap_or_default())
}

pub fn has_class(node: NodeId, class: &str) -> bool {
    with_arena(|arena| {
        arena
            .get(node.0)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    })
}

/// Number of live nodes on this thread.
pub fn node_count() -> usize {
    with_arena(|arena| arena.nodes.iter().filter(|n| n.is_some()).count())
}

/// Serialize a subtree as markup, e.g. `<tr><td class="name">Ada</td></tr>`.
pub fn to_markup(node: NodeId) -> String {
    let mut out = String::new();
    with_arena(|arena| arena.write_markup(node.0, &mut out));
    out
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Reset all tree state (for testing).
pub fn reset_tree() {
    with_arena(|arena| {
        arena.nodes.clear();
        arena.free.clear();
    });
}

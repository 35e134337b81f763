//! Node - One entry in the visual tree arena.

/// What a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A regular element (`tr`, `td`, ...).
    Element,
    /// An off-tree container. Inserting it moves its children instead.
    Fragment,
}

/// Arena entry. Parent/child links are raw arena indices.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) tag: String,
    pub(crate) text: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
}

impl Node {
    pub(crate) fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element,
            tag: tag.to_string(),
            text: None,
            classes: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn fragment() -> Self {
        Self {
            kind: NodeKind::Fragment,
            tag: String::new(),
            text: None,
            classes: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn is_fragment(&self) -> bool {
        self.kind == NodeKind::Fragment
    }
}

//! Page content tree.
//!
//! A [`ContentTree`] is an arena of [`Node`]s addressed by [`NodeId`].
//! Edges are stored as indices, so a tree that references one of its own
//! ancestors (a cycle) serializes losslessly and needs no seen-set when
//! persisted. Traversal still guards against revisiting nodes.

use serde::{Deserialize, Serialize};

use crate::rich_text::RichText;

/// Index of a node inside its [`ContentTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Block type with its type-specific payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    /// A page. The root of every tree is a page; nested pages are
    /// references to other pages and carry a `uri`.
    Page,
    Text,
    Heading {
        level: u8,
    },
    BulletedListItem,
    NumberedListItem,
    ToDo {
        #[serde(default)]
        checked: bool,
    },
    Toggle,
    Quote,
    Callout {
        #[serde(default)]
        icon: Option<String>,
    },
    Code {
        #[serde(default)]
        language: Option<String>,
    },
    Divider,
    Image {
        source: String,
    },
    Bookmark {
        link: String,
    },
    ColumnList,
    Column,
    #[serde(other)]
    Unsupported,
}

/// A single block of the content tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Source-side block identifier.
    pub id: String,
    #[serde(flatten)]
    pub kind: BlockKind,
    /// Inline text of the block (caption for media blocks).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub title: Vec<RichText>,
    /// Reference target of page blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
            title: Vec::new(),
            uri: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: Vec<RichText>) -> Self {
        self.title = title;
        self
    }

    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}

/// Decision returned by a traversal callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    /// Descend into the node's children.
    Continue,
    /// Do not visit the node's children.
    SkipChildren,
}

/// Error returned when a deserialized tree references missing nodes.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("content tree has no root node")]
    Empty,
    #[error("node {parent} references missing child {child}")]
    DanglingChild { parent: usize, child: usize },
}

/// Arena-backed content of one page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTree {
    root: NodeId,
    nodes: Vec<Node>,
}

impl ContentTree {
    /// Create a tree holding only `root`.
    #[must_use]
    pub fn new(root: Node) -> Self {
        Self {
            root: NodeId(0),
            nodes: vec![root],
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Append `node` as the last child of `parent` and return its id.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not part of this tree or the arena is full.
    pub fn push(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("content tree arena overflow"));
        self.nodes.push(node);
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Add an extra edge from `parent` to an existing node.
    ///
    /// Unlike [`push`](Self::push) this may introduce shared nodes or cycles.
    pub fn link(&mut self, parent: NodeId, child: NodeId) {
        if child.index() < self.nodes.len()
            && let Some(node) = self.nodes.get_mut(parent.index())
        {
            node.children.push(child);
        }
    }

    /// Check that the root and every child edge point inside the arena.
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.root.index() >= self.nodes.len() {
            return Err(ContentError::Empty);
        }
        for (parent, node) in self.nodes.iter().enumerate() {
            if let Some(child) = node.children.iter().find(|c| c.index() >= self.nodes.len()) {
                return Err(ContentError::DanglingChild {
                    parent,
                    child: child.index(),
                });
            }
        }
        Ok(())
    }

    /// Visit every reachable node once, depth-first in document order.
    ///
    /// The callback receives the node and the id of the parent it was reached
    /// from (`None` for the root).
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(NodeId, &Node, Option<NodeId>) -> Visit,
    {
        for (id, parent) in self.order() {
            let _ = visit(id, &self.nodes[id.index()], parent);
        }
    }

    /// Mutable variant of [`walk`](Self::walk).
    ///
    /// Children are read after the callback returns, so edits to a node's
    /// `children` take effect for the rest of the traversal.
    pub fn walk_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(&mut Node, Option<NodeId>) -> Visit,
    {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![(self.root, None)];

        while let Some((id, parent)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(id.index()) else {
                continue;
            };
            if std::mem::replace(&mut seen[id.index()], true) {
                continue;
            }
            if visit(&mut *node, parent) == Visit::Continue {
                stack.extend(node.children.iter().rev().map(|&child| (child, Some(id))));
            }
        }
    }

    /// Depth-first order of reachable nodes with the parent each was reached from.
    fn order(&self) -> Vec<(NodeId, Option<NodeId>)> {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![(self.root, None)];
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some((id, parent)) = stack.pop() {
            let Some(node) = self.nodes.get(id.index()) else {
                continue;
            };
            if std::mem::replace(&mut seen[id.index()], true) {
                continue;
            }
            order.push((id, parent));
            stack.extend(node.children.iter().rev().map(|&child| (child, Some(id))));
        }
        order
    }
}

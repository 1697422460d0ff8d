//! # Document Tree
//!
//! The [`Document`] owns the root [`Node`] and exposes the four structural
//! primitives every edit is built from:
//!
//! - [`Document::insert`]: splice nodes in at a path
//! - [`Document::delete`]: remove a run of siblings starting at a path
//! - [`Document::update`]: merge attributes into a node
//! - [`Document::update_text`]: apply a text delta to a node
//!
//! Each primitive validates everything it needs before touching the tree,
//! so a failed call leaves the document exactly as it was.
//!
//! Paths are coordinates, not handles. Any path obtained before a mutation
//! must be re-resolved afterwards.

use crate::attributes::{compose_attributes, Attributes};
use crate::delta::Delta;
use crate::error::{DocumentError, DocumentResult};
use crate::node::{Node, ROOT_TYPE};
use crate::path::Path;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    root: Node,
}

impl Document {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Document whose root holds the given top-level nodes
    pub fn with_children(children: Vec<Node>) -> Self {
        Self::new(Node::new(ROOT_TYPE).with_children(children))
    }

    /// Document holding a single empty text node
    pub fn blank() -> Self {
        Self::with_children(vec![Node::empty_text()])
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Top-level nodes
    pub fn children(&self) -> &[Node] {
        &self.root.children
    }

    pub fn node_at_path(&self, path: &Path) -> Option<&Node> {
        path.indices()
            .iter()
            .try_fold(&self.root, |node, &index| node.children.get(index))
    }

    fn node_at_path_mut(&mut self, path: &Path) -> Option<&mut Node> {
        path.indices()
            .iter()
            .try_fold(&mut self.root, |node, &index| node.children.get_mut(index))
    }

    /// Resolve the parent's child list and the index within it.
    fn siblings_mut(&mut self, path: &Path) -> DocumentResult<(&mut Vec<Node>, usize)> {
        let (parent, index) = match (path.parent(), path.last()) {
            (Some(parent), Some(index)) => (parent, index),
            _ => return Err(DocumentError::RootPath),
        };
        let parent = self
            .node_at_path_mut(&parent)
            .ok_or_else(|| DocumentError::PathNotFound(path.clone()))?;
        Ok((&mut parent.children, index))
    }

    /// Insert `nodes` so the first of them ends up at `path`.
    ///
    /// The index may equal the parent's child count (append).
    pub fn insert(&mut self, path: &Path, nodes: Vec<Node>) -> DocumentResult<()> {
        let (siblings, index) = self.siblings_mut(path)?;
        if index > siblings.len() {
            return Err(DocumentError::index_out_of_range(path, siblings.len()));
        }

        tracing::trace!(%path, count = nodes.len(), "insert nodes");
        siblings.splice(index..index, nodes);
        Ok(())
    }

    /// Remove `count` siblings starting at `path` and return them.
    pub fn delete(&mut self, path: &Path, count: usize) -> DocumentResult<Vec<Node>> {
        let (siblings, index) = self.siblings_mut(path)?;
        let end = match index.checked_add(count) {
            Some(end) if index < siblings.len() && end <= siblings.len() => end,
            _ => return Err(DocumentError::index_out_of_range(path, siblings.len())),
        };

        tracing::trace!(%path, count, "delete nodes");
        Ok(siblings.drain(index..end).collect())
    }

    /// Merge `attributes` into the node at `path`; `null` values remove keys.
    pub fn update(&mut self, path: &Path, attributes: &Attributes) -> DocumentResult<()> {
        let node = self
            .node_at_path_mut(path)
            .ok_or_else(|| DocumentError::PathNotFound(path.clone()))?;

        tracing::trace!(%path, keys = attributes.len(), "update attributes");
        node.attributes = compose_attributes(&node.attributes, attributes, false);
        Ok(())
    }

    /// Apply a change delta to the text of the node at `path`.
    pub fn update_text(&mut self, path: &Path, delta: &Delta) -> DocumentResult<()> {
        let node = self
            .node_at_path_mut(path)
            .ok_or_else(|| DocumentError::PathNotFound(path.clone()))?;
        let current = node
            .delta
            .as_ref()
            .ok_or_else(|| DocumentError::NotText(path.clone()))?;

        let composed = current.compose(delta)?;
        tracing::trace!(%path, len = composed.len(), "update text");
        node.delta = Some(composed);
        Ok(())
    }

    /// Nodes from `start` to `end` inclusive, in document order.
    ///
    /// Returns nothing if either path does not resolve or `end` comes
    /// before `start`. Only the nodes in between are visited.
    pub fn nodes_between(&self, start: &Path, end: &Path) -> Vec<&Node> {
        if start > end || self.node_at_path(end).is_none() {
            return Vec::new();
        }

        let mut nodes = Vec::new();
        let mut cursor = Some(start.clone());
        while let Some(path) = cursor {
            let Some(node) = self.node_at_path(&path) else {
                break;
            };
            if !path.is_empty() {
                nodes.push(node);
            }
            if &path == end {
                return nodes;
            }
            cursor = self.next_in_order(&path, node);
        }

        Vec::new()
    }

    /// The pre-order successor of `node` at `path`: its first child, else
    /// the next sibling of the nearest ancestor that has one.
    fn next_in_order(&self, path: &Path, node: &Node) -> Option<Path> {
        if !node.children.is_empty() {
            return Some(path.child(0));
        }

        let mut current = path.clone();
        loop {
            let parent = current.parent()?;
            let index = current.last()?;
            let siblings = &self.node_at_path(&parent)?.children;
            if index + 1 < siblings.len() {
                return Some(parent.child(index + 1));
            }
            current = parent;
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::blank()
    }
}

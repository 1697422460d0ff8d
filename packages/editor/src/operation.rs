//! # Operations
//!
//! The four atomic edits every change to a document is made of.
//!
//! ## Semantics
//!
//! ### Insert
//! - Splices `nodes` in so the first one ends up at `path`
//! - Inverse: Delete of the same nodes at the same path
//!
//! ### Delete
//! - Removes `nodes.len()` siblings starting at `path`
//! - Carries the removed nodes so it can be replayed backwards
//!
//! ### Update
//! - Merges `attributes` into the node at `path`, `null` removes a key
//! - `old_attributes` restores the previous values
//!
//! ### UpdateText
//! - Applies `delta` to the text of the node at `path`
//! - `inverted` is the delta that restores the previous text
//!
//! Operations are self-describing: inverting one never needs the document.

use folio_document::{invert_attributes, Attributes, Delta, Document, DocumentError, Node, Path};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Insert {
        path: Path,
        nodes: Vec<Node>,
    },

    Delete {
        path: Path,
        nodes: Vec<Node>,
    },

    Update {
        path: Path,
        attributes: Attributes,
        #[serde(rename = "oldAttributes")]
        old_attributes: Attributes,
    },

    UpdateText {
        path: Path,
        delta: Delta,
        inverted: Delta,
    },
}

impl Operation {
    pub fn path(&self) -> &Path {
        match self {
            Operation::Insert { path, .. }
            | Operation::Delete { path, .. }
            | Operation::Update { path, .. }
            | Operation::UpdateText { path, .. } => path,
        }
    }

    /// Same operation retargeted at `path`
    pub fn with_path(&self, path: Path) -> Operation {
        let mut op = self.clone();
        match &mut op {
            Operation::Insert { path: p, .. }
            | Operation::Delete { path: p, .. }
            | Operation::Update { path: p, .. }
            | Operation::UpdateText { path: p, .. } => *p = path,
        }
        op
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Insert { .. } => "insert",
            Operation::Delete { .. } => "delete",
            Operation::Update { .. } => "update",
            Operation::UpdateText { .. } => "update_text",
        }
    }

    /// The operation that undoes this one, built from stored data only
    pub fn invert(&self) -> Operation {
        match self {
            Operation::Insert { path, nodes } => Operation::Delete {
                path: path.clone(),
                nodes: nodes.clone(),
            },
            Operation::Delete { path, nodes } => Operation::Insert {
                path: path.clone(),
                nodes: nodes.clone(),
            },
            Operation::Update {
                path,
                attributes,
                old_attributes,
            } => Operation::Update {
                path: path.clone(),
                attributes: old_attributes.clone(),
                old_attributes: attributes.clone(),
            },
            Operation::UpdateText {
                path,
                delta,
                inverted,
            } => Operation::UpdateText {
                path: path.clone(),
                delta: inverted.clone(),
                inverted: delta.clone(),
            },
        }
    }

    /// Rebase this operation's path past a `prior` sibling insert or delete.
    ///
    /// Used when an operation was expressed against the document as it was
    /// before `prior` ran. Returns `None` when `prior` removed the node this
    /// operation targets, or part of the run it deletes. An insertion point
    /// that fell inside a removed run moves to where the run started.
    pub fn transform(&self, prior: &Operation) -> Option<Operation> {
        match prior {
            Operation::Insert { path, nodes } => self
                .path()
                .transform(path, nodes.len() as isize)
                .map(|path| self.with_path(path)),
            Operation::Delete { path, nodes } => self.transform_past_delete(path, nodes.len()),
            Operation::Update { .. } | Operation::UpdateText { .. } => Some(self.clone()),
        }
    }

    fn transform_past_delete(&self, at: &Path, count: usize) -> Option<Operation> {
        let own = self.path();
        if own.is_sibling_of(at) {
            let (Some(start), Some(index)) = (at.last(), own.last()) else {
                return Some(self.clone());
            };
            match self {
                Operation::Insert { .. } if index >= start && index < start + count => {
                    return Some(self.with_path(at.clone()));
                }
                Operation::Delete { nodes, .. } if index < start && index + nodes.len() > start => {
                    return None;
                }
                _ => {}
            }
        }

        own.transform(at, -(count as isize))
            .map(|path| self.with_path(path))
    }

    /// Apply this operation to `doc`.
    ///
    /// Either the whole operation lands or the document is untouched. On
    /// success the returned operation reverts exactly what happened, using
    /// the document's actual prior state rather than the stored inverse data.
    pub fn apply(&self, doc: &mut Document) -> Result<Operation, DocumentError> {
        match self {
            Operation::Insert { path, nodes } => {
                doc.insert(path, nodes.clone())?;
                Ok(Operation::Delete {
                    path: path.clone(),
                    nodes: nodes.clone(),
                })
            }

            Operation::Delete { path, nodes } => {
                let removed = doc.delete(path, nodes.len())?;
                Ok(Operation::Insert {
                    path: path.clone(),
                    nodes: removed,
                })
            }

            Operation::Update {
                path, attributes, ..
            } => {
                let current = doc
                    .node_at_path(path)
                    .ok_or_else(|| DocumentError::PathNotFound(path.clone()))?;
                let previous = invert_attributes(attributes, &current.attributes);

                doc.update(path, attributes)?;
                Ok(Operation::Update {
                    path: path.clone(),
                    attributes: previous,
                    old_attributes: attributes.clone(),
                })
            }

            Operation::UpdateText { path, delta, .. } => {
                let current = doc
                    .node_at_path(path)
                    .ok_or_else(|| DocumentError::PathNotFound(path.clone()))?
                    .delta
                    .as_ref()
                    .ok_or_else(|| DocumentError::NotText(path.clone()))?;
                let restore = delta.invert(current)?;

                doc.update_text(path, delta)?;
                Ok(Operation::UpdateText {
                    path: path.clone(),
                    delta: restore,
                    inverted: delta.clone(),
                })
            }
        }
    }
}

//! # Transactions
//!
//! A [`Transaction`] is an ordered batch of [`Operation`]s plus the
//! selection before and after it. Editing logic builds one up, then hands
//! it to [`EditorState::apply`](crate::EditorState::apply), which consumes it.
//!
//! Nothing is validated while building. The helpers that take a
//! `&Document` expect the document the transaction will be applied to.
//! They read it, as the operations queued so far would leave it, only to
//! capture inverse data (removed nodes, prior attribute values, inverted
//! deltas); the document is not touched until the transaction is applied.
//!
//! ```rust,ignore
//! let mut tx = state.transaction();
//! tx.insert_node(Path::from([1]), Node::text("hello"));
//! tx.insert_text(state.document(), Path::from([0]), 0, "Title: ")?;
//! tx.after_selection = Some(Selection::collapsed(Position::new([1], 5)));
//! state.apply(tx, ApplyOptions::default()).await?;
//! ```

use crate::{EditorError, Operation, Selection};
use folio_document::{invert_attributes, Attributes, Delta, Document, DocumentError, DocumentResult, Node, Path};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub operations: Vec<Operation>,

    #[serde(default)]
    pub before_selection: Option<Selection>,

    #[serde(default)]
    pub after_selection: Option<Selection>,
}

impl Transaction {
    /// Empty transaction started from `before_selection`
    pub fn new(before_selection: Option<Selection>) -> Self {
        Self {
            operations: Vec::new(),
            before_selection,
            after_selection: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Append an operation verbatim
    pub fn add(&mut self, operation: Operation) -> &mut Self {
        self.operations.push(operation);
        self
    }

    /// Append an operation whose path was computed against the document as
    /// it was before this transaction, shifting it past every earlier
    /// sibling insert or delete.
    ///
    /// Fails with [`DocumentError::Removed`] if an earlier operation deleted
    /// the node it targets; nothing is appended then.
    pub fn add_transformed(&mut self, operation: Operation) -> DocumentResult<&mut Self> {
        let original = operation.path().clone();
        let operation = self
            .operations
            .iter()
            .try_fold(operation, |op, prior| op.transform(prior))
            .ok_or(DocumentError::Removed(original))?;
        Ok(self.add(operation))
    }

    /// `document` as the operations queued so far leave it. Builder helpers
    /// read inverse data from this, so several edits to the same node in one
    /// transaction still invert correctly.
    fn projected<'a>(&self, document: &'a Document) -> DocumentResult<Cow<'a, Document>> {
        if self.operations.is_empty() {
            return Ok(Cow::Borrowed(document));
        }

        let mut projected = document.clone();
        for operation in &self.operations {
            operation.apply(&mut projected)?;
        }
        Ok(Cow::Owned(projected))
    }

    pub fn insert_node(&mut self, path: Path, node: Node) -> &mut Self {
        self.insert_nodes(path, vec![node])
    }

    pub fn insert_nodes(&mut self, path: Path, nodes: Vec<Node>) -> &mut Self {
        self.add(Operation::Insert { path, nodes })
    }

    pub fn delete_node(&mut self, document: &Document, path: Path) -> DocumentResult<&mut Self> {
        self.delete_nodes(document, path, 1)
    }

    /// Delete `count` siblings starting at `path`, capturing them so the
    /// operation can be inverted.
    pub fn delete_nodes(
        &mut self,
        document: &Document,
        path: Path,
        count: usize,
    ) -> DocumentResult<&mut Self> {
        let (parent, index) = match (path.parent(), path.last()) {
            (Some(parent), Some(index)) => (parent, index),
            _ => return Err(DocumentError::RootPath),
        };
        let document = self.projected(document)?;
        let siblings = &document
            .node_at_path(&parent)
            .ok_or_else(|| DocumentError::PathNotFound(path.clone()))?
            .children;
        let nodes = index
            .checked_add(count)
            .and_then(|end| siblings.get(index..end))
            .ok_or_else(|| DocumentError::index_out_of_range(&path, siblings.len()))?
            .to_vec();

        Ok(self.add(Operation::Delete { path, nodes }))
    }

    /// Merge `attributes` into the node at `path`
    pub fn update_node(
        &mut self,
        document: &Document,
        path: Path,
        attributes: Attributes,
    ) -> DocumentResult<&mut Self> {
        let document = self.projected(document)?;
        let node = document
            .node_at_path(&path)
            .ok_or_else(|| DocumentError::PathNotFound(path.clone()))?;
        let old_attributes = invert_attributes(&attributes, &node.attributes);

        Ok(self.add(Operation::Update {
            path,
            attributes,
            old_attributes,
        }))
    }

    /// Apply a change delta to the text at `path`
    pub fn update_text(
        &mut self,
        document: &Document,
        path: Path,
        delta: Delta,
    ) -> DocumentResult<&mut Self> {
        let document = self.projected(document)?;
        let base = document
            .node_at_path(&path)
            .ok_or_else(|| DocumentError::PathNotFound(path.clone()))?
            .delta
            .as_ref()
            .ok_or_else(|| DocumentError::NotText(path.clone()))?;
        let inverted = delta.invert(base)?;

        Ok(self.add(Operation::UpdateText {
            path,
            delta,
            inverted,
        }))
    }

    pub fn insert_text(
        &mut self,
        document: &Document,
        path: Path,
        index: usize,
        text: impl Into<String>,
    ) -> DocumentResult<&mut Self> {
        self.update_text(document, path, Delta::new().retain(index).insert(text))
    }

    pub fn delete_text(
        &mut self,
        document: &Document,
        path: Path,
        index: usize,
        len: usize,
    ) -> DocumentResult<&mut Self> {
        self.update_text(document, path, Delta::new().retain(index).delete(len))
    }

    /// Set `attributes` on `len` characters starting at `index`
    pub fn format_text(
        &mut self,
        document: &Document,
        path: Path,
        index: usize,
        len: usize,
        attributes: Attributes,
    ) -> DocumentResult<&mut Self> {
        self.update_text(
            document,
            path,
            Delta::new().retain(index).retain_with(len, attributes),
        )
    }

    /// Transaction that undoes this one: inverses in reverse order, with the
    /// selections swapped.
    pub fn inverted(&self) -> Transaction {
        Transaction {
            operations: self.operations.iter().rev().map(Operation::invert).collect(),
            before_selection: self.after_selection.clone(),
            after_selection: self.before_selection.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;
    use serde_json::json;

    fn sample() -> Document {
        Document::with_children(vec![Node::text("Hello"), Node::text("World")])
    }

    #[test]
    fn test_new_transaction_captures_selection() {
        let selection = Selection::collapsed(Position::new([0], 2));
        let tx = Transaction::new(Some(selection.clone()));

        assert!(tx.is_empty());
        assert_eq!(tx.before_selection, Some(selection));
        assert_eq!(tx.after_selection, None);
    }

    #[test]
    fn test_delete_nodes_captures_removed_nodes() {
        let doc = sample();
        let mut tx = Transaction::default();

        tx.delete_nodes(&doc, Path::from([0]), 2).unwrap();
        assert_eq!(
            tx.operations,
            vec![Operation::Delete {
                path: Path::from([0]),
                nodes: vec![Node::text("Hello"), Node::text("World")],
            }]
        );

        assert!(tx.delete_nodes(&doc, Path::from([1]), 2).is_err());
        assert!(tx.delete_node(&doc, Path::root()).is_err());
    }

    #[test]
    fn test_update_node_captures_old_values() {
        let doc = Document::with_children(vec![Node::text("x").with_attribute("align", "left")]);
        let mut tx = Transaction::default();

        tx.update_node(
            &doc,
            Path::from([0]),
            serde_json::from_value(json!({"align": "center", "indent": 1})).unwrap(),
        )
        .unwrap();

        let Operation::Update { old_attributes, .. } = &tx.operations[0] else {
            panic!("expected update");
        };
        assert_eq!(
            old_attributes,
            &serde_json::from_value::<Attributes>(json!({"align": "left", "indent": null})).unwrap()
        );
    }

    #[test]
    fn test_text_helpers_compute_inverse() {
        let doc = sample();
        let mut tx = Transaction::default();

        tx.insert_text(&doc, Path::from([0]), 5, "!").unwrap();
        tx.delete_text(&doc, Path::from([1]), 0, 2).unwrap();

        assert_eq!(
            tx.operations,
            vec![
                Operation::UpdateText {
                    path: Path::from([0]),
                    delta: Delta::new().retain(5).insert("!"),
                    inverted: Delta::new().retain(5).delete(1),
                },
                Operation::UpdateText {
                    path: Path::from([1]),
                    delta: Delta::new().delete(2),
                    inverted: Delta::new().insert("Wo"),
                },
            ]
        );
    }

    #[test]
    fn test_add_transformed_shifts_later_siblings() {
        let mut tx = Transaction::default();
        tx.insert_node(Path::from([0]), Node::text("a"));
        tx.add_transformed(Operation::Insert {
            path: Path::from([0]),
            nodes: vec![Node::text("b")],
        })
        .unwrap();

        assert_eq!(tx.operations[1].path(), &Path::from([1]));
    }

    #[test]
    fn test_add_transformed_past_delete() {
        let doc = Document::with_children(vec![
            Node::text("a"),
            Node::text("b"),
            Node::text("c"),
            Node::text("d"),
        ]);
        let mut tx = Transaction::default();
        tx.delete_nodes(&doc, Path::from([1]), 2).unwrap();

        let update = |index: usize| Operation::Update {
            path: Path::from([index]),
            attributes: serde_json::from_value(json!({"done": true})).unwrap(),
            old_attributes: serde_json::from_value(json!({"done": null})).unwrap(),
        };

        tx.add_transformed(update(3)).unwrap();
        assert_eq!(tx.operations[1].path(), &Path::from([1]));

        assert_eq!(
            tx.add_transformed(update(2)).unwrap_err(),
            DocumentError::Removed(Path::from([2]))
        );
        assert_eq!(tx.len(), 2);
    }

    #[test]
    fn test_chained_edits_on_one_node_invert() {
        let doc = Document::with_children(vec![Node::text("Hello")]);
        let mut tx = Transaction::default();

        tx.delete_text(&doc, Path::from([0]), 0, 2).unwrap();
        tx.delete_text(&doc, Path::from([0]), 0, 2).unwrap();
        let bold: Attributes = serde_json::from_value(json!({"bold": true})).unwrap();
        tx.format_text(&doc, Path::from([0]), 0, 1, bold).unwrap();
        for level in [1, 2] {
            let heading = serde_json::from_value(json!({ "level": level })).unwrap();
            tx.update_node(&doc, Path::from([0]), heading).unwrap();
        }

        let mut edited = doc.clone();
        for op in &tx.operations {
            op.apply(&mut edited).unwrap();
        }
        assert_eq!(edited.children()[0].plain_text(), "o");

        for op in tx.inverted().operations {
            op.apply(&mut edited).unwrap();
        }
        assert_eq!(edited, doc);
    }

    #[test]
    fn test_delete_nodes_rejects_huge_count() {
        let doc = sample();
        let mut tx = Transaction::default();

        assert_eq!(
            tx.delete_nodes(&doc, Path::from([1]), usize::MAX).unwrap_err(),
            DocumentError::IndexOutOfRange { path: Path::from([1]), len: 2 }
        );
        assert!(tx.is_empty());
    }

    #[test]
    fn test_helpers_see_queued_structure_changes() {
        let doc = sample();
        let mut tx = Transaction::default();

        tx.insert_node(Path::from([0]), Node::text("new"));
        tx.delete_node(&doc, Path::from([2])).unwrap();

        assert_eq!(
            tx.operations[1],
            Operation::Delete {
                path: Path::from([2]),
                nodes: vec![Node::text("World")],
            }
        );
    }

    #[test]
    fn test_inverted_transaction() {
        let mut tx = Transaction::new(Some(Selection::collapsed(Position::new([0], 0))));
        tx.insert_node(Path::from([1]), Node::text("a"));
        tx.insert_node(Path::from([2]), Node::text("b"));
        tx.after_selection = Some(Selection::collapsed(Position::new([2], 1)));

        let inverted = tx.inverted();
        assert_eq!(inverted.operations[0].path(), &Path::from([2]));
        assert_eq!(inverted.operations[0].name(), "delete");
        assert_eq!(inverted.before_selection, tx.after_selection);
        assert_eq!(inverted.after_selection, tx.before_selection);
    }

    #[test]
    fn test_json_round_trip() {
        let doc = sample();
        let mut tx = Transaction::new(Some(Selection::single([0], 0, 5)));
        tx.insert_text(&doc, Path::from([0]), 0, ">> ").unwrap();

        let json = tx.to_json().unwrap();
        assert_eq!(Transaction::from_json(&json).unwrap(), tx);
    }
}

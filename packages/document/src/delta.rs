//! # Text Deltas
//!
//! Text content is stored as a [`Delta`]: an ordered list of runs, each
//! carrying its own [`Attributes`]. A delta made only of inserts is a
//! *document delta* (the text of a node). A delta mixing retain, insert and
//! delete is a *change* applied to a document delta with [`Delta::compose`].
//!
//! Lengths are counted in `char`s.
//!
//! ```text
//! base:    [insert "Hello world"]
//! change:  [retain 6, delete 5, insert "there"]
//! result:  [insert "Hello there"]
//! ```

use crate::attributes::{compose_attributes, invert_attributes, Attributes};
use crate::error::{DocumentError, DocumentResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeltaOp {
    Insert {
        insert: String,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
    },
    Retain {
        retain: usize,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
    },
    Delete {
        delete: usize,
    },
}

impl DeltaOp {
    pub fn insert(text: impl Into<String>) -> Self {
        Self::Insert {
            insert: text.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn retain(len: usize) -> Self {
        Self::Retain {
            retain: len,
            attributes: Attributes::new(),
        }
    }

    pub fn delete(len: usize) -> Self {
        Self::Delete { delete: len }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Insert { insert, .. } => insert.chars().count(),
            Self::Retain { retain, .. } => *retain,
            Self::Delete { delete } => *delete,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Self::Insert { attributes, .. } | Self::Retain { attributes, .. } => Some(attributes),
            Self::Delete { .. } => None,
        }
    }
}

/// Walks a list of ops handing out chunks of a requested length,
/// splitting ops when needed.
struct OpCursor<'a> {
    ops: &'a [DeltaOp],
    index: usize,
    offset: usize,
}

impl<'a> OpCursor<'a> {
    fn new(ops: &'a [DeltaOp]) -> Self {
        Self {
            ops,
            index: 0,
            offset: 0,
        }
    }

    fn has_next(&self) -> bool {
        self.index < self.ops.len()
    }

    /// Take at most `len` from the current op.
    fn next(&mut self, len: usize) -> Option<DeltaOp> {
        let op = self.ops.get(self.index)?;
        let remaining = op.len() - self.offset;
        let take = remaining.min(len);

        let chunk = match op {
            DeltaOp::Insert { insert, attributes } => DeltaOp::Insert {
                insert: insert.chars().skip(self.offset).take(take).collect(),
                attributes: attributes.clone(),
            },
            DeltaOp::Retain { attributes, .. } => DeltaOp::Retain {
                retain: take,
                attributes: attributes.clone(),
            },
            DeltaOp::Delete { .. } => DeltaOp::Delete { delete: take },
        };

        if take == remaining {
            self.index += 1;
            self.offset = 0;
        } else {
            self.offset += take;
        }
        Some(chunk)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Delta {
    ops: Vec<DeltaOp>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document delta holding a single unformatted run
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new().insert(text)
    }

    pub fn from_ops(ops: impl IntoIterator<Item = DeltaOp>) -> Self {
        let mut delta = Self::new();
        for op in ops {
            delta.push(op);
        }
        delta
    }

    pub fn ops(&self) -> &[DeltaOp] {
        &self.ops
    }

    pub fn insert(mut self, text: impl Into<String>) -> Self {
        self.push(DeltaOp::insert(text));
        self
    }

    pub fn insert_with(mut self, text: impl Into<String>, attributes: Attributes) -> Self {
        self.push(DeltaOp::Insert {
            insert: text.into(),
            attributes,
        });
        self
    }

    pub fn retain(mut self, len: usize) -> Self {
        self.push(DeltaOp::retain(len));
        self
    }

    pub fn retain_with(mut self, len: usize, attributes: Attributes) -> Self {
        self.push(DeltaOp::Retain {
            retain: len,
            attributes,
        });
        self
    }

    pub fn delete(mut self, len: usize) -> Self {
        self.push(DeltaOp::delete(len));
        self
    }

    /// Append an op, merging it into the previous one when both are the
    /// same kind with identical attributes. Empty ops are dropped.
    pub fn push(&mut self, op: DeltaOp) {
        if op.is_empty() {
            return;
        }

        if let Some(last) = self.ops.last_mut() {
            match (last, &op) {
                (DeltaOp::Delete { delete }, DeltaOp::Delete { delete: more }) => {
                    *delete += more;
                    return;
                }
                (
                    DeltaOp::Insert { insert, attributes },
                    DeltaOp::Insert {
                        insert: more,
                        attributes: other,
                    },
                ) if *attributes == *other => {
                    insert.push_str(more);
                    return;
                }
                (
                    DeltaOp::Retain { retain, attributes },
                    DeltaOp::Retain {
                        retain: more,
                        attributes: other,
                    },
                ) if *attributes == *other => {
                    *retain += more;
                    return;
                }
                _ => {}
            }
        }

        self.ops.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Total length of all ops
    pub fn len(&self) -> usize {
        self.ops.iter().map(DeltaOp::len).sum()
    }

    /// True if this delta is made only of inserts
    pub fn is_document(&self) -> bool {
        self.ops
            .iter()
            .all(|op| matches!(op, DeltaOp::Insert { .. }))
    }

    pub fn to_plain_text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DeltaOp::Insert { insert, .. } => Some(insert.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Runs covering `start..end` of a document delta
    pub fn slice(&self, start: usize, end: usize) -> DocumentResult<Delta> {
        let length = self.len();
        if end > length {
            return Err(DocumentError::delta_out_of_bounds(end, length));
        }

        let mut cursor = OpCursor::new(&self.ops);
        let mut sliced = Delta::new();
        let mut position = 0;

        while position < end {
            let wanted = if position < start { start - position } else { end - position };
            let Some(chunk) = cursor.next(wanted) else { break };
            let len = chunk.len();
            if position >= start {
                sliced.push(chunk);
            }
            position += len;
        }

        Ok(sliced)
    }

    /// Apply `change` to this document delta.
    ///
    /// Fails without producing anything if `change` retains or deletes past
    /// the end of the text.
    pub fn compose(&self, change: &Delta) -> DocumentResult<Delta> {
        if !self.is_document() {
            return Err(DocumentError::NotDocumentDelta);
        }

        let length = self.len();
        let mut base = OpCursor::new(&self.ops);
        let mut composed = Delta::new();
        let mut position = 0;

        for op in &change.ops {
            match op {
                DeltaOp::Insert { .. } => composed.push(op.clone()),
                DeltaOp::Retain { retain, attributes } => {
                    let mut remaining = *retain;
                    while remaining > 0 {
                        let Some(chunk) = base.next(remaining) else {
                            return Err(DocumentError::delta_out_of_bounds(
                                position + remaining,
                                length,
                            ));
                        };
                        remaining -= chunk.len();
                        position += chunk.len();
                        composed.push(match chunk {
                            DeltaOp::Insert {
                                insert,
                                attributes: current,
                            } => DeltaOp::Insert {
                                insert,
                                attributes: compose_attributes(&current, attributes, false),
                            },
                            other => other,
                        });
                    }
                }
                DeltaOp::Delete { delete } => {
                    let mut remaining = *delete;
                    while remaining > 0 {
                        let Some(chunk) = base.next(remaining) else {
                            return Err(DocumentError::delta_out_of_bounds(
                                position + remaining,
                                length,
                            ));
                        };
                        remaining -= chunk.len();
                        position += chunk.len();
                    }
                }
            }
        }

        while base.has_next() {
            if let Some(chunk) = base.next(usize::MAX) {
                composed.push(chunk);
            }
        }

        Ok(composed)
    }

    /// Build the change that undoes applying `self` to `base`.
    pub fn invert(&self, base: &Delta) -> DocumentResult<Delta> {
        if !base.is_document() {
            return Err(DocumentError::NotDocumentDelta);
        }

        let mut inverted = Delta::new();
        let mut index = 0;

        for op in &self.ops {
            match op {
                DeltaOp::Insert { .. } => inverted.push(DeltaOp::delete(op.len())),
                DeltaOp::Retain { retain, attributes } if attributes.is_empty() => {
                    inverted.push(DeltaOp::retain(*retain));
                    index += retain;
                }
                DeltaOp::Retain { retain, attributes } => {
                    for chunk in base.slice(index, index + retain)?.ops {
                        let current = chunk.attributes().cloned().unwrap_or_default();
                        inverted.push(DeltaOp::Retain {
                            retain: chunk.len(),
                            attributes: invert_attributes(attributes, &current),
                        });
                    }
                    index += retain;
                }
                DeltaOp::Delete { delete } => {
                    for chunk in base.slice(index, index + delete)?.ops {
                        inverted.push(chunk);
                    }
                    index += delete;
                }
            }
        }

        inverted.chop();
        Ok(inverted)
    }

    /// Drop a trailing unformatted retain, which is a no-op
    fn chop(&mut self) {
        if let Some(DeltaOp::Retain { attributes, .. }) = self.ops.last() {
            if attributes.is_empty() {
                self.ops.pop();
            }
        }
    }
}

//! # Paths
//!
//! A [`Path`] locates a node by walking child indices from the document
//! root. The root itself is the empty path; `[0]` is its first child.
//!
//! Ordering is lexicographic over the index sequence, which matches
//! pre-order document order: a parent sorts before its children, and a
//! node's descendants sort before its next sibling.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    /// The root path (no indices)
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the addressed node within its parent
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Path of the parent node, `None` for the root
    pub fn parent(&self) -> Option<Path> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    /// Path of the `index`-th child of this node
    pub fn child(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Path of the next sibling. The root has no siblings and maps to itself.
    pub fn next(&self) -> Path {
        let mut indices = self.0.clone();
        if let Some(last) = indices.last_mut() {
            *last += 1;
        }
        Self(indices)
    }

    /// Path of the previous sibling, `None` for a first child or the root
    pub fn previous(&self) -> Option<Path> {
        let mut indices = self.0.clone();
        let last = indices.last_mut()?;
        *last = last.checked_sub(1)?;
        Some(Self(indices))
    }

    /// True if `self` is a strict ancestor of `other`
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// True if both paths share the same parent
    pub fn is_sibling_of(&self, other: &Path) -> bool {
        !self.0.is_empty()
            && self.0.len() == other.0.len()
            && self.0[..self.0.len() - 1] == other.0[..other.0.len() - 1]
    }

    /// Shift `self` to account for `count` nodes inserted (`delta > 0`) or
    /// removed (`delta < 0`) at `at`.
    ///
    /// Only paths that pass through a sibling at or after `at` move. Paths
    /// shorter than `at`, or living under a different parent, are returned
    /// unchanged. Returns `None` when `self` is one of the removed nodes or
    /// lies inside one.
    pub fn transform(&self, at: &Path, delta: isize) -> Option<Path> {
        let Some(depth) = at.len().checked_sub(1) else {
            return Some(self.clone());
        };
        if self.len() <= depth || self.0[..depth] != at.0[..depth] {
            return Some(self.clone());
        }

        let start = at.0[depth];
        let mut indices = self.0.clone();
        let index = indices[depth];
        if index < start {
            return Some(self.clone());
        }

        if delta >= 0 {
            indices[depth] = index.saturating_add(delta.unsigned_abs());
        } else {
            let removed = delta.unsigned_abs();
            if index - start < removed {
                return None;
            }
            indices[depth] = index - removed;
        }
        Some(Self(indices))
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    fn from(indices: [usize; N]) -> Self {
        Self(indices.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", index)?;
        }
        write!(f, "]")
    }
}

//! # Selection
//!
//! A [`Selection`] is a pair of [`Position`]s. `start` is where the user
//! began selecting and `end` is where they stopped, so `end` may come
//! before `start` in document order.
//!
//! Orientation follows that order:
//!
//! - **forward**: `end` lies before `start`
//! - **backward**: `start` lies before or at `end`
//!
//! Selections are values. The editor replaces them wholesale.

use folio_document::Path;
use serde::{Deserialize, Serialize};

/// A caret location: a node path plus a character offset inside it.
///
/// Ordering compares the path first, then the offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub path: Path,
    pub offset: usize,
}

impl Position {
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub start: Position,
    pub end: Position,
}

impl Selection {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Caret with no extent
    pub fn collapsed(position: Position) -> Self {
        Self {
            start: position.clone(),
            end: position,
        }
    }

    /// Range inside a single node
    pub fn single(path: impl Into<Path>, start_offset: usize, end_offset: usize) -> Self {
        let path = path.into();
        Self {
            start: Position::new(path.clone(), start_offset),
            end: Position::new(path, end_offset),
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn is_single(&self) -> bool {
        self.start.path == self.end.path
    }

    /// `end` lies before `start` in document order
    pub fn is_forward(&self) -> bool {
        self.end < self.start
    }

    pub fn is_backward(&self) -> bool {
        !self.is_forward()
    }

    /// Swap the two ends
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end.clone(),
            end: self.start.clone(),
        }
    }

    /// Same range with `start <= end` in document order
    pub fn normalized(&self) -> Self {
        if self.is_forward() {
            self.reversed()
        } else {
            self.clone()
        }
    }
}

/// Why a selection changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionUpdateReason {
    /// Direct pointer or keyboard interaction; the view already shows it
    UiEvent,
    /// Set from a transaction's after-selection
    Transaction,
    /// Originated from another collaborator
    Remote,
    #[default]
    Other,
}

/// The presentation side that draws carets and selection handles.
pub trait SelectionService: Send {
    fn update_selection(&mut self, selection: Option<&Selection>);
}

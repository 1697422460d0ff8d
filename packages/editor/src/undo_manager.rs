//! # Undo/Redo History
//!
//! Records applied transactions as [`HistoryItem`]s on two independent
//! stacks.
//!
//! ## Design
//!
//! - Undo-recorded transactions accumulate into the newest undo item while
//!   it is open; the seal timer closes it once edits go quiet
//! - Only the newest undo item may be open
//! - Redo-recorded transactions always become a new, sealed item
//! - Recording never clears the redo stack; the undo/redo command layer
//!   decides when redo history is stale
//! - Both stacks are bounded and drop their oldest item on overflow
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut manager = UndoManager::new(20);
//! manager.record_undo(&typed_a);
//! manager.record_undo(&typed_b); // same item as typed_a
//! manager.seal_undo();
//!
//! let item = manager.pop_undo().unwrap();
//! state.apply(item.inverse_transaction(), ApplyOptions::for_undo()).await?;
//! ```

use crate::{Operation, Selection, Transaction};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One undoable unit: the operations of one or more coalesced transactions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryItem {
    operations: Vec<Operation>,
    before_selection: Option<Selection>,
    after_selection: Option<Selection>,
    sealed: bool,
}

impl HistoryItem {
    /// Open item holding nothing yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Sealed item holding exactly `transaction`
    pub fn sealed_from(transaction: &Transaction) -> Self {
        let mut item = Self::new();
        item.record(transaction);
        item.seal();
        item
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn before_selection(&self) -> Option<&Selection> {
        self.before_selection.as_ref()
    }

    pub fn after_selection(&self) -> Option<&Selection> {
        self.after_selection.as_ref()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Fold a transaction into this item. The first recorded
    /// before-selection sticks; the after-selection always follows the
    /// latest transaction.
    fn record(&mut self, transaction: &Transaction) {
        self.operations.extend(transaction.operations.iter().cloned());
        if self.before_selection.is_none() {
            self.before_selection = transaction.before_selection.clone();
        }
        self.after_selection = transaction.after_selection.clone();
    }

    /// Append operations without touching the captured selections
    fn append(&mut self, transaction: &Transaction) {
        self.operations.extend(transaction.operations.iter().cloned());
    }

    /// Transaction that reverts this item: stored inverses in reverse order,
    /// landing the selection back where the item started
    pub fn inverse_transaction(&self) -> Transaction {
        Transaction {
            operations: self.operations.iter().rev().map(Operation::invert).collect(),
            before_selection: self.after_selection.clone(),
            after_selection: self.before_selection.clone(),
        }
    }
}

/// LIFO stack of history items with an optional size cap.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    items: VecDeque<HistoryItem>,
    max_len: usize,
}

impl HistoryStack {
    /// `max_len` of 0 means unbounded
    pub fn new(max_len: usize) -> Self {
        Self {
            items: VecDeque::new(),
            max_len,
        }
    }

    pub fn push(&mut self, item: HistoryItem) {
        self.items.push_back(item);
        if self.max_len > 0 && self.items.len() > self.max_len {
            self.items.pop_front();
        }
    }

    pub fn pop(&mut self) -> Option<HistoryItem> {
        self.items.pop_back()
    }

    pub fn last(&self) -> Option<&HistoryItem> {
        self.items.back()
    }

    fn last_mut(&mut self) -> Option<&mut HistoryItem> {
        self.items.back_mut()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryItem> {
        self.items.get(index)
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &HistoryItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Undo and redo stacks for one editor state
#[derive(Debug, Clone)]
pub struct UndoManager {
    undo_stack: HistoryStack,
    redo_stack: HistoryStack,
}

impl UndoManager {
    /// Create a manager keeping at most `max_levels` items per stack
    /// (0 = unlimited)
    pub fn new(max_levels: usize) -> Self {
        Self {
            undo_stack: HistoryStack::new(max_levels),
            redo_stack: HistoryStack::new(max_levels),
        }
    }

    pub fn undo_stack(&self) -> &HistoryStack {
        &self.undo_stack
    }

    pub fn redo_stack(&self) -> &HistoryStack {
        &self.redo_stack
    }

    /// Fold `transaction` into the open undo item, opening one if the newest
    /// item is sealed or the stack is empty
    pub fn record_undo(&mut self, transaction: &Transaction) {
        match self.undo_stack.last_mut() {
            Some(item) if !item.is_sealed() => item.record(transaction),
            _ => {
                let mut item = HistoryItem::new();
                item.record(transaction);
                self.undo_stack.push(item);
            }
        }

        tracing::trace!(
            ops = transaction.operations.len(),
            undo_stack = self.undo_stack.len(),
            "recorded undo"
        );
    }

    /// Push `transaction` onto the redo stack as its own sealed item
    pub fn record_redo(&mut self, transaction: &Transaction) {
        self.redo_stack.push(HistoryItem::sealed_from(transaction));

        tracing::trace!(
            ops = transaction.operations.len(),
            redo_stack = self.redo_stack.len(),
            "recorded redo"
        );
    }

    /// Append to the newest undo item even if it is sealed. Only for
    /// corrections the editor makes right after recording that item, so
    /// they undo together with the edit that triggered them. The item's
    /// selections stay those of the triggering edit.
    pub fn extend_undo(&mut self, transaction: &Transaction) {
        match self.undo_stack.last_mut() {
            Some(item) => item.append(transaction),
            None => self.record_undo(transaction),
        }
    }

    /// Same as [`extend_undo`](Self::extend_undo) for the redo stack
    pub fn extend_redo(&mut self, transaction: &Transaction) {
        match self.redo_stack.last_mut() {
            Some(item) => item.append(transaction),
            None => self.record_redo(transaction),
        }
    }

    /// Seal the newest undo item if it is open. Returns true if one was sealed.
    pub fn seal_undo(&mut self) -> bool {
        match self.undo_stack.last_mut() {
            Some(item) if !item.is_sealed() => {
                item.seal();
                tracing::trace!(ops = item.len(), "sealed undo item");
                true
            }
            _ => false,
        }
    }

    pub fn has_open_item(&self) -> bool {
        self.undo_stack.last().is_some_and(|item| !item.is_sealed())
    }

    pub fn pop_undo(&mut self) -> Option<HistoryItem> {
        self.undo_stack.pop()
    }

    pub fn pop_redo(&mut self) -> Option<HistoryItem> {
        self.redo_stack.pop()
    }

    /// Put back an item taken with [`pop_undo`](Self::pop_undo)
    pub fn push_undo(&mut self, item: HistoryItem) {
        self.undo_stack.push(item);
    }

    /// Put back an item taken with [`pop_redo`](Self::pop_redo)
    pub fn push_redo(&mut self, item: HistoryItem) {
        self.redo_stack.push(item);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear_redo(&mut self) {
        self.redo_stack.clear();
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(20)
    }
}

/// Lock a shared manager, recovering the data if a holder panicked
pub(crate) fn lock(manager: &Mutex<UndoManager>) -> MutexGuard<'_, UndoManager> {
    manager.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;
    use folio_document::{Node, Path};

    fn insert_at(index: usize, caret: usize) -> Transaction {
        let mut tx = Transaction::new(Some(Selection::collapsed(Position::new([0], caret))));
        tx.insert_node(Path::from([index]), Node::text(format!("node {}", index)));
        tx.after_selection = Some(Selection::collapsed(Position::new([0], caret + 1)));
        tx
    }

    #[test]
    fn test_manager_creation() {
        let manager = UndoManager::default();
        assert!(!manager.can_undo());
        assert!(!manager.can_redo());
        assert!(!manager.has_open_item());
    }

    #[test]
    fn test_record_undo_coalesces_open_item() {
        let mut manager = UndoManager::default();

        manager.record_undo(&insert_at(1, 0));
        manager.record_undo(&insert_at(2, 1));

        assert_eq!(manager.undo_stack().len(), 1);
        let item = manager.undo_stack().last().unwrap();
        assert_eq!(item.len(), 2);
        assert!(!item.is_sealed());
        assert_eq!(item.before_selection(), insert_at(1, 0).before_selection.as_ref());
        assert_eq!(item.after_selection(), insert_at(2, 1).after_selection.as_ref());
    }

    #[test]
    fn test_sealed_item_starts_new_one() {
        let mut manager = UndoManager::default();

        manager.record_undo(&insert_at(1, 0));
        assert!(manager.seal_undo());
        assert!(!manager.seal_undo());
        manager.record_undo(&insert_at(2, 1));

        assert_eq!(manager.undo_stack().len(), 2);
        assert!(manager.undo_stack().get(0).unwrap().is_sealed());
        assert!(manager.has_open_item());
    }

    #[test]
    fn test_redo_items_never_coalesce() {
        let mut manager = UndoManager::default();

        manager.record_redo(&insert_at(1, 0));
        manager.record_redo(&insert_at(2, 1));

        assert_eq!(manager.redo_stack().len(), 2);
        assert!(manager.redo_stack().iter().all(HistoryItem::is_sealed));
        assert!(!manager.can_undo());
    }

    #[test]
    fn test_recording_keeps_redo_stack() {
        let mut manager = UndoManager::default();

        manager.record_redo(&insert_at(1, 0));
        manager.record_undo(&insert_at(2, 0));

        assert_eq!(manager.redo_stack().len(), 1);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut manager = UndoManager::new(2);

        for i in 0..3 {
            manager.record_undo(&insert_at(i + 1, i));
            manager.seal_undo();
        }

        assert_eq!(manager.undo_stack().len(), 2);
        let oldest = manager.undo_stack().get(0).unwrap();
        assert_eq!(oldest.operations()[0].path(), &Path::from([2]));
    }

    #[test]
    fn test_extend_keeps_item_selections() {
        let mut manager = UndoManager::default();
        manager.record_undo(&insert_at(1, 0));
        manager.seal_undo();

        let mut correction = insert_at(2, 7);
        correction.after_selection = None;
        manager.extend_undo(&correction);

        let item = manager.undo_stack().last().unwrap();
        assert_eq!(item.len(), 2);
        assert!(item.is_sealed());
        assert_eq!(item.before_selection(), insert_at(1, 0).before_selection.as_ref());
        assert_eq!(item.after_selection(), insert_at(1, 0).after_selection.as_ref());
    }

    #[test]
    fn test_inverse_transaction() {
        let mut manager = UndoManager::default();
        manager.record_undo(&insert_at(1, 0));
        manager.record_undo(&insert_at(2, 1));

        let tx = manager.undo_stack().last().unwrap().inverse_transaction();
        let paths: Vec<_> = tx.operations.iter().map(|op| op.path().clone()).collect();

        assert_eq!(paths, vec![Path::from([2]), Path::from([1])]);
        assert!(tx.operations.iter().all(|op| op.name() == "delete"));
        assert_eq!(tx.after_selection, insert_at(1, 0).before_selection);
    }
}

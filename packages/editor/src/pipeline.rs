//! # Apply Pipeline
//!
//! Every document mutation goes through [`EditorState::apply`]:
//!
//! ```text
//! not editable ──► no-op
//!      │
//!  operations ──► (failure: revert earlier ops, return error)
//!      │
//!  broadcast ──► history ──► selection ──► rules ──► next frame
//!                                           │
//!                                  nested apply (depth + 1)
//! ```
//!
//! Everything up to and including the rule pass runs synchronously, so no
//! other apply can interleave with a transaction. The only await point is
//! the frame hook at the very end.

use crate::broadcast::AppliedTransaction;
use crate::state::EditorState;
use crate::{EditorError, SelectionUpdateReason, Transaction};

/// How an apply interacts with history and selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Fold the transaction into the open undo item
    pub record_undo: bool,

    /// Push the transaction onto the redo stack. Ignored when
    /// `record_undo` is also set.
    pub record_redo: bool,

    /// Replace the selection with the transaction's after-selection
    pub with_update_selection: bool,

    /// The transaction came from another collaborator
    pub is_remote: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            record_undo: true,
            record_redo: false,
            with_update_selection: true,
            is_remote: false,
        }
    }
}

impl ApplyOptions {
    /// Remote edit, kept out of local history
    pub fn remote() -> Self {
        Self {
            record_undo: false,
            is_remote: true,
            ..Self::default()
        }
    }

    /// Applying an undo: the reverted change becomes redoable
    pub fn for_undo() -> Self {
        Self {
            record_undo: false,
            record_redo: true,
            ..Self::default()
        }
    }

    /// Applying a redo: the change becomes undoable again
    pub fn for_redo() -> Self {
        Self::default()
    }

    /// No history side effects
    pub fn without_history() -> Self {
        Self {
            record_undo: false,
            record_redo: false,
            ..Self::default()
        }
    }

    pub fn without_selection_update(mut self) -> Self {
        self.with_update_selection = false;
        self
    }
}

impl EditorState {
    /// Apply `transaction` to the document.
    ///
    /// 1. Returns at once, untouched, if the editor is not editable
    /// 2. Applies the operations in order. If one fails, the ones before
    ///    it are reverted and the error names the failing index; nothing
    ///    else happens
    /// 3. Broadcasts the transaction to subscribers
    /// 4. Records history according to `options`
    /// 5. Sets the selection to the after-selection if requested
    /// 6. Runs structural rules, which may apply a corrective transaction
    /// 7. Waits for the next frame
    pub async fn apply(
        &mut self,
        transaction: Transaction,
        options: ApplyOptions,
    ) -> Result<(), EditorError> {
        if !self.editable {
            tracing::debug!(ops = transaction.len(), "editor is not editable, ignoring apply");
            return Ok(());
        }

        self.commit(transaction, options, 0, false)?;
        self.frames.next_frame().await;
        Ok(())
    }

    /// Apply one transaction and everything that follows from it.
    /// `extend_history` is set for rule corrections whose triggering apply
    /// was recorded, so they join that history item.
    fn commit(
        &mut self,
        transaction: Transaction,
        options: ApplyOptions,
        depth: usize,
        extend_history: bool,
    ) -> Result<(), EditorError> {
        let _span = tracing::debug_span!(
            "apply",
            ops = transaction.len(),
            remote = options.is_remote,
            depth
        )
        .entered();

        self.apply_operations(&transaction)?;

        let applied = AppliedTransaction {
            transaction,
            is_remote: options.is_remote,
        };
        self.transactions.emit(&applied);
        tracing::debug!("transaction applied");

        let recorded = self.record_history(&applied.transaction, &options, extend_history);

        if options.with_update_selection {
            self.present_selection(
                applied.transaction.after_selection.clone(),
                SelectionUpdateReason::Transaction,
            );
        }

        let rules = self.apply_rules(options, depth, recorded);

        // The countdown starts once the item holds its corrections too
        if recorded && options.record_undo && !extend_history {
            self.seal_timer.rearm(&self.history);
        }
        rules
    }

    /// Apply every operation or none of them.
    fn apply_operations(&mut self, transaction: &Transaction) -> Result<(), EditorError> {
        let mut reverts = Vec::with_capacity(transaction.len());

        for (index, operation) in transaction.operations.iter().enumerate() {
            match operation.apply(&mut self.document) {
                Ok(revert) => reverts.push(revert),
                Err(source) => {
                    tracing::warn!(
                        index,
                        op = operation.name(),
                        path = %operation.path(),
                        error = %source,
                        "operation failed, reverting transaction"
                    );
                    self.revert(reverts)?;
                    return Err(EditorError::Operation { index, source });
                }
            }
        }

        Ok(())
    }

    fn revert(&mut self, reverts: Vec<crate::Operation>) -> Result<(), EditorError> {
        for (index, revert) in reverts.iter().enumerate().rev() {
            if let Err(source) = revert.apply(&mut self.document) {
                tracing::error!(index, error = %source, "could not revert operation");
                return Err(EditorError::Rollback { index, source });
            }
        }
        Ok(())
    }

    /// Returns true if the transaction went into history
    fn record_history(
        &mut self,
        transaction: &Transaction,
        options: &ApplyOptions,
        extend: bool,
    ) -> bool {
        if transaction.is_empty() {
            return false;
        }

        if options.record_undo {
            if extend {
                self.history().extend_undo(transaction);
            } else {
                self.seal_timer.cancel();
                self.history().record_undo(transaction);
            }
            true
        } else if options.record_redo {
            if extend {
                self.history().extend_redo(transaction);
            } else {
                self.history().record_redo(transaction);
            }
            true
        } else {
            false
        }
    }

    fn apply_rules(
        &mut self,
        options: ApplyOptions,
        depth: usize,
        parent_recorded: bool,
    ) -> Result<(), EditorError> {
        if !self.rules.is_enabled() {
            return Ok(());
        }
        if depth >= self.rules.max_depth() {
            tracing::debug!(depth, "rule depth limit reached, skipping corrections");
            return Ok(());
        }

        let corrections = self.rules.corrections(&self.document, self.selection.clone());
        if corrections.is_empty() {
            return Ok(());
        }

        let options = ApplyOptions {
            with_update_selection: false,
            ..options
        };
        self.commit(corrections, options, depth + 1, parent_recorded)
    }
}

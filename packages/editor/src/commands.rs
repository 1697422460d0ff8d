//! Undo and redo commands built on the history stacks.
//!
//! Undo pops the newest undo item and applies its inverse with
//! [`ApplyOptions::for_undo`], which lands the reverted change on the redo
//! stack. Redo does the mirror image. If the inverse fails to apply, the
//! item goes back where it came from.

use crate::pipeline::ApplyOptions;
use crate::state::EditorState;
use crate::EditorError;

impl EditorState {
    /// Revert the newest undo step. Returns false if there was nothing to
    /// undo or the editor is not editable.
    pub async fn undo(&mut self) -> Result<bool, EditorError> {
        if !self.editable {
            return Ok(false);
        }

        // An item still coalescing is closed before it is reverted
        self.seal_timer.cancel();
        let item = {
            let mut history = self.history();
            history.seal_undo();
            history.pop_undo()
        };
        let Some(item) = item else {
            return Ok(false);
        };

        tracing::debug!(ops = item.len(), "undo");
        if let Err(err) = self.apply(item.inverse_transaction(), ApplyOptions::for_undo()).await {
            self.history().push_undo(item);
            return Err(err);
        }
        Ok(true)
    }

    /// Reapply the newest redo step. Returns false if there was nothing to
    /// redo or the editor is not editable.
    pub async fn redo(&mut self) -> Result<bool, EditorError> {
        if !self.editable {
            return Ok(false);
        }

        let Some(item) = self.history().pop_redo() else {
            return Ok(false);
        };

        tracing::debug!(ops = item.len(), "redo");
        if let Err(err) = self.apply(item.inverse_transaction(), ApplyOptions::for_redo()).await {
            self.history().push_redo(item);
            return Err(err);
        }

        // A redo is its own step, never merged with later typing
        self.seal_timer.cancel();
        self.history().seal_undo();
        Ok(true)
    }
}

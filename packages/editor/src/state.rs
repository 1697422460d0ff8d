//! # Editor State
//!
//! [`EditorState`] owns everything one editing surface needs: the
//! document, the current selection, history, rules and the observer
//! streams. It is the only way to mutate the document; see
//! [`EditorState::apply`].
//!
//! The state is single-mutator. Callers serialize applies (including
//! remote ones) before they reach it.

use crate::broadcast::{AppliedTransaction, Broadcaster, SubscriptionId};
use crate::frame::{FrameScheduler, ImmediateFrames};
use crate::rules::RuleEngine;
use crate::seal_timer::SealTimer;
use crate::undo_manager::{lock, UndoManager};
use crate::{EditorConfig, Selection, SelectionService, SelectionUpdateReason, Transaction};
use folio_document::{Document, Node, Path};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct EditorState {
    pub(crate) document: Document,
    pub(crate) selection: Option<Selection>,
    pub(crate) selection_reason: SelectionUpdateReason,
    pub(crate) editable: bool,
    pub(crate) rules: RuleEngine,
    pub(crate) history: Arc<Mutex<UndoManager>>,
    pub(crate) seal_timer: SealTimer,
    pub(crate) transactions: Broadcaster<AppliedTransaction>,
    pub(crate) selection_changes: Broadcaster<Option<Selection>>,
    pub(crate) selection_service: Option<Box<dyn SelectionService>>,
    pub(crate) frames: Box<dyn FrameScheduler>,
}

impl EditorState {
    /// Editor over `document` with the default configuration
    pub fn new(document: Document) -> Self {
        Self::with_config(document, &EditorConfig::default())
    }

    pub fn with_config(document: Document, config: &EditorConfig) -> Self {
        let mut rules = RuleEngine::new(config.max_rule_depth);
        rules.set_enabled(config.rules_enabled);

        Self {
            document,
            selection: None,
            selection_reason: SelectionUpdateReason::default(),
            editable: config.editable,
            rules,
            history: Arc::new(Mutex::new(UndoManager::new(config.max_undo_levels))),
            seal_timer: SealTimer::new(config.seal_delay(), config.seal_timer_enabled),
            transactions: Broadcaster::new(),
            selection_changes: Broadcaster::new(),
            selection_service: None,
            frames: Box::new(ImmediateFrames),
        }
    }

    /// Replace the rule set, keeping the current enabled flag
    pub fn with_rules(mut self, mut rules: RuleEngine) -> Self {
        rules.set_enabled(self.rules.is_enabled());
        self.rules = rules;
        self
    }

    pub fn with_frame_scheduler(mut self, frames: impl FrameScheduler + 'static) -> Self {
        self.frames = Box::new(frames);
        self
    }

    pub fn with_selection_service(mut self, service: impl SelectionService + 'static) -> Self {
        self.selection_service = Some(Box::new(service));
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Empty transaction starting from the current selection
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self.selection.clone())
    }

    pub fn get_node_at_path(&self, path: &Path) -> Option<&Node> {
        self.document.node_at_path(path)
    }

    /// Nodes covered by `selection`, ordered the way the user selected:
    /// document order for a backward selection, reversed for a forward one.
    /// Empty if either end no longer resolves.
    pub fn get_nodes_in_selection(&self, selection: &Selection) -> Vec<&Node> {
        let normalized = selection.normalized();
        let mut nodes = self
            .document
            .nodes_between(&normalized.start.path, &normalized.end.path);
        if selection.is_forward() {
            nodes.reverse();
        }
        nodes
    }

    // --- selection ---

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Why the selection last changed
    pub fn selection_reason(&self) -> SelectionUpdateReason {
        self.selection_reason
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.update_selection_with_reason(selection, SelectionUpdateReason::Other);
    }

    /// Replace the selection and notify observers, even if nothing changed
    pub fn update_selection_with_reason(
        &mut self,
        selection: Option<Selection>,
        reason: SelectionUpdateReason,
    ) {
        self.selection_reason = reason;
        self.selection = selection;
        self.selection_changes.emit(&self.selection);
    }

    /// Move the cursor. Unless the change came from the view itself, the
    /// selection service is told to draw it. Completes on the next frame.
    pub async fn update_cursor_selection(
        &mut self,
        selection: Option<Selection>,
        reason: SelectionUpdateReason,
    ) {
        self.present_selection(selection, reason);
        self.frames.next_frame().await;
    }

    pub(crate) fn present_selection(
        &mut self,
        selection: Option<Selection>,
        reason: SelectionUpdateReason,
    ) {
        if reason != SelectionUpdateReason::UiEvent {
            if let Some(service) = self.selection_service.as_mut() {
                service.update_selection(selection.as_ref());
            }
        }
        self.update_selection_with_reason(selection, reason);
    }

    // --- observers ---

    /// Observe every applied transaction, in apply order
    pub fn subscribe_transactions(
        &mut self,
        callback: impl FnMut(&AppliedTransaction) + Send + 'static,
    ) -> SubscriptionId {
        self.transactions.subscribe(callback)
    }

    pub fn unsubscribe_transactions(&mut self, id: SubscriptionId) -> bool {
        self.transactions.unsubscribe(id)
    }

    pub fn subscribe_selection(
        &mut self,
        callback: impl FnMut(&Option<Selection>) + Send + 'static,
    ) -> SubscriptionId {
        self.selection_changes.subscribe(callback)
    }

    pub fn unsubscribe_selection(&mut self, id: SubscriptionId) -> bool {
        self.selection_changes.unsubscribe(id)
    }

    // --- toggles ---

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    pub fn rules_enabled(&self) -> bool {
        self.rules.is_enabled()
    }

    pub fn set_rules_enabled(&mut self, enabled: bool) {
        self.rules.set_enabled(enabled);
    }

    pub fn rules_mut(&mut self) -> &mut RuleEngine {
        &mut self.rules
    }

    pub fn seal_timer_enabled(&self) -> bool {
        self.seal_timer.is_enabled()
    }

    /// Turning the timer off seals any open history item so that every
    /// following apply gets its own undo step
    pub fn set_seal_timer_enabled(&mut self, enabled: bool) {
        self.seal_timer.set_enabled(enabled);
        if !enabled {
            self.history().seal_undo();
        }
    }

    // --- history ---

    /// Undo and redo stacks. Hold the guard only briefly; applies lock it too.
    pub fn history(&self) -> MutexGuard<'_, UndoManager> {
        lock(&self.history)
    }
}

impl std::fmt::Debug for EditorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorState")
            .field("document", &self.document)
            .field("selection", &self.selection)
            .field("editable", &self.editable)
            .field("rules", &self.rules)
            .field("seal_timer", &self.seal_timer)
            .finish_non_exhaustive()
    }
}

//! # Folio Editor
//!
//! Transactional core of a structured rich-text editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ document: Path / Node / Delta tree          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: transactions over the tree          │
//! │  - Operations (insert/delete/update/text)   │
//! │  - Apply pipeline with rollback             │
//! │  - Transaction and selection broadcast      │
//! │  - Structural rules, depth-bounded          │
//! │  - Coalescing undo/redo history             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ host: rendering, input, replication         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Single entry point**: the document only changes through `apply`
//! 2. **Invertible edits**: every operation carries what it needs to undo itself
//! 3. **All or nothing**: a failing transaction leaves the document as it was
//! 4. **Bounded rules**: corrective passes cannot recurse forever
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_editor::{ApplyOptions, EditorState, Position, Selection};
//! use folio_document::{Document, Node, Path};
//!
//! let mut state = EditorState::new(Document::blank());
//!
//! let mut tx = state.transaction();
//! tx.insert_node(Path::from([1]), Node::text("hello"));
//! tx.after_selection = Some(Selection::collapsed(Position::new([1], 5)));
//! state.apply(tx, ApplyOptions::default()).await?;
//!
//! state.undo().await?;
//! ```

mod broadcast;
mod commands;
mod config;
mod errors;
mod frame;
mod operation;
mod pipeline;
mod rules;
mod seal_timer;
mod selection;
mod state;
mod transaction;
mod undo_manager;

pub use broadcast::{AppliedTransaction, Broadcaster, SubscriptionId};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use errors::EditorError;
pub use frame::{FrameFuture, FrameScheduler, ImmediateFrames, YieldFrames};
pub use operation::Operation;
pub use pipeline::ApplyOptions;
pub use rules::{EnsureTrailingText, Rule, RuleEngine};
pub use seal_timer::SealTimer;
pub use selection::{Position, Selection, SelectionService, SelectionUpdateReason};
pub use state::EditorState;
pub use transaction::Transaction;
pub use undo_manager::{HistoryItem, HistoryStack, UndoManager};

// Re-export the document substrate for convenience
pub use folio_document as document;

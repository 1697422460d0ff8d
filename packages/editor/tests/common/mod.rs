//! Shared helpers for editor integration tests

#![allow(dead_code)]

use folio_editor::document::{Document, Node};
use folio_editor::{EditorConfig, EditorState, Position, Selection};

/// Route editor logs to the test output. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// Editor over a document holding one empty text node
pub fn blank_state() -> EditorState {
    init_tracing();
    EditorState::new(Document::blank())
}

/// Editor with a config tweaked by `configure`
pub fn state_with(document: Document, configure: impl FnOnce(&mut EditorConfig)) -> EditorState {
    init_tracing();
    let mut config = EditorConfig::default();
    configure(&mut config);
    EditorState::with_config(document, &config)
}

pub fn caret(path: &[usize], offset: usize) -> Option<Selection> {
    Some(Selection::collapsed(Position::new(path.to_vec(), offset)))
}

pub fn texts(document: &Document) -> Vec<String> {
    document.children().iter().map(Node::plain_text).collect()
}

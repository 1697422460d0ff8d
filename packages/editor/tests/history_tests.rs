//! Undo/redo history and the seal timer, driven through `EditorState`

mod common;

use common::{blank_state, caret, state_with, texts};
use folio_editor::document::{Document, Node, Path};
use folio_editor::{ApplyOptions, EditorState};
use std::time::Duration;
use tokio::time::sleep;

/// Type `text` at the end of the first paragraph, moving the caret along
async fn type_text(state: &mut EditorState, text: &str) {
    let offset = state.document().children()[0].plain_text().chars().count();
    let mut tx = state.transaction();
    tx.insert_text(state.document(), Path::from([0]), offset, text)
        .unwrap();
    tx.after_selection = caret(&[0], offset + text.chars().count());
    state.apply(tx, ApplyOptions::default()).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_quick_edits_coalesce_into_one_item() {
    let mut state = blank_state();
    state.set_selection(caret(&[0], 0));

    type_text(&mut state, "a").await;
    sleep(Duration::from_millis(400)).await;
    type_text(&mut state, "b").await;
    sleep(Duration::from_millis(400)).await;
    type_text(&mut state, "c").await;

    {
        let history = state.history();
        assert_eq!(history.undo_stack().len(), 1);
        assert!(!history.undo_stack().last().unwrap().is_sealed());
    }

    sleep(Duration::from_millis(1100)).await;

    {
        let history = state.history();
        let item = history.undo_stack().last().unwrap();
        assert!(item.is_sealed());
        assert_eq!(item.len(), 3);
        assert_eq!(item.before_selection().cloned(), caret(&[0], 0));
        assert_eq!(item.after_selection().cloned(), caret(&[0], 3));
    }

    type_text(&mut state, "d").await;
    assert_eq!(state.history().undo_stack().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_undo_reverts_whole_item_and_restores_selection() {
    let mut state = blank_state();
    state.set_selection(caret(&[0], 0));

    type_text(&mut state, "ab").await;
    type_text(&mut state, "cd").await;
    assert_eq!(texts(state.document()), vec!["abcd"]);

    assert!(state.undo().await.unwrap());
    assert_eq!(texts(state.document()), vec![""]);
    assert_eq!(state.selection().cloned(), caret(&[0], 0));
    assert!(!state.history().can_undo());
    assert!(state.history().can_redo());
}

#[tokio::test(start_paused = true)]
async fn test_redo_reapplies_and_can_be_undone_again() -> anyhow::Result<()> {
    let mut state = blank_state();
    state.set_selection(caret(&[0], 0));

    type_text(&mut state, "hey").await;
    state.undo().await?;

    assert!(state.redo().await?);
    assert_eq!(texts(state.document()), vec!["hey"]);
    assert_eq!(state.selection().cloned(), caret(&[0], 3));
    assert!(!state.history().can_redo());

    // The redone step is sealed, so new typing starts a fresh item
    assert!(state.history().undo_stack().last().unwrap().is_sealed());
    type_text(&mut state, "!").await;
    assert_eq!(state.history().undo_stack().len(), 2);

    state.undo().await?;
    state.undo().await?;
    assert_eq!(texts(state.document()), vec![""]);
    Ok(())
}

#[tokio::test]
async fn test_undo_and_redo_with_empty_history() {
    let mut state = blank_state();

    assert!(!state.undo().await.unwrap());
    assert!(!state.redo().await.unwrap());
    assert_eq!(state.document(), &Document::blank());
}

#[tokio::test]
async fn test_disabled_timer_gives_each_apply_its_own_item() {
    let mut state = state_with(Document::blank(), |config| config.seal_timer_enabled = false);

    type_text(&mut state, "a").await;
    type_text(&mut state, "b").await;

    let history = state.history();
    assert_eq!(history.undo_stack().len(), 2);
    assert!(history.undo_stack().iter().all(|item| item.is_sealed()));
}

#[tokio::test(start_paused = true)]
async fn test_disabling_timer_seals_open_item() {
    let mut state = blank_state();

    type_text(&mut state, "a").await;
    assert!(state.history().has_open_item());

    state.set_seal_timer_enabled(false);
    assert!(!state.history().has_open_item());

    type_text(&mut state, "b").await;
    assert_eq!(state.history().undo_stack().len(), 2);
}

#[tokio::test]
async fn test_history_keeps_only_newest_levels() {
    let mut state = state_with(Document::blank(), |config| {
        config.seal_timer_enabled = false;
        config.max_undo_levels = 3;
    });

    for letter in ["a", "b", "c", "d", "e"] {
        type_text(&mut state, letter).await;
    }
    assert_eq!(state.history().undo_stack().len(), 3);

    while state.undo().await.unwrap() {}
    assert_eq!(texts(state.document()), vec!["ab"]);
}

#[tokio::test]
async fn test_redo_records_are_never_coalesced() {
    let mut state = blank_state();

    for text in ["x", "y"] {
        let mut tx = state.transaction();
        tx.insert_text(state.document(), Path::from([0]), 0, text)
            .unwrap();
        state.apply(tx, ApplyOptions::for_undo()).await.unwrap();
    }

    let history = state.history();
    assert!(history.undo_stack().is_empty());
    assert_eq!(history.redo_stack().len(), 2);
    assert!(history.redo_stack().iter().all(|item| item.is_sealed()));
}

#[tokio::test]
async fn test_untracked_apply_leaves_history_alone() {
    let mut state = blank_state();

    let mut tx = state.transaction();
    tx.insert_text(state.document(), Path::from([0]), 0, "quiet")
        .unwrap();
    state.apply(tx, ApplyOptions::without_history()).await.unwrap();

    assert_eq!(texts(state.document()), vec!["quiet"]);
    assert!(!state.history().can_undo());
    assert!(!state.history().can_redo());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_state_cancels_pending_seal() {
    let mut state = blank_state();
    type_text(&mut state, "bye").await;
    assert_eq!(state.history().undo_stack().len(), 1);

    drop(state);
    sleep(Duration::from_secs(5)).await;
}

#[tokio::test]
async fn test_chained_text_edits_undo_cleanly() -> anyhow::Result<()> {
    let mut state = state_with(Document::with_children(vec![Node::text("Hello")]), |_| {});

    let mut tx = state.transaction();
    tx.delete_text(state.document(), Path::from([0]), 0, 2)?;
    tx.delete_text(state.document(), Path::from([0]), 0, 2)?;
    tx.insert_text(state.document(), Path::from([0]), 1, "!")?;
    state.apply(tx, ApplyOptions::default()).await?;
    assert_eq!(texts(state.document()), vec!["o!"]);

    state.undo().await?;
    assert_eq!(texts(state.document()), vec!["Hello"]);

    state.redo().await?;
    assert_eq!(texts(state.document()), vec!["o!"]);
    Ok(())
}

#[tokio::test]
async fn test_correction_after_empty_apply_leaves_sealed_item_alone() {
    let mut state = state_with(Document::blank(), |config| {
        config.seal_timer_enabled = false;
        config.rules_enabled = false;
    });

    let mut tx = state.transaction();
    tx.insert_node(Path::from([1]), Node::new("divider"));
    tx.after_selection = caret(&[0], 0);
    state.apply(tx, ApplyOptions::default()).await.unwrap();

    state.set_rules_enabled(true);
    let tx = state.transaction();
    state.apply(tx, ApplyOptions::default()).await.unwrap();
    assert_eq!(state.document().children().len(), 3);

    let history = state.history();
    assert_eq!(history.undo_stack().len(), 2);

    let divider = history.undo_stack().get(0).unwrap();
    assert_eq!(divider.len(), 1);
    assert_eq!(divider.after_selection().cloned(), caret(&[0], 0));

    let correction = history.undo_stack().get(1).unwrap();
    assert_eq!(correction.len(), 1);
    assert!(correction.is_sealed());
}

#[tokio::test(start_paused = true)]
async fn test_correction_after_empty_apply_seals_on_its_own() {
    let mut state = blank_state();
    state.set_rules_enabled(false);

    let mut tx = state.transaction();
    tx.insert_node(Path::from([1]), Node::new("divider"));
    state.apply(tx, ApplyOptions::default()).await.unwrap();
    sleep(Duration::from_millis(1100)).await;

    state.set_rules_enabled(true);
    let tx = state.transaction();
    state.apply(tx, ApplyOptions::default()).await.unwrap();

    assert_eq!(state.history().undo_stack().len(), 2);
    assert!(state.history().has_open_item());

    sleep(Duration::from_millis(1100)).await;
    assert!(!state.history().has_open_item());
}

#[tokio::test]
async fn test_correction_keeps_edit_after_selection() {
    let mut state = blank_state();
    state.set_selection(caret(&[0], 0));

    let mut tx = state.transaction();
    tx.insert_node(Path::from([1]), Node::new("image"));
    tx.after_selection = caret(&[1], 0);
    state
        .apply(tx, ApplyOptions::default().without_selection_update())
        .await
        .unwrap();

    assert_eq!(state.selection().cloned(), caret(&[0], 0));
    assert_eq!(state.document().children().len(), 3);

    let history = state.history();
    let item = history.undo_stack().last().unwrap();
    assert_eq!(item.len(), 2);
    assert_eq!(item.before_selection().cloned(), caret(&[0], 0));
    assert_eq!(item.after_selection().cloned(), caret(&[1], 0));
}

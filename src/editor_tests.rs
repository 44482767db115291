use std::time::{Duration, Instant};

use super::*;
use crate::caret::Placement;
use crate::keymap::{Key, KeyInput, Modifiers};
use crate::outline::SequentialIds;

fn editor_with(items: Vec<Item>) -> OutlineEditor {
    OutlineEditor::new(
        Document::from_items(items),
        EditorSettings::default(),
        Box::new(SequentialIds::new("n")),
    )
}

fn press(editor: &mut OutlineEditor, key: Key, modifiers: Modifiers, now: Instant) -> EditOutcome {
    editor.handle_input(&Input::Key(KeyInput::new(key, modifiers)), now)
}

fn typed(editor: &mut OutlineEditor, text: &str, now: Instant) {
    for ch in text.chars() {
        press(editor, Key::Char(ch), Modifiers::NONE, now);
    }
}

fn texts(editor: &OutlineEditor) -> Vec<(String, u8)> {
    order::visual_order(editor.document())
        .map(|item| (item.text.clone(), item.level))
        .collect()
}

fn focus_of(editor: &OutlineEditor) -> (String, usize) {
    let focus = editor.focus().expect("focused");
    (focus.item.to_string(), focus.caret)
}

fn settle(editor: &mut OutlineEditor) -> Option<RestoreStep> {
    let surfaces = SurfaceMap::from_document(editor.document());
    editor.settle(&surfaces)
}

#[test]
fn new_editor_focuses_the_first_item_at_the_start() {
    let editor = editor_with(vec![Item::new("a", "one", 0), Item::new("b", "two", 0)]);
    assert_eq!(focus_of(&editor), ("a".to_string(), 0));
    assert!(!editor.is_dirty());
    assert!(!editor.can_undo());
}

#[test]
fn empty_document_gets_one_item_to_type_into() {
    let editor = editor_with(Vec::new());
    assert_eq!(editor.document().item_count(), 1);
    assert_eq!(focus_of(&editor), ("n-1".to_string(), 0));
}

#[test]
fn enter_in_the_middle_of_foo() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "Foo", 0)]);
    editor.set_caret(2, None);

    assert_eq!(press(&mut editor, Key::Enter, Modifiers::NONE, now), EditOutcome::Edited);

    assert_eq!(
        texts(&editor),
        vec![("Fo".to_string(), 0), ("o".to_string(), 0)]
    );
    assert_eq!(focus_of(&editor), ("n-1".to_string(), 0));
    assert_eq!(
        editor.pending_restore().map(|pending| pending.item().as_str()),
        Some("n-1")
    );
    match settle(&mut editor) {
        Some(RestoreStep::Resolved(resolved)) => {
            assert_eq!(resolved.caret, Placement::Exact(0))
        }
        other => panic!("unexpected step {other:?}"),
    }
    assert!(editor.pending_restore().is_none());
}

#[test]
fn enter_replaces_the_selection_before_splitting() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "abcdef", 0)]);
    editor.set_caret(4, Some(2));
    press(&mut editor, Key::Enter, Modifiers::NONE, now);
    assert_eq!(
        texts(&editor),
        vec![("ab".to_string(), 0), ("ef".to_string(), 0)]
    );
}

#[test]
fn backspace_on_a_sole_nested_empty_item_outdents_until_top_level() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "", 2)]);

    assert_eq!(press(&mut editor, Key::Backspace, Modifiers::NONE, now), EditOutcome::Edited);
    assert_eq!(texts(&editor), vec![(String::new(), 1)]);
    press(&mut editor, Key::Backspace, Modifiers::NONE, now);
    assert_eq!(texts(&editor), vec![(String::new(), 0)]);

    assert_eq!(press(&mut editor, Key::Backspace, Modifiers::NONE, now), EditOutcome::Ignored);
    assert_eq!(texts(&editor), vec![(String::new(), 0)]);
    assert_eq!(focus_of(&editor), ("a".to_string(), 0));
}

#[test]
fn backspace_on_an_empty_top_level_item_focuses_the_previous_end() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "Hello", 0), Item::new("b", "", 0)]);
    editor.focus_on(&"b".into(), CaretTarget::Start, now);

    press(&mut editor, Key::Backspace, Modifiers::NONE, now);

    assert_eq!(texts(&editor), vec![("Hello".to_string(), 0)]);
    assert_eq!(focus_of(&editor), ("a".to_string(), 5));
}

#[test]
fn backspace_at_start_merges_and_places_the_caret_at_the_join() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "Hello", 0), Item::new("b", "World", 0)]);
    editor.focus_on(&"b".into(), CaretTarget::Start, now);

    press(&mut editor, Key::Backspace, Modifiers::NONE, now);

    assert_eq!(texts(&editor), vec![("HelloWorld".to_string(), 0)]);
    assert_eq!(focus_of(&editor), ("a".to_string(), 5));
    settle(&mut editor);
    assert_eq!(focus_of(&editor), ("a".to_string(), 5));
}

#[test]
fn delete_at_end_pulls_the_next_item_in() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "Hello", 0), Item::new("b", "World", 0)]);
    editor.set_caret(5, None);

    press(&mut editor, Key::Delete, Modifiers::NONE, now);

    assert_eq!(texts(&editor), vec![("HelloWorld".to_string(), 0)]);
    assert_eq!(focus_of(&editor), ("a".to_string(), 5));
}

#[test]
fn tab_keeps_the_caret_through_the_rebuild() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "one", 0), Item::new("b", "two", 0)]);
    editor.focus_on(&"b".into(), CaretTarget::Start, now);
    editor.set_caret(2, None);

    assert_eq!(press(&mut editor, Key::Tab, Modifiers::NONE, now), EditOutcome::Edited);

    assert_eq!(
        texts(&editor),
        vec![("one".to_string(), 0), ("two".to_string(), 1)]
    );
    assert!(matches!(
        editor.pending_restore().map(|pending| pending.target()),
        Some(CaretTarget::Saved(_))
    ));
    match settle(&mut editor) {
        Some(RestoreStep::Resolved(resolved)) => {
            assert_eq!(resolved.caret, Placement::Exact(2))
        }
        other => panic!("unexpected step {other:?}"),
    }
    assert_eq!(focus_of(&editor), ("b".to_string(), 2));
}

#[test]
fn indent_keeps_a_selection_through_the_rebuild() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "one", 0), Item::new("b", "select", 0)]);
    editor.focus_on(&"b".into(), CaretTarget::Start, now);
    editor.set_caret(4, Some(1));

    press(&mut editor, Key::Tab, Modifiers::NONE, now);
    settle(&mut editor);

    assert_eq!(editor.focus().and_then(Focus::selection), Some((1, 4)));
}

#[test]
fn tab_on_the_first_item_changes_nothing() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "one", 0)]);
    assert_eq!(press(&mut editor, Key::Tab, Modifiers::NONE, now), EditOutcome::Unchanged);
    assert!(!editor.is_dirty());
}

#[test]
fn empty_item_is_pruned_after_the_grace_period() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "x", 0), Item::new("b", "", 0)]);
    editor.focus_on(&"b".into(), CaretTarget::Start, now);

    assert_eq!(press(&mut editor, Key::Up, Modifiers::NONE, now), EditOutcome::Moved);
    assert_eq!(focus_of(&editor), ("a".to_string(), 1));
    assert!(editor.scheduler().is_scheduled(&TaskKey::Prune("b".into())));

    editor.poll(now + Duration::from_millis(100));
    assert_eq!(editor.document().item_count(), 2);

    editor.poll(now + Duration::from_millis(400));
    assert_eq!(texts(&editor), vec![("x".to_string(), 0)]);
    assert!(editor.is_dirty());
}

#[test]
fn returning_to_an_empty_item_cancels_its_prune() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "x", 0), Item::new("b", "", 0)]);
    editor.focus_on(&"b".into(), CaretTarget::Start, now);

    press(&mut editor, Key::Up, Modifiers::NONE, now);
    press(&mut editor, Key::Down, Modifiers::NONE, now + Duration::from_millis(50));
    assert_eq!(focus_of(&editor), ("b".to_string(), 0));

    editor.poll(now + Duration::from_secs(1));
    assert_eq!(editor.document().item_count(), 2);
}

#[test]
fn prune_rechecks_the_item_when_it_fires() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "x", 0), Item::new("b", "", 0)]);
    editor.focus_on(&"b".into(), CaretTarget::Start, now);
    typed(&mut editor, "q", now);
    press(&mut editor, Key::Backspace, Modifiers::NONE, now);
    press(&mut editor, Key::Up, Modifiers::NONE, now);
    assert!(editor.scheduler().is_scheduled(&TaskKey::Prune("b".into())));

    // undo brings the text back while the prune is still pending
    editor.apply(Action::Undo, now);
    editor.poll(now + Duration::from_secs(1));

    let b = editor.document().find(&"b".into()).expect("kept");
    assert_eq!(b.text, "q");
}

#[test]
fn sole_empty_item_is_never_pruned() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "", 0)]);
    press(&mut editor, Key::Escape, Modifiers::NONE, now);
    assert!(editor.focus().is_none());
    assert!(editor.scheduler().is_empty());
    editor.poll(now + Duration::from_secs(1));
    assert_eq!(editor.document().item_count(), 1);
}

#[test]
fn save_is_debounced_and_restarted_by_each_edit() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "", 0)]);

    typed(&mut editor, "h", now);
    assert!(editor.is_dirty());
    assert!(editor.poll(now + Duration::from_millis(500)).is_none());

    typed(&mut editor, "i", now + Duration::from_millis(600));
    assert!(editor.poll(now + Duration::from_millis(1000)).is_none());

    let request = editor
        .poll(now + Duration::from_millis(1500))
        .expect("save due");
    assert_eq!(request.version, editor.version());
    assert_eq!(request.document.find(&"a".into()).map(|item| item.text.as_str()), Some("hi"));
    assert!(!editor.is_dirty());
    assert!(editor.poll(now + Duration::from_secs(5)).is_none());
}

#[test]
fn flush_skips_the_debounce() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "", 0)]);
    assert!(editor.flush_save().is_none());
    typed(&mut editor, "x", now);
    assert!(editor.flush_save().is_some());
    assert!(editor.flush_save().is_none());
    assert!(editor.poll(now + Duration::from_secs(5)).is_none());
}

#[test]
fn undo_and_redo_walk_history_without_recording() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "", 0)]);
    typed(&mut editor, "ab", now);

    let undo = KeyInput::new(Key::Char('z'), Modifiers::PRIMARY);
    let redo = KeyInput::new(Key::Char('z'), Modifiers::PRIMARY_SHIFT);

    editor.handle_input(&undo.into(), now);
    assert_eq!(texts(&editor), vec![("a".to_string(), 0)]);
    assert!(editor.can_redo());

    editor.handle_input(&redo.into(), now);
    assert_eq!(texts(&editor), vec![("ab".to_string(), 0)]);
    assert!(!editor.can_redo());

    editor.handle_input(&undo.into(), now);
    editor.handle_input(&undo.into(), now);
    assert_eq!(texts(&editor), vec![(String::new(), 0)]);
    assert_eq!(editor.handle_input(&undo.into(), now), EditOutcome::Unchanged);
    assert!(editor.is_dirty());
}

#[test]
fn undo_of_a_split_refocuses_a_surviving_item() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "Foo", 0)]);
    editor.set_caret(1, None);
    press(&mut editor, Key::Enter, Modifiers::NONE, now);
    assert_eq!(focus_of(&editor).0, "n-1");

    editor.apply(Action::Undo, now);

    assert_eq!(texts(&editor), vec![("Foo".to_string(), 0)]);
    assert_eq!(focus_of(&editor), ("a".to_string(), 3));
}

#[test]
fn restore_retries_until_the_surface_exists() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "Foo", 0)]);
    press(&mut editor, Key::Enter, Modifiers::NONE, now);

    assert_eq!(editor.settle(&SurfaceMap::new()), Some(RestoreStep::Retry));
    assert!(editor.pending_restore().is_some());
    assert!(matches!(settle(&mut editor), Some(RestoreStep::Resolved(_))));
    assert_eq!(settle(&mut editor), None);
}

#[test]
fn restore_gives_up_after_the_configured_attempts() {
    let now = Instant::now();
    let settings = EditorSettings {
        restore_attempts: 2,
        ..EditorSettings::default()
    };
    let mut editor = OutlineEditor::new(
        Document::from_items(vec![Item::new("a", "one", 0), Item::new("b", "two", 0)]),
        settings,
        Box::new(SequentialIds::new("n")),
    );
    press(&mut editor, Key::Down, Modifiers::NONE, now);

    assert_eq!(editor.settle(&SurfaceMap::new()), Some(RestoreStep::Retry));
    assert_eq!(editor.settle(&SurfaceMap::new()), Some(RestoreStep::GaveUp));
    assert!(editor.pending_restore().is_none());
    assert_eq!(focus_of(&editor), ("b".to_string(), 0));
}

#[test]
fn duplicate_focuses_the_copy_at_its_end() {
    let now = Instant::now();
    let mut editor = editor_with(vec![
        Item::new("a", "parent", 0).with_children(vec![Item::new("b", "child", 1)]),
    ]);
    press(&mut editor, Key::Char('d'), Modifiers::PRIMARY, now);

    assert_eq!(
        texts(&editor),
        vec![
            ("parent".to_string(), 0),
            ("child".to_string(), 1),
            ("parent".to_string(), 0),
            ("child".to_string(), 1),
        ]
    );
    assert_eq!(focus_of(&editor), ("n-1".to_string(), 6));
}

#[test]
fn deleting_everything_leaves_one_fresh_item() {
    let now = Instant::now();
    let mut editor = editor_with(vec![
        Item::new("a", "parent", 0).with_children(vec![Item::new("b", "child", 1)]),
    ]);
    press(&mut editor, Key::Char('k'), Modifiers::PRIMARY_SHIFT, now);

    assert_eq!(texts(&editor), vec![(String::new(), 0)]);
    assert_eq!(focus_of(&editor), ("n-1".to_string(), 0));
}

#[test]
fn delete_subtree_moves_focus_past_the_removed_children() {
    let now = Instant::now();
    let mut editor = editor_with(vec![
        Item::new("a", "parent", 0).with_children(vec![Item::new("b", "child", 1)]),
        Item::new("c", "after", 0),
    ]);
    press(&mut editor, Key::Backspace, Modifiers::PRIMARY_SHIFT, now);

    assert_eq!(texts(&editor), vec![("after".to_string(), 0)]);
    assert_eq!(focus_of(&editor), ("c".to_string(), 0));
}

#[test]
fn move_down_swaps_siblings_and_keeps_focus() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "one", 0), Item::new("b", "two", 0)]);
    editor.set_caret(1, None);
    press(&mut editor, Key::Down, Modifiers::ALT_SHIFT, now);

    assert_eq!(
        texts(&editor),
        vec![("two".to_string(), 0), ("one".to_string(), 0)]
    );
    assert_eq!(focus_of(&editor), ("a".to_string(), 1));
}

#[test]
fn add_item_inserts_a_sibling_at_the_same_level() {
    let now = Instant::now();
    let mut editor = editor_with(vec![
        Item::new("a", "parent", 0).with_children(vec![Item::new("b", "child", 1)]),
    ]);
    editor.focus_on(&"b".into(), CaretTarget::Start, now);
    press(&mut editor, Key::Char('n'), Modifiers::PRIMARY, now);

    assert_eq!(
        texts(&editor),
        vec![
            ("parent".to_string(), 0),
            ("child".to_string(), 1),
            (String::new(), 1),
        ]
    );
    assert_eq!(focus_of(&editor), ("n-1".to_string(), 0));
}

#[test]
fn paste_is_reduced_to_plain_text() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "ab", 0)]);
    editor.set_caret(1, None);
    editor.handle_input(&Input::Paste("\x1b[1mX\x1b[0m\r\nY".to_string()), now);

    assert_eq!(texts(&editor), vec![("aX\nYb".to_string(), 0)]);
    assert_eq!(focus_of(&editor), ("a".to_string(), 4));
}

#[test]
fn typing_replaces_the_selection() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "Hello", 0)]);
    editor.set_caret(0, Some(3));
    typed(&mut editor, "J", now);
    assert_eq!(texts(&editor), vec![("Jlo".to_string(), 0)]);
    assert_eq!(focus_of(&editor), ("a".to_string(), 1));
}

#[test]
fn shift_arrows_extend_a_selection() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "Hello", 0)]);
    press(&mut editor, Key::Right, Modifiers::SHIFT, now);
    press(&mut editor, Key::Right, Modifiers::SHIFT, now);
    assert_eq!(editor.focus().and_then(Focus::selection), Some((0, 2)));

    press(&mut editor, Key::Left, Modifiers::NONE, now);
    assert_eq!(editor.focus().and_then(Focus::selection), None);
    assert_eq!(focus_of(&editor), ("a".to_string(), 0));
}

#[test]
fn escape_releases_focus_and_arrows_bring_it_back() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "one", 0), Item::new("b", "two", 0)]);
    press(&mut editor, Key::Down, Modifiers::NONE, now);
    press(&mut editor, Key::Escape, Modifiers::NONE, now);
    assert!(editor.focus().is_none());
    assert!(editor.cursor_context().is_none());

    assert_eq!(press(&mut editor, Key::Up, Modifiers::NONE, now), EditOutcome::Moved);
    assert_eq!(focus_of(&editor), ("b".to_string(), 3));
}

#[test]
fn replace_document_resets_history_and_timers() {
    let now = Instant::now();
    let mut editor = editor_with(vec![Item::new("a", "", 0)]);
    typed(&mut editor, "x", now);
    editor.replace_document(Document::from_items(vec![Item::new("z", "tomorrow", 0)]));

    assert!(!editor.can_undo());
    assert!(!editor.is_dirty());
    assert!(editor.scheduler().is_empty());
    assert_eq!(focus_of(&editor), ("z".to_string(), 0));
}

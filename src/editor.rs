//! The editing session: one document, its history, focus and timers.
//!
//! Input arrives as [`Input`], goes through [`keymap::dispatch`] and becomes
//! exactly one mutation or caret movement. Structural edits leave a
//! [`PendingRestore`] behind that is resolved by [`OutlineEditor::settle`]
//! once the display has rebuilt the item surfaces.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::ansi::sanitize_paste;
use crate::caret::{self, CaretTarget, PendingRestore, RestoreStep};
use crate::history::{DEFAULT_CAPACITY, DocumentHistory};
use crate::keymap::{self, Action, CaretMove, CursorContext, Input, NativeEdit};
use crate::outline::{self, Document, IdSource, Item, ItemId, mutate, order};
use crate::schedule::{Scheduler, TaskKey};
use crate::surface::{ItemSurface, SurfaceMap};

pub mod text;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorSettings {
    pub history_capacity: usize,
    pub prune_grace: Duration,
    pub save_debounce: Duration,
    pub restore_attempts: u32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            prune_grace: Duration::from_millis(300),
            save_debounce: Duration::from_millis(800),
            restore_attempts: caret::DEFAULT_RESTORE_ATTEMPTS,
        }
    }
}

/// The focused item and the caret inside it, in char offsets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Focus {
    pub item: ItemId,
    pub caret: usize,
    pub anchor: Option<usize>,
}

impl Focus {
    fn at(item: ItemId, caret: usize) -> Self {
        Self {
            item,
            caret,
            anchor: None,
        }
    }

    /// Ordered selection range, `None` when the caret is collapsed.
    pub fn selection(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        match anchor.cmp(&self.caret) {
            std::cmp::Ordering::Less => Some((anchor, self.caret)),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some((self.caret, anchor)),
        }
    }
}

/// A document version that should reach the persistence layer.
#[derive(Clone, Debug)]
pub struct SaveRequest {
    pub version: u64,
    pub document: Document,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// The input is not an editor command; the front-end may use it.
    Ignored,
    /// Recognised, but there was nothing to do.
    Unchanged,
    /// Focus or caret moved.
    Moved,
    /// The document changed.
    Edited,
}

pub struct OutlineEditor {
    history: DocumentHistory,
    ids: Box<dyn IdSource>,
    settings: EditorSettings,
    focus: Option<Focus>,
    last_focused: Option<ItemId>,
    pending_restore: Option<PendingRestore>,
    scheduler: Scheduler,
    version: u64,
    requested_version: u64,
}

impl fmt::Debug for OutlineEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutlineEditor")
            .field("items", &self.document().item_count())
            .field("focus", &self.focus)
            .field("version", &self.version)
            .field("requested_version", &self.requested_version)
            .finish_non_exhaustive()
    }
}

impl OutlineEditor {
    pub fn new(document: Document, settings: EditorSettings, mut ids: Box<dyn IdSource>) -> Self {
        let document = outline::normalize(&document, ids.as_mut());
        let history = DocumentHistory::with_capacity(document, settings.history_capacity);
        let mut editor = Self {
            history,
            ids,
            settings,
            focus: None,
            last_focused: None,
            pending_restore: None,
            scheduler: Scheduler::new(),
            version: 0,
            requested_version: 0,
        };
        editor.focus_first();
        editor
    }

    pub fn document(&self) -> &Document {
        self.history.present()
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn focus(&self) -> Option<&Focus> {
        self.focus.as_ref()
    }

    pub fn focused_item(&self) -> Option<&Item> {
        let focus = self.focus.as_ref()?;
        self.document().find(&focus.item)
    }

    pub fn pending_restore(&self) -> Option<&PendingRestore> {
        self.pending_restore.as_ref()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Earliest deadline the front-end should wake up for.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// True while the latest version has not been handed out for saving.
    pub fn is_dirty(&self) -> bool {
        self.version > self.requested_version
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn cursor_context(&self) -> Option<CursorContext> {
        let focus = self.focus.as_ref()?;
        let item = self.document().find(&focus.item)?;
        let len = item.char_len();
        let caret = focus.caret.min(len);
        let (line, _) = text::line_and_column(&item.text, caret);
        let line_count = text::line_spans(&item.text).len();
        Some(CursorContext {
            at_start: caret == 0,
            at_end: caret == len,
            has_selection: focus.selection().is_some(),
            text_empty: item.text.is_empty(),
            level: item.level,
            has_children: item.has_children(),
            sole_item: self.document().is_sole_item(&item.id),
            on_first_line: line == 0,
            on_last_line: line + 1 == line_count,
        })
    }

    pub fn handle_input(&mut self, input: &Input, now: Instant) -> EditOutcome {
        let action = keymap::dispatch(input, self.cursor_context().as_ref());
        self.apply(action, now)
    }

    pub fn apply(&mut self, action: Action, now: Instant) -> EditOutcome {
        if action == Action::Ignore {
            return EditOutcome::Ignored;
        }
        let (name, structural) = (action.name(), action.is_structural());
        let outcome = match action {
            Action::Split => self.split(now),
            Action::Indent => self.restructure(now, mutate::indent),
            Action::Outdent => self.restructure(now, mutate::outdent),
            Action::MoveUp => self.restructure(now, mutate::move_up),
            Action::MoveDown => self.restructure(now, mutate::move_down),
            Action::RemoveEmpty => self.remove_empty(now),
            Action::MergeWithPrevious => self.merge_with_previous(now),
            Action::MergeWithNext => self.merge_with_next(now),
            Action::FocusPrevious => self.focus_neighbour(false, now),
            Action::FocusNext => self.focus_neighbour(true, now),
            Action::Duplicate => self.duplicate(now),
            Action::DeleteSubtree => self.delete_subtree(now),
            Action::AddItem => self.add_item(now),
            Action::Undo => self.undo(now),
            Action::Redo => self.redo(now),
            Action::ReleaseFocus => self.release_focus(now),
            Action::Refocus => self.refocus(now),
            Action::Paste(payload) => self.paste(&payload, now),
            Action::Native(edit) => self.native(edit, now),
            Action::Ignore => EditOutcome::Ignored,
        };
        debug!(
            "event=action module=editor action={} structural={} outcome={:?} version={}",
            name, structural, outcome, self.version
        );
        outcome
    }

    /// Moves focus to `id` and asks for `target` once its surface exists.
    pub fn focus_on(&mut self, id: &ItemId, target: CaretTarget, now: Instant) -> bool {
        let Some(item) = self.document().find(id) else {
            return false;
        };
        let len = item.char_len();
        let previous = self.focus.take();
        let (caret, anchor) = match &target {
            CaretTarget::Start => (0, None),
            CaretTarget::End => (len, None),
            CaretTarget::Offset(offset) => ((*offset).min(len), None),
            CaretTarget::Saved(_) => previous
                .as_ref()
                .filter(|focus| &focus.item == id)
                .map(|focus| (focus.caret.min(len), focus.anchor.map(|a| a.min(len))))
                .unwrap_or((0, None)),
        };
        if let Some(previous) = previous
            && &previous.item != id
        {
            self.blur(&previous.item, now);
        }
        self.scheduler.cancel(&TaskKey::Prune(id.clone()));
        self.focus = Some(Focus {
            item: id.clone(),
            caret,
            anchor,
        });
        self.last_focused = Some(id.clone());
        self.pending_restore = Some(PendingRestore::new(
            id.clone(),
            target,
            self.settings.restore_attempts,
        ));
        true
    }

    /// Sets the caret of the focused item directly, e.g. after a mouse click.
    pub fn set_caret(&mut self, caret: usize, anchor: Option<usize>) -> bool {
        let Some(len) = self.focused_item().map(Item::char_len) else {
            return false;
        };
        let Some(focus) = self.focus.as_mut() else {
            return false;
        };
        focus.caret = caret.min(len);
        focus.anchor = anchor.map(|a| a.min(len)).filter(|a| *a != focus.caret);
        true
    }

    /// Resolves a pending caret restore against freshly built surfaces.
    ///
    /// Called once per render; an unresolved restore stays pending until it
    /// runs out of attempts.
    pub fn settle(&mut self, surfaces: &SurfaceMap) -> Option<RestoreStep> {
        let mut pending = self.pending_restore.take()?;
        let focused_len = self.focused_item().map(Item::char_len);
        let Some(focus) = self.focus.as_mut() else {
            return Some(RestoreStep::Abandoned);
        };
        if &focus.item != pending.item() {
            return Some(RestoreStep::Abandoned);
        }
        let len = focused_len.unwrap_or(0);
        let step = pending.attempt(surfaces);
        match &step {
            RestoreStep::Resolved(resolved) => {
                if let Some(offset) = resolved.caret.offset() {
                    focus.caret = offset.min(len);
                }
                focus.anchor = resolved
                    .anchor
                    .and_then(|placement| placement.offset())
                    .map(|a| a.min(len))
                    .filter(|a| *a != focus.caret);
            }
            RestoreStep::Retry => {
                self.pending_restore = Some(pending);
            }
            RestoreStep::GaveUp => {
                focus.caret = focus.caret.min(len);
                debug!(
                    "event=caret_restore module=editor status=gave_up attempts={}",
                    self.settings.restore_attempts
                );
            }
            RestoreStep::Abandoned => {}
        }
        Some(step)
    }

    /// Runs due timers. Returns a save request when the debounce expired.
    pub fn poll(&mut self, now: Instant) -> Option<SaveRequest> {
        let mut save = None;
        for key in self.scheduler.take_due(now) {
            match key {
                TaskKey::Prune(id) => self.prune(&id, now),
                TaskKey::Save => save = Some(self.save_request()),
            }
        }
        save
    }

    /// Hands out the latest version right away, skipping the debounce.
    pub fn flush_save(&mut self) -> Option<SaveRequest> {
        if !self.is_dirty() {
            return None;
        }
        self.scheduler.cancel(&TaskKey::Save);
        Some(self.save_request())
    }

    /// Points the editor at another document, e.g. after switching days.
    ///
    /// History and every pending timer of the old document are dropped;
    /// flush the old document before calling this.
    pub fn replace_document(&mut self, document: Document) {
        let document = outline::normalize(&document, self.ids.as_mut());
        self.history.reset(document);
        self.scheduler.clear();
        self.pending_restore = None;
        self.focus = None;
        self.last_focused = None;
        self.version += 1;
        self.requested_version = self.version;
        self.focus_first();
        info!(
            "event=document_replaced module=editor status=ok items={}",
            self.document().item_count()
        );
    }

    fn focus_first(&mut self) {
        if let Some(first) = order::first(self.document()).map(|item| item.id.clone()) {
            self.focus = Some(Focus::at(first.clone(), 0));
            self.last_focused = Some(first);
        }
    }

    fn save_request(&mut self) -> SaveRequest {
        self.requested_version = self.version;
        SaveRequest {
            version: self.version,
            document: self.document().clone(),
        }
    }

    fn commit(&mut self, document: Document, now: Instant) -> bool {
        if !self.history.record(document) {
            return false;
        }
        self.document_changed(now);
        true
    }

    fn document_changed(&mut self, now: Instant) {
        self.version += 1;
        self.scheduler
            .schedule(TaskKey::Save, now, self.settings.save_debounce);
    }

    fn focused_parts(&self) -> Option<(Focus, Item)> {
        let focus = self.focus.clone()?;
        let item = self.document().find(&focus.item)?.clone();
        Some((focus, item))
    }

    fn is_prunable(&self, id: &ItemId) -> bool {
        let document = self.document();
        match document.find(id) {
            Some(item) => item.is_blank() && !item.has_children() && document.item_count() > 1,
            None => false,
        }
    }

    fn blur(&mut self, id: &ItemId, now: Instant) {
        if self.is_prunable(id) {
            self.scheduler
                .schedule(TaskKey::Prune(id.clone()), now, self.settings.prune_grace);
        }
    }

    fn prune(&mut self, id: &ItemId, now: Instant) {
        let focused = self.focus.as_ref().is_some_and(|focus| &focus.item == id);
        if focused || !self.is_prunable(id) {
            return;
        }
        if let Some(document) = mutate::delete_single(self.document(), id)
            && self.commit(document, now)
        {
            if self.last_focused.as_ref() == Some(id) {
                self.last_focused = None;
            }
            debug!("event=prune module=editor status=ok version={}", self.version);
        }
    }

    fn split(&mut self, now: Instant) -> EditOutcome {
        let Some((focus, item)) = self.focused_parts() else {
            return EditOutcome::Unchanged;
        };
        let mut content = item.text.clone();
        let mut caret = focus.caret.min(item.char_len());
        if let Some((start, end)) = focus.selection() {
            text::remove_range(&mut content, start, end);
            caret = start;
        }
        let (before, after) = text::split_text(&content, caret);
        let new_id = self.ids.mint();
        let Some(document) = mutate::split_at(self.document(), &item.id, before, after, new_id.clone())
        else {
            return EditOutcome::Unchanged;
        };
        self.commit(document, now);
        self.focus_on(&new_id, CaretTarget::Start, now);
        EditOutcome::Edited
    }

    /// Runs a shape-changing edit that keeps focus on the same item, with the
    /// caret captured before and restored after the rebuild.
    fn restructure(
        &mut self,
        now: Instant,
        edit: fn(&Document, &ItemId) -> Option<Document>,
    ) -> EditOutcome {
        let Some((focus, item)) = self.focused_parts() else {
            return EditOutcome::Unchanged;
        };
        let snapshot = caret::capture(&ItemSurface::build(&item), focus.caret, focus.anchor);
        let Some(document) = edit(self.document(), &item.id) else {
            return EditOutcome::Unchanged;
        };
        if !self.commit(document, now) {
            return EditOutcome::Unchanged;
        }
        self.focus_on(&item.id, CaretTarget::Saved(snapshot), now);
        EditOutcome::Edited
    }

    fn remove_empty(&mut self, now: Instant) -> EditOutcome {
        let Some((_, item)) = self.focused_parts() else {
            return EditOutcome::Unchanged;
        };
        let document = self.document();
        let target = order::previous(document, &item.id)
            .map(|previous| (previous.id.clone(), CaretTarget::End))
            .or_else(|| {
                order::next_after_subtree(document, &item.id)
                    .map(|next| (next.id.clone(), CaretTarget::Start))
            });
        let Some((target, caret)) = target else {
            return EditOutcome::Unchanged;
        };
        let Some(document) = mutate::delete_subtree(document, &item.id) else {
            return EditOutcome::Unchanged;
        };
        self.commit(document, now);
        self.focus_on(&target, caret, now);
        EditOutcome::Edited
    }

    fn merge_with_previous(&mut self, now: Instant) -> EditOutcome {
        let Some((_, item)) = self.focused_parts() else {
            return EditOutcome::Unchanged;
        };
        let Some(previous) = order::previous(self.document(), &item.id) else {
            return EditOutcome::Unchanged;
        };
        let (previous_id, boundary) = (previous.id.clone(), previous.char_len());
        let Some(document) = mutate::merge_with_previous(self.document(), &item.id) else {
            return EditOutcome::Unchanged;
        };
        self.commit(document, now);
        self.focus_on(&previous_id, CaretTarget::Offset(boundary), now);
        EditOutcome::Edited
    }

    fn merge_with_next(&mut self, now: Instant) -> EditOutcome {
        let Some((_, item)) = self.focused_parts() else {
            return EditOutcome::Unchanged;
        };
        let Some(document) = mutate::merge_with_next(self.document(), &item.id) else {
            return EditOutcome::Unchanged;
        };
        self.commit(document, now);
        self.focus_on(&item.id, CaretTarget::Offset(item.char_len()), now);
        EditOutcome::Edited
    }

    fn focus_neighbour(&mut self, forward: bool, now: Instant) -> EditOutcome {
        let Some(focus) = self.focus.clone() else {
            return EditOutcome::Unchanged;
        };
        let document = self.document();
        let target = if forward {
            order::next(document, &focus.item).map(|item| (item.id.clone(), CaretTarget::Start))
        } else {
            order::previous(document, &focus.item).map(|item| (item.id.clone(), CaretTarget::End))
        };
        match target {
            Some((id, caret)) => {
                self.focus_on(&id, caret, now);
                EditOutcome::Moved
            }
            None => EditOutcome::Unchanged,
        }
    }

    fn duplicate(&mut self, now: Instant) -> EditOutcome {
        let Some((_, item)) = self.focused_parts() else {
            return EditOutcome::Unchanged;
        };
        let Some((document, copy)) =
            mutate::duplicate(self.history.present(), &item.id, self.ids.as_mut())
        else {
            return EditOutcome::Unchanged;
        };
        self.commit(document, now);
        self.focus_on(&copy, CaretTarget::End, now);
        EditOutcome::Edited
    }

    fn delete_subtree(&mut self, now: Instant) -> EditOutcome {
        let Some((_, item)) = self.focused_parts() else {
            return EditOutcome::Unchanged;
        };
        let document = self.document();
        let target = order::next_after_subtree(document, &item.id)
            .map(|next| (next.id.clone(), CaretTarget::Start))
            .or_else(|| {
                order::previous(document, &item.id)
                    .map(|previous| (previous.id.clone(), CaretTarget::End))
            });
        let Some(mut document) = mutate::delete_subtree(document, &item.id) else {
            return EditOutcome::Unchanged;
        };
        let target = match target {
            Some(target) => target,
            None => {
                // the document must keep one item to type into
                let fresh = Item::new(self.ids.mint(), "", 0);
                let id = fresh.id.clone();
                document = mutate::append_root(&document, fresh);
                (id, CaretTarget::Start)
            }
        };
        self.commit(document, now);
        self.focus = None;
        self.focus_on(&target.0, target.1, now);
        EditOutcome::Edited
    }

    fn add_item(&mut self, now: Instant) -> EditOutcome {
        let id = self.ids.mint();
        let document = match self.focused_parts() {
            Some((_, item)) => {
                mutate::insert_after(self.document(), &item.id, Item::new(id.clone(), "", item.level))
            }
            None => Some(mutate::append_root(self.document(), Item::new(id.clone(), "", 0))),
        };
        let Some(document) = document else {
            return EditOutcome::Unchanged;
        };
        self.commit(document, now);
        self.focus_on(&id, CaretTarget::Start, now);
        EditOutcome::Edited
    }

    fn undo(&mut self, now: Instant) -> EditOutcome {
        if !self.history.undo() {
            return EditOutcome::Unchanged;
        }
        self.after_history_move(now);
        EditOutcome::Edited
    }

    fn redo(&mut self, now: Instant) -> EditOutcome {
        if !self.history.redo() {
            return EditOutcome::Unchanged;
        }
        self.after_history_move(now);
        EditOutcome::Edited
    }

    fn after_history_move(&mut self, now: Instant) {
        self.document_changed(now);
        let Some(focus) = self.focus.clone() else {
            return;
        };
        if self.document().contains(&focus.item) {
            self.focus_on(&focus.item, CaretTarget::Offset(focus.caret), now);
        } else {
            self.focus = None;
            self.focus_first_at_end(now);
        }
    }

    fn focus_first_at_end(&mut self, now: Instant) {
        if let Some(first) = order::first(self.document()).map(|item| item.id.clone()) {
            self.focus_on(&first, CaretTarget::End, now);
        }
    }

    fn release_focus(&mut self, now: Instant) -> EditOutcome {
        let Some(focus) = self.focus.take() else {
            return EditOutcome::Unchanged;
        };
        self.pending_restore = None;
        self.blur(&focus.item, now);
        EditOutcome::Moved
    }

    fn refocus(&mut self, now: Instant) -> EditOutcome {
        let remembered = self
            .last_focused
            .clone()
            .filter(|id| self.document().contains(id));
        let target = match remembered {
            Some(id) => (id, CaretTarget::End),
            None => match order::first(self.document()) {
                Some(first) => (first.id.clone(), CaretTarget::Start),
                None => return EditOutcome::Unchanged,
            },
        };
        self.focus_on(&target.0, target.1, now);
        EditOutcome::Moved
    }

    fn paste(&mut self, payload: &str, now: Instant) -> EditOutcome {
        let plain = sanitize_paste(payload);
        if plain.is_empty() {
            return EditOutcome::Unchanged;
        }
        self.replace_selection(&plain, now)
    }

    fn native(&mut self, edit: NativeEdit, now: Instant) -> EditOutcome {
        match edit {
            NativeEdit::Insert(ch) => self.replace_selection(ch.encode_utf8(&mut [0; 4]), now),
            NativeEdit::SoftBreak => self.replace_selection("\n", now),
            NativeEdit::DeleteBackward => self.delete_with(now, |_, caret| caret.saturating_sub(1)..caret),
            NativeEdit::DeleteWordBackward => {
                self.delete_with(now, |content, caret| text::previous_word_boundary(content, caret)..caret)
            }
            NativeEdit::DeleteForward => self.delete_with(now, |_, caret| caret..caret + 1),
            NativeEdit::Move(caret_move) => self.move_caret(caret_move, false),
            NativeEdit::Select(caret_move) => self.move_caret(caret_move, true),
        }
    }

    fn replace_selection(&mut self, insert: &str, now: Instant) -> EditOutcome {
        let Some((focus, item)) = self.focused_parts() else {
            return EditOutcome::Unchanged;
        };
        let mut content = item.text.clone();
        let mut caret = focus.caret.min(item.char_len());
        if let Some((start, end)) = focus.selection() {
            text::remove_range(&mut content, start, end);
            caret = start;
        }
        let caret = text::insert_str_at(&mut content, caret, insert);
        self.set_text(&item.id, content, caret, now)
    }

    fn delete_with<F>(&mut self, now: Instant, range: F) -> EditOutcome
    where
        F: FnOnce(&str, usize) -> std::ops::Range<usize>,
    {
        let Some((focus, item)) = self.focused_parts() else {
            return EditOutcome::Unchanged;
        };
        let mut content = item.text.clone();
        let (start, end) = match focus.selection() {
            Some(selection) => selection,
            None => {
                let range = range(&content, focus.caret.min(item.char_len()));
                (range.start, range.end)
            }
        };
        if !text::remove_range(&mut content, start, end) {
            return EditOutcome::Unchanged;
        }
        self.set_text(&item.id, content, start, now)
    }

    fn set_text(&mut self, id: &ItemId, content: String, caret: usize, now: Instant) -> EditOutcome {
        let changed = match mutate::update_text(self.document(), id, content) {
            Some(document) => self.commit(document, now),
            None => false,
        };
        // typing does not reshape the surface, the caret is set directly
        self.pending_restore = None;
        if let Some(focus) = self.focus.as_mut() {
            focus.caret = caret;
            focus.anchor = None;
        }
        if changed {
            EditOutcome::Edited
        } else {
            EditOutcome::Moved
        }
    }

    fn move_caret(&mut self, caret_move: CaretMove, extend: bool) -> EditOutcome {
        let Some((focus, item)) = self.focused_parts() else {
            return EditOutcome::Unchanged;
        };
        let content = item.text.as_str();
        let len = item.char_len();
        let caret = focus.caret.min(len);

        let collapse_to = match (focus.selection(), extend, caret_move) {
            (Some((start, _)), false, CaretMove::Left) => Some(start),
            (Some((_, end)), false, CaretMove::Right) => Some(end),
            _ => None,
        };
        let target = collapse_to.unwrap_or_else(|| match caret_move {
            CaretMove::Left => caret.saturating_sub(1),
            CaretMove::Right => (caret + 1).min(len),
            CaretMove::Up => text::vertical_offset(content, caret, false).unwrap_or(0),
            CaretMove::Down => text::vertical_offset(content, caret, true).unwrap_or(len),
            CaretMove::WordLeft => text::previous_word_boundary(content, caret),
            CaretMove::WordRight => text::next_word_boundary(content, caret),
            CaretMove::LineStart => text::line_start(content, caret),
            CaretMove::LineEnd => text::line_end(content, caret),
        });
        let anchor = if extend {
            Some(focus.anchor.unwrap_or(caret))
        } else {
            None
        };
        self.pending_restore = None;
        if target == focus.caret && anchor == focus.anchor {
            return EditOutcome::Unchanged;
        }
        self.set_caret(target, anchor);
        EditOutcome::Moved
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod editor_tests;

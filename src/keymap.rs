//! Keyboard command dispatch.
//!
//! `dispatch` turns one input plus the caret context of the focused item
//! into exactly one [`Action`]. It never touches the document; the editor
//! session executes the action.

/// Modifier set as the core sees it. `primary` is Ctrl on most terminals and
/// Cmd where the terminal reports it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub primary: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        primary: false,
        alt: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        primary: false,
        alt: false,
    };
    pub const PRIMARY: Modifiers = Modifiers {
        shift: false,
        primary: true,
        alt: false,
    };
    pub const PRIMARY_SHIFT: Modifiers = Modifiers {
        shift: true,
        primary: true,
        alt: false,
    };
    pub const ALT_SHIFT: Modifiers = Modifiers {
        shift: true,
        primary: false,
        alt: true,
    };

    fn plain(self) -> bool {
        !self.primary && !self.alt
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Escape,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Key(KeyInput),
    Paste(String),
}

impl From<KeyInput> for Input {
    fn from(key: KeyInput) -> Self {
        Input::Key(key)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorContext {
    pub at_start: bool,
    pub at_end: bool,
    pub has_selection: bool,
    pub text_empty: bool,
    pub level: u8,
    pub has_children: bool,
    pub sole_item: bool,
    pub on_first_line: bool,
    pub on_last_line: bool,
}

impl CursorContext {
    fn collapsed_at_start(&self) -> bool {
        !self.has_selection && self.at_start
    }

    fn collapsed_at_end(&self) -> bool {
        !self.has_selection && self.at_end
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaretMove {
    Left,
    Right,
    Up,
    Down,
    WordLeft,
    WordRight,
    LineStart,
    LineEnd,
}

/// Edits the text surface performs on its own, without structural changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NativeEdit {
    Insert(char),
    SoftBreak,
    DeleteBackward,
    DeleteWordBackward,
    DeleteForward,
    Move(CaretMove),
    Select(CaretMove),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Split,
    Indent,
    Outdent,
    /// Backspace on an empty top-level item: delete it, focus the previous one.
    RemoveEmpty,
    MergeWithPrevious,
    MergeWithNext,
    FocusPrevious,
    FocusNext,
    MoveUp,
    MoveDown,
    Duplicate,
    DeleteSubtree,
    AddItem,
    Undo,
    Redo,
    ReleaseFocus,
    Refocus,
    Paste(String),
    Native(NativeEdit),
    Ignore,
}

impl Action {
    /// Stable name for log lines; never includes pasted text.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Split => "split",
            Action::Indent => "indent",
            Action::Outdent => "outdent",
            Action::RemoveEmpty => "remove_empty",
            Action::MergeWithPrevious => "merge_previous",
            Action::MergeWithNext => "merge_next",
            Action::FocusPrevious => "focus_previous",
            Action::FocusNext => "focus_next",
            Action::MoveUp => "move_up",
            Action::MoveDown => "move_down",
            Action::Duplicate => "duplicate",
            Action::DeleteSubtree => "delete_subtree",
            Action::AddItem => "add_item",
            Action::Undo => "undo",
            Action::Redo => "redo",
            Action::ReleaseFocus => "release_focus",
            Action::Refocus => "refocus",
            Action::Paste(_) => "paste",
            Action::Native(_) => "native",
            Action::Ignore => "ignore",
        }
    }

    /// Whether the action can change the document's structure.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Action::Split
                | Action::Indent
                | Action::Outdent
                | Action::RemoveEmpty
                | Action::MergeWithPrevious
                | Action::MergeWithNext
                | Action::MoveUp
                | Action::MoveDown
                | Action::Duplicate
                | Action::DeleteSubtree
                | Action::AddItem
        )
    }
}

/// Maps an input to an action. `context` is `None` while no item has focus.
pub fn dispatch(input: &Input, context: Option<&CursorContext>) -> Action {
    let key = match input {
        Input::Paste(text) => {
            return match context {
                Some(_) => Action::Paste(text.clone()),
                None => Action::Ignore,
            };
        }
        Input::Key(key) => *key,
    };

    if let Some(action) = dispatch_global(key) {
        return action;
    }

    match context {
        Some(context) => dispatch_focused(key, context),
        None => dispatch_unfocused(key),
    }
}

fn dispatch_global(input: KeyInput) -> Option<Action> {
    let KeyInput { key, modifiers } = input;
    if !modifiers.primary {
        return None;
    }
    let Key::Char(ch) = key else {
        return None;
    };
    match (ch.to_ascii_lowercase(), modifiers.shift) {
        ('z', false) => Some(Action::Undo),
        ('z', true) | ('y', _) => Some(Action::Redo),
        ('n', _) => Some(Action::AddItem),
        _ => None,
    }
}

fn dispatch_unfocused(input: KeyInput) -> Action {
    match input.key {
        Key::Up | Key::Down | Key::Left | Key::Right | Key::Enter => Action::Refocus,
        _ => Action::Ignore,
    }
}

fn dispatch_focused(input: KeyInput, context: &CursorContext) -> Action {
    let KeyInput { key, modifiers } = input;
    match key {
        Key::Enter if modifiers.shift => Action::Native(NativeEdit::SoftBreak),
        Key::Enter if modifiers.plain() => Action::Split,
        Key::Tab if modifiers.plain() && modifiers.shift => outdent_if_allowed(context),
        Key::Tab if modifiers.plain() => indent_if_allowed(context),
        Key::BackTab => outdent_if_allowed(context),
        Key::Char(']') if modifiers.primary => indent_if_allowed(context),
        Key::Char('[') if modifiers.primary => outdent_if_allowed(context),
        Key::Escape => Action::ReleaseFocus,

        Key::Backspace if modifiers.primary && modifiers.shift => Action::DeleteSubtree,
        Key::Char(ch) if modifiers.primary && modifiers.shift && ch.eq_ignore_ascii_case(&'k') => {
            Action::DeleteSubtree
        }
        Key::Char(ch) if modifiers.primary && !modifiers.shift && ch.eq_ignore_ascii_case(&'d') => {
            Action::Duplicate
        }
        Key::Backspace => backspace(context, modifiers),
        Key::Delete => {
            if context.collapsed_at_end() {
                Action::MergeWithNext
            } else {
                Action::Native(NativeEdit::DeleteForward)
            }
        }

        Key::Up | Key::Down if modifiers.shift && (modifiers.primary || modifiers.alt) => {
            if key == Key::Up {
                Action::MoveUp
            } else {
                Action::MoveDown
            }
        }
        Key::Up | Key::Down | Key::Left | Key::Right | Key::Home | Key::End => {
            arrow(key, modifiers, context)
        }

        Key::Char(ch) if modifiers.plain() => Action::Native(NativeEdit::Insert(ch)),
        _ => Action::Ignore,
    }
}

fn indent_if_allowed(context: &CursorContext) -> Action {
    if context.level < crate::outline::MAX_LEVEL {
        Action::Indent
    } else {
        Action::Ignore
    }
}

fn outdent_if_allowed(context: &CursorContext) -> Action {
    if context.level > 0 {
        Action::Outdent
    } else {
        Action::Ignore
    }
}

fn backspace(context: &CursorContext, modifiers: Modifiers) -> Action {
    if context.has_selection {
        return Action::Native(NativeEdit::DeleteBackward);
    }
    if !context.collapsed_at_start() {
        return if modifiers.primary || modifiers.alt {
            Action::Native(NativeEdit::DeleteWordBackward)
        } else {
            Action::Native(NativeEdit::DeleteBackward)
        };
    }
    if !context.text_empty {
        return Action::MergeWithPrevious;
    }
    if context.level > 0 {
        return Action::Outdent;
    }
    if context.sole_item {
        return Action::Ignore;
    }
    if context.has_children {
        Action::MergeWithPrevious
    } else {
        Action::RemoveEmpty
    }
}

fn arrow(key: Key, modifiers: Modifiers, context: &CursorContext) -> Action {
    let caret_move = match (key, modifiers.primary || modifiers.alt) {
        (Key::Left, true) => CaretMove::WordLeft,
        (Key::Right, true) => CaretMove::WordRight,
        (Key::Left, false) => CaretMove::Left,
        (Key::Right, false) => CaretMove::Right,
        (Key::Up, _) => CaretMove::Up,
        (Key::Down, _) => CaretMove::Down,
        (Key::Home, _) => CaretMove::LineStart,
        (_, _) => CaretMove::LineEnd,
    };
    if modifiers.shift {
        return Action::Native(NativeEdit::Select(caret_move));
    }
    if !context.has_selection {
        match caret_move {
            CaretMove::Up if context.on_first_line => return Action::FocusPrevious,
            CaretMove::Left if context.at_start => return Action::FocusPrevious,
            CaretMove::Down if context.on_last_line => return Action::FocusNext,
            CaretMove::Right if context.at_end => return Action::FocusNext,
            _ => {}
        }
    }
    Action::Native(NativeEdit::Move(caret_move))
}

#[cfg(test)]
#[path = "keymap_tests.rs"]
mod tests;

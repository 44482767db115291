//! Daily notes as a keyboard-driven outline.
//!
//! The core (`outline`, `caret`, `keymap`, `history`, `schedule`, `editor`)
//! knows nothing about terminals; `editor_display`, `render` and `theme` lay
//! the outline out for ratatui, `store` and `template` handle the files.

pub mod ansi;
pub mod caret;
pub mod config;
pub mod editor;
pub mod editor_display;
pub mod history;
pub mod keymap;
pub mod logging;
pub mod outline;
pub mod render;
pub mod schedule;
pub mod store;
pub mod surface;
pub mod template;
pub mod theme;

use std::ops::{Deref, DerefMut};
use std::time::Instant;

use log::debug;
use ratatui::layout::Rect;

use crate::caret::{CaretTarget, RestoreStep};
use crate::editor::OutlineEditor;
use crate::outline::ItemId;
use crate::render::{CursorVisualPosition, LineMap, RenderResult, render_outline};
use crate::surface::SurfaceMap;
use crate::theme::Theme;

/// EditorDisplay wraps an OutlineEditor and owns everything tied to the
/// screen: the item surfaces rebuilt on every frame, caret restoration and
/// the mapping from screen cells back to items.
#[derive(Debug)]
pub struct EditorDisplay {
    editor: OutlineEditor,
    theme: Theme,
    line_map: Vec<LineMap>,
    last_cursor_visual: Option<CursorVisualPosition>,
    cursor_following: bool,
    last_view_height: usize,
    last_total_lines: usize,
    last_text_area: Rect,
}

impl EditorDisplay {
    pub fn new(editor: OutlineEditor, theme: Theme) -> Self {
        Self {
            editor,
            theme,
            line_map: Vec::new(),
            last_cursor_visual: None,
            cursor_following: true,
            last_view_height: 1,
            last_total_lines: 0,
            last_text_area: Rect::default(),
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn last_cursor_visual(&self) -> Option<CursorVisualPosition> {
        self.last_cursor_visual
    }

    pub fn cursor_following(&self) -> bool {
        self.cursor_following
    }

    pub fn set_cursor_following(&mut self, following: bool) {
        self.cursor_following = following;
    }

    pub fn detach_cursor_follow(&mut self) {
        self.cursor_following = false;
    }

    pub fn last_view_height(&self) -> usize {
        self.last_view_height
    }

    pub fn last_total_lines(&self) -> usize {
        self.last_total_lines
    }

    /// Rebuild the surfaces, settle a pending caret restore against them and
    /// lay the outline out at `wrap_width`.
    pub fn render(&mut self, wrap_width: usize) -> RenderResult {
        let surfaces = SurfaceMap::from_document(self.editor.document());
        if let Some(step) = self.editor.settle(&surfaces) {
            match step {
                RestoreStep::Resolved(_) | RestoreStep::Retry => {}
                RestoreStep::GaveUp => {
                    debug!("event=caret_restore module=display status=gave_up");
                }
                RestoreStep::Abandoned => {
                    debug!("event=caret_restore module=display status=abandoned");
                }
            }
        }

        let result = render_outline(
            self.editor.document(),
            self.editor.focus(),
            wrap_width,
            &self.theme,
        );
        self.line_map = result.line_map.clone();
        self.last_cursor_visual = result.cursor;
        result
    }

    /// Update tracking state after rendering (called from draw)
    pub fn update_after_render(&mut self, text_area: Rect, total_lines: usize) {
        self.last_text_area = text_area;
        self.last_total_lines = total_lines;
        self.last_view_height = (text_area.height as usize).max(1);
    }

    pub fn page_jump_distance(&self) -> usize {
        let viewport = self.last_view_height.max(1);
        let approx = ((viewport as f32) * 0.9).round() as usize;
        approx.max(1)
    }

    /// Item and caret offset under a mouse position, if it hits the outline.
    pub fn pointer_from_mouse(
        &self,
        column: u16,
        row: u16,
        scroll_top: usize,
    ) -> Option<(ItemId, usize)> {
        let area = self.last_text_area;
        if area.width == 0 || area.height == 0 {
            return None;
        }
        let max_x = area.x.saturating_add(area.width);
        let max_y = area.y.saturating_add(area.height);
        if column < area.x || column >= max_x || row < area.y || row >= max_y {
            return None;
        }
        let line = scroll_top.saturating_add((row - area.y) as usize);
        let map = self.line_map.get(line)?;
        Some((map.item.clone(), map.offset_at(column - area.x)))
    }

    pub fn focus_at_mouse(&mut self, column: u16, row: u16, scroll_top: usize, now: Instant) -> bool {
        let Some((item, offset)) = self.pointer_from_mouse(column, row, scroll_top) else {
            return false;
        };
        let moved = self
            .editor
            .focus_on(&item, CaretTarget::Offset(offset), now);
        if moved {
            self.cursor_following = true;
        }
        moved
    }

    /// Screen line of the first row of `item` in the last render.
    pub fn first_line_of(&self, item: &ItemId) -> Option<usize> {
        self.line_map.iter().position(|map| &map.item == item)
    }
}

impl Deref for EditorDisplay {
    type Target = OutlineEditor;

    fn deref(&self) -> &Self::Target {
        &self.editor
    }
}

impl DerefMut for EditorDisplay {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.editor
    }
}

use ratatui::{
    style::Style,
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

use crate::editor::Focus;
use crate::outline::{Document, Item, ItemId, visual_order};
use crate::theme::Theme;

const INDENT: &str = "  ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorVisualPosition {
    pub line: usize,
    pub column: u16,
}

/// Which item a rendered line belongs to, and the char offset found at each
/// column that carries text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineMap {
    pub item: ItemId,
    pub prefix_width: u16,
    hits: Vec<(u16, usize)>,
    end: usize,
}

impl LineMap {
    /// Caret offset for a click at `column`.
    pub fn offset_at(&self, column: u16) -> usize {
        if column < self.prefix_width {
            return self.hits.first().map(|(_, offset)| *offset).unwrap_or(self.end);
        }
        let mut offset = self.end;
        for (hit_column, hit_offset) in self.hits.iter().rev() {
            if *hit_column <= column {
                return if *hit_column == column {
                    *hit_offset
                } else {
                    offset.min(hit_offset + 1)
                };
            }
            offset = *hit_offset;
        }
        offset
    }
}

#[derive(Debug)]
pub struct RenderResult {
    pub lines: Vec<Line<'static>>,
    pub cursor: Option<CursorVisualPosition>,
    pub total_lines: usize,
    pub line_map: Vec<LineMap>,
}

impl RenderResult {
    pub fn item_at_line(&self, line: usize) -> Option<&ItemId> {
        self.line_map.get(line).map(|map| &map.item)
    }

    /// Item and caret offset under a screen position relative to the outline.
    pub fn hit_test(&self, line: usize, column: u16) -> Option<(ItemId, usize)> {
        let map = self.line_map.get(line)?;
        Some((map.item.clone(), map.offset_at(column)))
    }
}

pub fn render_outline(
    document: &Document,
    focus: Option<&Focus>,
    width: usize,
    theme: &Theme,
) -> RenderResult {
    let mut renderer = Renderer::new(width.max(1), focus, theme);
    for item in visual_order(document) {
        renderer.render_item(item);
    }
    renderer.finish()
}

struct Renderer<'a> {
    wrap_width: usize,
    focus: Option<&'a Focus>,
    theme: &'a Theme,
    cursor: Option<CursorVisualPosition>,
    lines: Vec<Line<'static>>,
    line_map: Vec<LineMap>,
}

impl<'a> Renderer<'a> {
    fn new(wrap_width: usize, focus: Option<&'a Focus>, theme: &'a Theme) -> Self {
        Self {
            wrap_width,
            focus,
            theme,
            cursor: None,
            lines: Vec::new(),
            line_map: Vec::new(),
        }
    }

    fn render_item(&mut self, item: &Item) {
        let focus = self.focus.filter(|focus| focus.item == item.id);
        let indent = INDENT.repeat(item.level as usize);
        let bullet = if item.level % 2 == 0 { "• " } else { "◦ " };
        let first_prefix = Prefix {
            text: format!("{indent}{bullet}"),
            style: self.theme.bullet_style(focus.is_some()),
        };
        let continuation_prefix = Prefix {
            text: format!("{indent}{}", " ".repeat(visible_width(bullet))),
            style: Style::default(),
        };

        let marks = Marks {
            caret: focus.map(|focus| focus.caret),
            selection: focus.and_then(Focus::selection),
            selection_style: self.theme.selection_style(),
        };
        let fragments = tokenize_text(&item.text, Style::default(), &marks);
        let outputs = wrap_fragments(
            &fragments,
            &first_prefix,
            &continuation_prefix,
            self.wrap_width,
        );
        self.consume_lines(&item.id, outputs, item.text.chars().count());
    }

    fn consume_lines(&mut self, item: &ItemId, outputs: Vec<LineOutput>, text_len: usize) {
        let count = outputs.len();
        for (index, output) in outputs.into_iter().enumerate() {
            let spans: Vec<Span<'static>> = output
                .spans
                .into_iter()
                .map(|segment| Span::styled(segment.text, segment.style))
                .collect();
            if let Some(column) = output.cursor {
                self.cursor = Some(CursorVisualPosition {
                    line: self.lines.len(),
                    column,
                });
            }
            // a soft line ends right before its `\n`, the last line at the end
            let end = if index + 1 == count {
                text_len
            } else {
                output.end
            };
            self.line_map.push(LineMap {
                item: item.clone(),
                prefix_width: output.prefix_width,
                hits: output.hits,
                end,
            });
            self.lines.push(Line::from(spans));
        }
    }

    fn finish(mut self) -> RenderResult {
        if self.lines.is_empty() {
            self.lines.push(Line::from(""));
        }
        let total_lines = self.lines.len();
        RenderResult {
            lines: self.lines,
            cursor: self.cursor,
            total_lines,
            line_map: self.line_map,
        }
    }
}

struct Prefix {
    text: String,
    style: Style,
}

struct Marks {
    caret: Option<usize>,
    selection: Option<(usize, usize)>,
    selection_style: Style,
}

impl Marks {
    fn style_at(&self, offset: usize, base: Style) -> Style {
        match self.selection {
            Some((start, end)) if offset >= start && offset < end => self.selection_style,
            _ => base,
        }
    }
}

#[derive(Clone)]
struct LineSegment {
    text: String,
    style: Style,
}

struct LineOutput {
    spans: Vec<LineSegment>,
    cursor: Option<u16>,
    prefix_width: u16,
    hits: Vec<(u16, usize)>,
    end: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FragmentKind {
    Word,
    Whitespace,
}

#[derive(Clone, Debug)]
struct Fragment {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    /// `(column within the fragment, char offset in the item)` per char.
    offsets: Vec<(usize, usize)>,
    cursor: Option<usize>,
}

#[derive(Clone, Debug)]
enum FragmentItem {
    Token(Fragment),
    /// A `\n` at the given char offset.
    LineBreak(usize),
}

fn tokenize_text(text: &str, base: Style, marks: &Marks) -> Vec<FragmentItem> {
    let mut fragments = Vec::new();
    let mut builder: Option<TokenBuilder> = None;
    let mut pending_cursor = false;

    for (offset, ch) in text.chars().enumerate() {
        if marks.caret == Some(offset) {
            pending_cursor = true;
        }
        if ch == '\n' {
            if let Some(mut token) = builder.take() {
                token.add_cursor(&mut pending_cursor);
                fragments.push(FragmentItem::Token(token.finish()));
            } else if pending_cursor {
                fragments.push(FragmentItem::Token(empty_fragment(base)));
                pending_cursor = false;
            }
            fragments.push(FragmentItem::LineBreak(offset));
            continue;
        }

        let style = marks.style_at(offset, base);
        let is_whitespace = ch.is_whitespace();
        match builder.as_mut() {
            Some(current) if current.matches(is_whitespace, style) => {
                current.add_cursor(&mut pending_cursor);
                current.push_char(ch, offset);
            }
            _ => {
                if let Some(existing) = builder.take() {
                    fragments.push(FragmentItem::Token(existing.finish()));
                }
                let mut next = TokenBuilder::new(style, is_whitespace);
                next.add_cursor(&mut pending_cursor);
                next.push_char(ch, offset);
                builder = Some(next);
            }
        }
    }

    if marks.caret.is_some_and(|caret| caret >= text.chars().count()) {
        pending_cursor = true;
    }
    if let Some(mut token) = builder {
        token.add_cursor(&mut pending_cursor);
        fragments.push(FragmentItem::Token(token.finish()));
    } else if pending_cursor {
        fragments.push(FragmentItem::Token(empty_fragment(base)));
    }
    fragments
}

fn empty_fragment(style: Style) -> Fragment {
    Fragment {
        text: String::new(),
        style,
        kind: FragmentKind::Word,
        width: 0,
        offsets: Vec::new(),
        cursor: Some(0),
    }
}

struct TokenBuilder {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    offsets: Vec<(usize, usize)>,
    cursor: Option<usize>,
}

impl TokenBuilder {
    fn new(style: Style, is_whitespace: bool) -> Self {
        Self {
            text: String::new(),
            style,
            kind: if is_whitespace {
                FragmentKind::Whitespace
            } else {
                FragmentKind::Word
            },
            width: 0,
            offsets: Vec::new(),
            cursor: None,
        }
    }

    fn matches(&self, is_whitespace: bool, style: Style) -> bool {
        self.style == style
            && matches!(
                (self.kind, is_whitespace),
                (FragmentKind::Whitespace, true) | (FragmentKind::Word, false)
            )
    }

    fn add_cursor(&mut self, pending: &mut bool) {
        if std::mem::take(pending) {
            self.cursor = Some(self.width);
        }
    }

    fn push_char(&mut self, ch: char, offset: usize) {
        self.offsets.push((self.width, offset));
        self.text.push(ch);
        self.width += UnicodeWidthChar::width(ch).unwrap_or(0);
    }

    fn finish(self) -> Fragment {
        Fragment {
            text: self.text,
            style: self.style,
            kind: self.kind,
            width: self.width,
            offsets: self.offsets,
            cursor: self.cursor,
        }
    }
}

fn wrap_fragments(
    fragments: &[FragmentItem],
    first_prefix: &Prefix,
    continuation_prefix: &Prefix,
    width: usize,
) -> Vec<LineOutput> {
    let mut outputs = Vec::new();
    let mut builder = LineBuilder::new(first_prefix);
    let mut pending_whitespace: Vec<Fragment> = Vec::new();

    for fragment in fragments {
        match fragment {
            FragmentItem::LineBreak(offset) => {
                builder.consume_pending(&mut pending_whitespace);
                outputs.push(builder.build_line(*offset));
                builder = LineBuilder::new(continuation_prefix);
            }
            FragmentItem::Token(token) => match token.kind {
                FragmentKind::Whitespace => {
                    pending_whitespace.push(token.clone());
                }
                FragmentKind::Word => {
                    let whitespace_width: usize =
                        pending_whitespace.iter().map(|item| item.width).sum();
                    if builder.width > builder.prefix_width
                        && builder.width + whitespace_width + token.width > width
                    {
                        builder.consume_pending(&mut pending_whitespace);
                        let end = token.offsets.first().map(|(_, offset)| *offset).unwrap_or(0);
                        outputs.push(builder.build_line(end));
                        builder = LineBuilder::new(continuation_prefix);
                    }
                    builder.consume_pending(&mut pending_whitespace);
                    builder.append_token(token.clone());
                }
            },
        }
    }

    builder.consume_pending(&mut pending_whitespace);
    outputs.push(builder.build_line(usize::MAX));
    outputs
}

struct LineBuilder {
    segments: Vec<LineSegment>,
    cursor: Option<u16>,
    hits: Vec<(u16, usize)>,
    width: usize,
    prefix_width: usize,
}

impl LineBuilder {
    fn new(prefix: &Prefix) -> Self {
        let prefix_width = visible_width(&prefix.text);
        let mut segments = Vec::new();
        if !prefix.text.is_empty() {
            segments.push(LineSegment {
                text: prefix.text.clone(),
                style: prefix.style,
            });
        }
        Self {
            segments,
            cursor: None,
            hits: Vec::new(),
            width: prefix_width,
            prefix_width,
        }
    }

    fn consume_pending(&mut self, pending_whitespace: &mut Vec<Fragment>) {
        for fragment in pending_whitespace.drain(..) {
            self.append_token(fragment);
        }
    }

    fn append_token(&mut self, fragment: Fragment) {
        let start = self.width;
        for (column, offset) in &fragment.offsets {
            self.hits.push(((start + column) as u16, *offset));
        }
        if let Some(column) = fragment.cursor {
            self.cursor = Some((start + column) as u16);
        }
        if !fragment.text.is_empty() {
            self.width += fragment.width;
            self.segments.push(LineSegment {
                text: fragment.text,
                style: fragment.style,
            });
        }
    }

    fn build_line(mut self, end: usize) -> LineOutput {
        if self.segments.is_empty() {
            self.segments.push(LineSegment {
                text: String::new(),
                style: Style::default(),
            });
        }
        let end = match self.hits.last() {
            Some((_, last)) => end.max(last + 1),
            None => end,
        };
        LineOutput {
            spans: self.segments,
            cursor: self.cursor,
            prefix_width: self.prefix_width as u16,
            hits: self.hits,
            end,
        }
    }
}

pub(crate) fn visible_width(text: &str) -> usize {
    text.chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

//! Plain-text editing helpers. Offsets are char offsets, never bytes.

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    for (count, (byte_idx, _)) in text.char_indices().enumerate() {
        if count == char_idx {
            return byte_idx;
        }
    }
    text.len()
}

pub fn split_text(text: &str, offset: usize) -> (String, String) {
    let byte_idx = char_to_byte_idx(text, offset);
    (text[..byte_idx].to_string(), text[byte_idx..].to_string())
}

/// Inserts `insert` at `offset` and returns the caret after the insertion.
pub fn insert_str_at(text: &mut String, offset: usize, insert: &str) -> usize {
    let offset = offset.min(char_len(text));
    let byte_idx = char_to_byte_idx(text, offset);
    text.insert_str(byte_idx, insert);
    offset + char_len(insert)
}

/// Removes the chars in `start..end`. Returns `false` for an empty range.
pub fn remove_range(text: &mut String, start: usize, end: usize) -> bool {
    let len = char_len(text);
    let (start, end) = (start.min(len), end.min(len));
    if start >= end {
        return false;
    }
    let from = char_to_byte_idx(text, start);
    let to = char_to_byte_idx(text, end);
    text.drain(from..to);
    true
}

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

pub fn previous_word_boundary(text: &str, offset: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut idx = offset.min(chars.len());
    while idx > 0 && chars[idx - 1].is_whitespace() {
        idx -= 1;
    }
    if idx > 0 && is_word_char(chars[idx - 1]) {
        while idx > 0 && is_word_char(chars[idx - 1]) {
            idx -= 1;
        }
    } else {
        while idx > 0 && !is_word_char(chars[idx - 1]) && !chars[idx - 1].is_whitespace() {
            idx -= 1;
        }
    }
    idx
}

pub fn next_word_boundary(text: &str, offset: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut idx = offset.min(chars.len());
    while idx < chars.len() && chars[idx].is_whitespace() {
        idx += 1;
    }
    if idx < chars.len() && is_word_char(chars[idx]) {
        while idx < chars.len() && is_word_char(chars[idx]) {
            idx += 1;
        }
    } else {
        while idx < chars.len() && !is_word_char(chars[idx]) && !chars[idx].is_whitespace() {
            idx += 1;
        }
    }
    idx
}

/// `(start, end)` of every logical line, `end` exclusive of the `\n`.
pub fn line_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for line in text.split('\n') {
        let len = char_len(line);
        spans.push((start, start + len));
        start += len + 1;
    }
    spans
}

/// Logical line holding `offset` and the column within it.
pub fn line_and_column(text: &str, offset: usize) -> (usize, usize) {
    let spans = line_spans(text);
    for (index, (start, end)) in spans.iter().enumerate() {
        if offset <= *end {
            return (index, offset.saturating_sub(*start));
        }
    }
    let last = spans.len() - 1;
    (last, spans[last].1 - spans[last].0)
}

pub fn line_start(text: &str, offset: usize) -> usize {
    let (line, _) = line_and_column(text, offset);
    line_spans(text)[line].0
}

pub fn line_end(text: &str, offset: usize) -> usize {
    let (line, _) = line_and_column(text, offset);
    line_spans(text)[line].1
}

/// Moves `offset` one logical line up or down, keeping the column where the
/// target line is long enough. `None` when there is no such line.
pub fn vertical_offset(text: &str, offset: usize, down: bool) -> Option<usize> {
    let spans = line_spans(text);
    let (line, column) = line_and_column(text, offset);
    let target = if down {
        line + 1
    } else {
        line.checked_sub(1)?
    };
    let (start, end) = *spans.get(target)?;
    Some((start + column).min(end))
}

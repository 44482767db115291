//! Editable surfaces.
//!
//! Every render rebuilds one small node tree per item: a root element with
//! one line element per logical (`\n`-separated) line, each holding a single
//! text node. Carets never point into these trees directly; the caret codec
//! describes positions as index paths and resolves them again against the
//! freshly built surface.

use std::collections::HashMap;

use crate::outline::{Document, Item, ItemId, visual_order};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceNode {
    Element(Vec<SurfaceNode>),
    Text(String),
}

impl SurfaceNode {
    pub fn children(&self) -> &[SurfaceNode] {
        match self {
            SurfaceNode::Element(children) => children,
            SurfaceNode::Text(_) => &[],
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, SurfaceNode::Text(_))
    }

    /// Character length of a text node, `None` for elements.
    pub fn text_len(&self) -> Option<usize> {
        match self {
            SurfaceNode::Text(text) => Some(text.chars().count()),
            SurfaceNode::Element(_) => None,
        }
    }
}

/// A text node of a surface together with where its content starts in the
/// item's text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSlot {
    pub path: Vec<usize>,
    pub start: usize,
    pub len: usize,
}

impl TextSlot {
    fn end(&self) -> usize {
        self.start + self.len
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemSurface {
    item: ItemId,
    root: SurfaceNode,
    slots: Vec<TextSlot>,
    total_len: usize,
}

impl ItemSurface {
    pub fn build(item: &Item) -> Self {
        Self::from_text(item.id.clone(), &item.text)
    }

    pub fn from_text(item: ItemId, text: &str) -> Self {
        let mut lines = Vec::new();
        let mut slots = Vec::new();
        let mut start = 0;
        for (index, line) in text.split('\n').enumerate() {
            let len = line.chars().count();
            lines.push(SurfaceNode::Element(vec![SurfaceNode::Text(line.to_string())]));
            slots.push(TextSlot {
                path: vec![index, 0],
                start,
                len,
            });
            // the separator itself occupies one character of the item text
            start += len + 1;
        }
        Self {
            item,
            root: SurfaceNode::Element(lines),
            slots,
            total_len: text.chars().count(),
        }
    }

    pub fn item(&self) -> &ItemId {
        &self.item
    }

    pub fn root(&self) -> &SurfaceNode {
        &self.root
    }

    /// Text nodes in document order.
    pub fn slots(&self) -> &[TextSlot] {
        &self.slots
    }

    pub fn total_len(&self) -> usize {
        self.total_len
    }

    pub fn line_count(&self) -> usize {
        self.slots.len()
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&SurfaceNode> {
        let mut node = &self.root;
        for &index in path {
            node = node.children().get(index)?;
        }
        Some(node)
    }

    pub fn slot_at(&self, path: &[usize]) -> Option<&TextSlot> {
        self.slots.iter().find(|slot| slot.path == path)
    }

    /// Maps an offset in the item's text onto the text node that holds it.
    ///
    /// Offsets past the end land at the end of the last node.
    pub fn locate_offset(&self, offset: usize) -> (&TextSlot, usize) {
        let offset = offset.min(self.total_len);
        for slot in &self.slots {
            if offset <= slot.end() {
                return (slot, offset.saturating_sub(slot.start));
            }
        }
        let last = &self.slots[self.slots.len() - 1];
        (last, last.len)
    }

    /// Offset in the item's text for `offset` inside the node at `path`.
    pub fn absolute_offset(&self, path: &[usize], offset: usize) -> Option<usize> {
        let slot = self.slot_at(path)?;
        Some(slot.start + offset.min(slot.len))
    }

    /// Follows `path` as far as it goes, clamping every index to the last
    /// existing child, and returns the first text node reached that way.
    pub fn nearest_slot(&self, path: &[usize]) -> Option<&TextSlot> {
        let mut node = &self.root;
        let mut resolved = Vec::with_capacity(path.len());
        let mut steps = path.iter();
        while !node.is_text() {
            let children = node.children();
            if children.is_empty() {
                return None;
            }
            let wanted = steps.next().copied().unwrap_or(0);
            let index = wanted.min(children.len() - 1);
            resolved.push(index);
            node = &children[index];
        }
        self.slot_at(&resolved)
    }
}

/// Surfaces of every item that is currently on screen.
#[derive(Clone, Debug, Default)]
pub struct SurfaceMap {
    surfaces: HashMap<ItemId, ItemSurface>,
}

impl SurfaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: &Document) -> Self {
        let surfaces = visual_order(document)
            .map(|item| (item.id.clone(), ItemSurface::build(item)))
            .collect();
        Self { surfaces }
    }

    pub fn insert(&mut self, surface: ItemSurface) {
        self.surfaces.insert(surface.item.clone(), surface);
    }

    pub fn get(&self, id: &ItemId) -> Option<&ItemSurface> {
        self.surfaces.get(id)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

//! Outline document model.
//!
//! A document is a forest of [`Item`]s. Items are shared through `Arc`, so a
//! mutation only rebuilds the path from the edited node to the root and every
//! untouched subtree keeps its reference. Nothing here mutates an item that a
//! caller can already see.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

mod ids;
mod locate;
pub mod mutate;
pub mod order;

pub use ids::{IdSource, ItemId, SequentialIds, UuidIds};
pub use locate::{Location, locate};
pub use order::{VisualOrder, visual_order};

/// Deepest indentation level an item may have.
pub const MAX_LEVEL: u8 = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub level: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Arc<Item>>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, text: impl Into<String>, level: u8) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            level,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Item>) -> Self {
        self.children = children.into_iter().map(Arc::new).collect();
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Copy of this node's fields around a different child list.
    pub(crate) fn rebuilt(&self, children: Vec<Arc<Item>>) -> Item {
        Item {
            id: self.id.clone(),
            text: self.text.clone(),
            level: self.level,
            children,
        }
    }

    pub(crate) fn with_text(&self, text: String) -> Item {
        Item {
            id: self.id.clone(),
            text,
            level: self.level,
            children: self.children.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    items: Vec<Arc<Item>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<Item>) -> Self {
        Self {
            items: items.into_iter().map(Arc::new).collect(),
        }
    }

    pub(crate) fn from_shared(items: Vec<Arc<Item>>) -> Self {
        Self { items }
    }

    /// Root-level items in order.
    pub fn items(&self) -> &[Arc<Item>] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items in the whole forest.
    pub fn item_count(&self) -> usize {
        visual_order(self).count()
    }

    pub fn find(&self, id: &ItemId) -> Option<&Item> {
        visual_order(self).find(|item| &item.id == id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.find(id).is_some()
    }

    /// True when `id` is the only item left in the document.
    pub fn is_sole_item(&self, id: &ItemId) -> bool {
        self.items.len() == 1 && self.items[0].id == *id && !self.items[0].has_children()
    }

    /// Cheap check whether two documents are the same snapshot.
    pub fn shares_roots_with(&self, other: &Document) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(other.items.iter())
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

/// Makes a loaded document safe to edit.
///
/// Levels above [`MAX_LEVEL`] are clamped, blank or repeated ids are replaced
/// with fresh ones and an empty document receives a single empty item.
pub fn normalize(document: &Document, ids: &mut dyn IdSource) -> Document {
    let mut seen = HashSet::new();
    let mut items: Vec<Arc<Item>> = document
        .items()
        .iter()
        .map(|item| normalize_item(item, ids, &mut seen))
        .collect();
    if items.is_empty() {
        items.push(Arc::new(Item::new(ids.mint(), "", 0)));
    }
    let normalized = Document::from_shared(items);
    if normalized == *document {
        document.clone()
    } else {
        normalized
    }
}

fn normalize_item(
    item: &Arc<Item>,
    ids: &mut dyn IdSource,
    seen: &mut HashSet<ItemId>,
) -> Arc<Item> {
    let id = if item.id.is_blank() || seen.contains(&item.id) {
        let mut fresh = ids.mint();
        while seen.contains(&fresh) {
            fresh = ids.mint();
        }
        fresh
    } else {
        item.id.clone()
    };
    seen.insert(id.clone());
    let children = item
        .children
        .iter()
        .map(|child| normalize_item(child, ids, seen))
        .collect();
    Arc::new(Item {
        id,
        text: item.text.clone(),
        level: item.level.min(MAX_LEVEL),
        children,
    })
}

/// Ensures the editor always has an item to focus.
pub fn ensure_initialized(document: Document, ids: &mut dyn IdSource) -> Document {
    if document.is_empty() {
        Document::from_items(vec![Item::new(ids.mint(), "", 0)])
    } else {
        document
    }
}

use std::sync::Arc;

use super::{Document, Item, ItemId};

/// Where an item lives: the index path from the root array down to it.
///
/// The owning array is the child list of the item at `parent_path()` (or the
/// document root when there is no parent), and `index()` is the position
/// inside that array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    path: Vec<usize>,
}

impl Location {
    pub(crate) fn from_path(path: Vec<usize>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub fn index(&self) -> usize {
        self.path.last().copied().unwrap_or(0)
    }

    pub fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn has_parent(&self) -> bool {
        self.path.len() > 1
    }

    /// Path of the array that owns the item.
    pub fn array_path(&self) -> &[usize] {
        &self.path[..self.path.len().saturating_sub(1)]
    }

    pub fn parent(&self) -> Option<Location> {
        if self.has_parent() {
            Some(Location::from_path(self.array_path().to_vec()))
        } else {
            None
        }
    }
}

/// Depth-first search for `id`.
pub fn locate(document: &Document, id: &ItemId) -> Option<Location> {
    let mut path = Vec::new();
    if search(document.items(), id, &mut path) {
        Some(Location::from_path(path))
    } else {
        None
    }
}

fn search(items: &[Arc<Item>], id: &ItemId, path: &mut Vec<usize>) -> bool {
    for (idx, item) in items.iter().enumerate() {
        path.push(idx);
        if item.id == *id || search(&item.children, id, path) {
            return true;
        }
        path.pop();
    }
    false
}

pub(crate) fn item_at<'a>(document: &'a Document, path: &[usize]) -> Option<&'a Arc<Item>> {
    let (first, rest) = path.split_first()?;
    let mut item = document.items().get(*first)?;
    for idx in rest {
        item = item.children.get(*idx)?;
    }
    Some(item)
}

pub(crate) fn array_at<'a>(document: &'a Document, array_path: &[usize]) -> Option<&'a [Arc<Item>]> {
    if array_path.is_empty() {
        return Some(document.items());
    }
    item_at(document, array_path).map(|item| item.children.as_slice())
}

/// Rebuilds the document with the array at `array_path` edited in place.
///
/// Only the items on the path are re-allocated; siblings keep their `Arc`.
/// Returns `None` when the path does not resolve or `edit` declines.
pub(crate) fn edit_array<F>(document: &Document, array_path: &[usize], edit: F) -> Option<Document>
where
    F: FnOnce(&mut Vec<Arc<Item>>) -> bool,
{
    let items = edit_level(document.items(), array_path, edit)?;
    Some(Document::from_shared(items))
}

fn edit_level<F>(items: &[Arc<Item>], array_path: &[usize], edit: F) -> Option<Vec<Arc<Item>>>
where
    F: FnOnce(&mut Vec<Arc<Item>>) -> bool,
{
    match array_path.split_first() {
        None => {
            let mut edited = items.to_vec();
            if edit(&mut edited) { Some(edited) } else { None }
        }
        Some((&idx, rest)) => {
            let node = items.get(idx)?;
            let children = edit_level(&node.children, rest, edit)?;
            let mut edited = items.to_vec();
            edited[idx] = Arc::new(node.rebuilt(children));
            Some(edited)
        }
    }
}

/// Swaps the item at `path` for `replacement`.
pub(crate) fn replace_at(document: &Document, path: &[usize], replacement: Item) -> Option<Document> {
    let (&idx, array_path) = path.split_last()?;
    edit_array(document, array_path, |items| {
        if idx < items.len() {
            items[idx] = Arc::new(replacement);
            true
        } else {
            false
        }
    })
}

pub(crate) fn remove_at(document: &Document, path: &[usize]) -> Option<(Document, Arc<Item>)> {
    let (&idx, array_path) = path.split_last()?;
    let removed = array_at(document, array_path)?.get(idx)?.clone();
    let edited = edit_array(document, array_path, |items| {
        items.remove(idx);
        true
    })?;
    Some((edited, removed))
}

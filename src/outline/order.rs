//! Visual order: depth-first pre-order over the forest.
//!
//! This is what the reader sees top to bottom. It is derived from the tree
//! on demand and never stored, so it is always current for the document it
//! was created from.

use std::slice;
use std::sync::Arc;

use super::{Document, Item, ItemId};

/// Lazy pre-order walk. Cloning the iterator restarts from the same point.
#[derive(Clone, Debug)]
pub struct VisualOrder<'a> {
    stack: Vec<slice::Iter<'a, Arc<Item>>>,
}

impl<'a> Iterator for VisualOrder<'a> {
    type Item = &'a Item;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(item) => {
                    if !item.children.is_empty() {
                        self.stack.push(item.children.iter());
                    }
                    return Some(item.as_ref());
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

pub fn visual_order(document: &Document) -> VisualOrder<'_> {
    VisualOrder {
        stack: vec![document.items().iter()],
    }
}

pub fn ids(document: &Document) -> impl Iterator<Item = &ItemId> + '_ {
    visual_order(document).map(|item| &item.id)
}

pub fn first(document: &Document) -> Option<&Item> {
    visual_order(document).next()
}

pub fn last(document: &Document) -> Option<&Item> {
    visual_order(document).last()
}

pub fn position(document: &Document, id: &ItemId) -> Option<usize> {
    visual_order(document).position(|item| &item.id == id)
}

pub fn nth(document: &Document, index: usize) -> Option<&Item> {
    visual_order(document).nth(index)
}

/// Item immediately before `id` on screen.
pub fn previous<'a>(document: &'a Document, id: &ItemId) -> Option<&'a Item> {
    let mut before = None;
    for item in visual_order(document) {
        if &item.id == id {
            return before;
        }
        before = Some(item);
    }
    None
}

/// Item immediately after `id` on screen.
pub fn next<'a>(document: &'a Document, id: &ItemId) -> Option<&'a Item> {
    let mut walk = visual_order(document);
    walk.by_ref().find(|item| &item.id == id)?;
    walk.next()
}

/// First item after the whole subtree of `id`, skipping its descendants.
pub fn next_after_subtree<'a>(document: &'a Document, id: &ItemId) -> Option<&'a Item> {
    let mut walk = visual_order(document);
    let target = walk.by_ref().find(|item| &item.id == id)?;
    let descendants = subtree_size(target) - 1;
    walk.nth(descendants)
}

pub(crate) fn subtree_size(item: &Item) -> usize {
    1 + item.children.iter().map(|child| subtree_size(child)).sum::<usize>()
}

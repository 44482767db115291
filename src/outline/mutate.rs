//! Structural edits on the outline.
//!
//! Every function takes the current document and returns the edited copy, or
//! `None` when the edit does not apply (unknown id, nothing to merge with,
//! level shift out of bounds). The input document is never touched.

use std::sync::Arc;

use super::locate::{array_at, edit_array, item_at, remove_at, replace_at};
use super::{Document, IdSource, Item, ItemId, MAX_LEVEL, locate, order};

pub fn update_text(document: &Document, id: &ItemId, text: impl Into<String>) -> Option<Document> {
    let location = locate(document, id)?;
    let item = item_at(document, location.path())?;
    let text = text.into();
    if item.text == text {
        return None;
    }
    replace_at(document, location.path(), item.with_text(text))
}

/// Enter: `id` keeps `before` and its children, a new sibling gets `after`.
pub fn split_at(
    document: &Document,
    id: &ItemId,
    before: impl Into<String>,
    after: impl Into<String>,
    new_id: ItemId,
) -> Option<Document> {
    let location = locate(document, id)?;
    let item = item_at(document, location.path())?.clone();
    let index = location.index();
    let head = item.with_text(before.into());
    let tail = Item::new(new_id, after, item.level);
    edit_array(document, location.array_path(), |items| {
        items[index] = Arc::new(head);
        items.insert(index + 1, Arc::new(tail));
        true
    })
}

/// Folds `id` into the item before it on screen.
///
/// Undoes `split_at` only when the split item had no children; otherwise the
/// item before the new sibling is the split item's last descendant.
pub fn merge_with_previous(document: &Document, id: &ItemId) -> Option<Document> {
    let location = locate(document, id)?;
    let target = item_at(document, location.path())?.clone();

    if location.index() == 0 {
        let parent_location = location.parent()?;
        let parent = item_at(document, parent_location.path())?.clone();
        let adopted = shift_all(&target.children, parent.level as i32 - target.level as i32)?;
        let mut children = adopted;
        children.extend(parent.children.iter().skip(1).cloned());
        let merged = Item {
            id: parent.id.clone(),
            text: format!("{}{}", parent.text, target.text),
            level: parent.level,
            children,
        };
        return replace_at(document, parent_location.path(), merged);
    }

    let previous_id = order::previous(document, id)?.id.clone();
    let previous_location = locate(document, &previous_id)?;
    let previous = item_at(document, previous_location.path())?.clone();
    let mut children = previous.children.clone();
    children.extend(shift_all(
        &target.children,
        previous.level as i32 - target.level as i32,
    )?);
    let merged = Item {
        id: previous.id.clone(),
        text: format!("{}{}", previous.text, target.text),
        level: previous.level,
        children,
    };
    let (without_target, _) = remove_at(document, location.path())?;
    replace_at(&without_target, previous_location.path(), merged)
}

/// Delete at the end of `id`: the next item on screen is folded into it.
pub fn merge_with_next(document: &Document, id: &ItemId) -> Option<Document> {
    let location = locate(document, id)?;
    let target = item_at(document, location.path())?.clone();

    if let Some(first_child) = target.children.first() {
        let mut children =
            shift_all(&first_child.children, target.level as i32 - first_child.level as i32)?;
        children.extend(target.children.iter().skip(1).cloned());
        let merged = Item {
            id: target.id.clone(),
            text: format!("{}{}", target.text, first_child.text),
            level: target.level,
            children,
        };
        return replace_at(document, location.path(), merged);
    }

    let next_id = order::next(document, id)?.id.clone();
    let next_location = locate(document, &next_id)?;
    let next = item_at(document, next_location.path())?.clone();
    let merged = Item {
        id: target.id.clone(),
        text: format!("{}{}", target.text, next.text),
        level: target.level,
        children: shift_all(&next.children, target.level as i32 - next.level as i32)?,
    };
    let (without_next, _) = remove_at(document, next_location.path())?;
    replace_at(&without_next, location.path(), merged)
}

/// Tab: `id` becomes the last child of its previous sibling.
pub fn indent(document: &Document, id: &ItemId) -> Option<Document> {
    let location = locate(document, id)?;
    let index = location.index();
    if index == 0 {
        return None;
    }
    let siblings = array_at(document, location.array_path())?;
    let previous = siblings.get(index - 1)?.clone();
    let target = siblings.get(index)?.clone();
    let delta = previous.level as i32 + 1 - target.level as i32;
    let moved = shift_levels(&target, delta)?;

    let mut adopted = previous.children.clone();
    adopted.push(moved);
    let new_parent = previous.rebuilt(adopted);
    edit_array(document, location.array_path(), |items| {
        items[index - 1] = Arc::new(new_parent);
        items.remove(index);
        true
    })
}

/// Shift+Tab: `id` leaves its parent and lands right after it.
///
/// A root item with a level above zero only loses one level.
pub fn outdent(document: &Document, id: &ItemId) -> Option<Document> {
    let location = locate(document, id)?;
    let target = item_at(document, location.path())?.clone();

    let Some(parent_location) = location.parent() else {
        if target.level == 0 {
            return None;
        }
        let moved = shift_levels(&target, -1)?;
        return replace_at(document, location.path(), (*moved).clone());
    };

    let parent = item_at(document, parent_location.path())?.clone();
    let moved = shift_levels(&target, parent.level as i32 - target.level as i32)?;
    let mut remaining = parent.children.clone();
    remaining.remove(location.index());
    let parent_index = parent_location.index();
    let new_parent = parent.rebuilt(remaining);
    edit_array(document, parent_location.array_path(), |items| {
        items[parent_index] = Arc::new(new_parent);
        items.insert(parent_index + 1, moved);
        true
    })
}

pub fn move_up(document: &Document, id: &ItemId) -> Option<Document> {
    let location = locate(document, id)?;
    let index = location.index();
    if index == 0 {
        return None;
    }
    edit_array(document, location.array_path(), |items| {
        items.swap(index - 1, index);
        true
    })
}

pub fn move_down(document: &Document, id: &ItemId) -> Option<Document> {
    let location = locate(document, id)?;
    let index = location.index();
    edit_array(document, location.array_path(), |items| {
        if index + 1 >= items.len() {
            return false;
        }
        items.swap(index, index + 1);
        true
    })
}

/// Copies the subtree of `id` right after it. Returns the copy's root id.
pub fn duplicate(
    document: &Document,
    id: &ItemId,
    ids: &mut dyn IdSource,
) -> Option<(Document, ItemId)> {
    let location = locate(document, id)?;
    let original = item_at(document, location.path())?.clone();
    let copy = clone_with_fresh_ids(&original, ids);
    let copy_id = copy.id.clone();
    let index = location.index();
    let edited = edit_array(document, location.array_path(), |items| {
        items.insert(index + 1, Arc::new(copy));
        true
    })?;
    Some((edited, copy_id))
}

pub fn delete_subtree(document: &Document, id: &ItemId) -> Option<Document> {
    let location = locate(document, id)?;
    remove_at(document, location.path()).map(|(edited, _)| edited)
}

/// Removes exactly one node. Items that still carry children are refused,
/// since their descendants would otherwise go with them.
pub fn delete_single(document: &Document, id: &ItemId) -> Option<Document> {
    let location = locate(document, id)?;
    if item_at(document, location.path())?.has_children() {
        return None;
    }
    remove_at(document, location.path()).map(|(edited, _)| edited)
}

/// Inserts `item` as the next sibling of `id`.
pub fn insert_after(document: &Document, id: &ItemId, item: Item) -> Option<Document> {
    let location = locate(document, id)?;
    let index = location.index();
    edit_array(document, location.array_path(), |items| {
        items.insert(index + 1, Arc::new(item));
        true
    })
}

pub fn append_root(document: &Document, item: Item) -> Document {
    let mut items = document.items().to_vec();
    items.push(Arc::new(item));
    Document::from_shared(items)
}

/// Deep copy of a subtree where every node gets a newly minted id.
pub fn clone_with_fresh_ids(item: &Item, ids: &mut dyn IdSource) -> Item {
    Item {
        id: ids.mint(),
        text: item.text.clone(),
        level: item.level,
        children: item
            .children
            .iter()
            .map(|child| Arc::new(clone_with_fresh_ids(child, ids)))
            .collect(),
    }
}

/// Moves a whole subtree by `delta` levels, or `None` if any node would leave
/// `0..=MAX_LEVEL`.
fn shift_levels(item: &Arc<Item>, delta: i32) -> Option<Arc<Item>> {
    if delta == 0 {
        return Some(Arc::clone(item));
    }
    let level = item.level as i32 + delta;
    if !(0..=MAX_LEVEL as i32).contains(&level) {
        return None;
    }
    Some(Arc::new(Item {
        id: item.id.clone(),
        text: item.text.clone(),
        level: level as u8,
        children: shift_all(&item.children, delta)?,
    }))
}

fn shift_all(items: &[Arc<Item>], delta: i32) -> Option<Vec<Arc<Item>>> {
    items.iter().map(|item| shift_levels(item, delta)).collect()
}

#[cfg(test)]
#[path = "mutate_tests.rs"]
mod tests;

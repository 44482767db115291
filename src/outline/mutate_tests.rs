use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use super::*;
use crate::outline::{SequentialIds, visual_order};

fn item(id: &str, text: &str, level: u8) -> Item {
    Item::new(id, text, level)
}

fn ids_in_order(document: &Document) -> Vec<String> {
    visual_order(document)
        .map(|item| item.id.as_str().to_string())
        .collect()
}

fn find<'a>(document: &'a Document, id: &str) -> &'a Item {
    document.find(&id.into()).expect("item should exist")
}

fn nested() -> Document {
    Document::from_items(vec![
        item("a", "X", 0).with_children(vec![item("b", "Y", 1)]),
        item("c", "Z", 0),
    ])
}

#[test]
fn update_text_replaces_only_the_text() {
    let doc = nested();
    let edited = update_text(&doc, &"b".into(), "new").unwrap();
    assert_eq!(find(&edited, "b").text, "new");
    assert_eq!(ids_in_order(&edited), ids_in_order(&doc));
    assert!(Arc::ptr_eq(&doc.items()[1], &edited.items()[1]));

    assert!(update_text(&doc, &"b".into(), "Y").is_none());
    assert!(update_text(&doc, &"ghost".into(), "x").is_none());
}

#[test]
fn split_in_the_middle_of_foo() {
    let doc = Document::from_items(vec![item("a", "Foo", 0)]);
    let edited = split_at(&doc, &"a".into(), "Fo", "o", "new".into()).unwrap();
    assert_eq!(
        edited,
        Document::from_items(vec![item("a", "Fo", 0), item("new", "o", 0)])
    );
}

#[test]
fn split_leaves_children_with_the_original() {
    let doc = nested();
    let edited = split_at(&doc, &"a".into(), "X", "", "n".into()).unwrap();
    assert_eq!(ids_in_order(&edited), vec!["a", "b", "n", "c"]);
    assert_eq!(find(&edited, "n").level, 0);
    assert!(!find(&edited, "n").has_children());
}

#[test]
fn split_then_merge_restores_the_text() {
    let doc = Document::from_items(vec![
        item("p", "before", 0),
        item("a", "Hello world", 0),
    ]);
    let split = split_at(&doc, &"a".into(), "Hello", " world", "n".into()).unwrap();
    let merged = merge_with_previous(&split, &"n".into()).unwrap();
    assert_eq!(merged, doc);
}

#[test]
fn split_then_merge_of_a_parent_feeds_its_last_descendant() {
    let doc = Document::from_items(vec![
        item("a", "Foo", 0).with_children(vec![item("b", "Y", 1)]),
    ]);
    let split = split_at(&doc, &"a".into(), "Fo", "o", "n".into()).unwrap();
    assert_eq!(ids_in_order(&split), vec!["a", "b", "n"]);

    let merged = merge_with_previous(&split, &"n".into()).unwrap();
    assert_eq!(ids_in_order(&merged), vec!["a", "b"]);
    assert_eq!(find(&merged, "a").text, "Fo");
    assert_eq!(find(&merged, "b").text, "Yo");
}

#[test]
fn merge_with_previous_goes_into_the_last_visible_descendant() {
    let doc = Document::from_items(vec![
        item("a", "A", 0).with_children(vec![item("a1", "deep", 1)]),
        item("b", "B", 0).with_children(vec![item("b1", "kid", 1)]),
    ]);
    let merged = merge_with_previous(&doc, &"b".into()).unwrap();
    assert_eq!(ids_in_order(&merged), vec!["a", "a1", "b1"]);
    assert_eq!(find(&merged, "a1").text, "deepB");
    assert_eq!(find(&merged, "b1").level, 2);
}

#[test]
fn merge_with_previous_into_parent_keeps_children_in_place() {
    let doc = Document::from_items(vec![item("p", "P", 0).with_children(vec![
        item("t", "T", 1).with_children(vec![item("t1", "t1", 2)]),
        item("s", "S", 1),
    ])]);
    let merged = merge_with_previous(&doc, &"t".into()).unwrap();
    assert_eq!(ids_in_order(&merged), vec!["p", "t1", "s"]);
    assert_eq!(find(&merged, "p").text, "PT");
    assert_eq!(find(&merged, "t1").level, 1);
}

#[test]
fn merge_with_previous_without_previous_is_a_no_op() {
    let doc = nested();
    assert!(merge_with_previous(&doc, &"a".into()).is_none());
    assert!(merge_with_previous(&doc, &"ghost".into()).is_none());
}

#[test]
fn merge_rejects_children_that_would_pass_the_deepest_level() {
    let deep = item("d5", "five", 5);
    let chain = item("d0", "", 0).with_children(vec![item("d1", "", 1).with_children(vec![
        item("d2", "", 2).with_children(vec![item("d3", "", 3).with_children(vec![
            item("d4", "", 4).with_children(vec![deep]),
        ])]),
    ])]);
    let doc = Document::from_items(vec![
        chain,
        item("x", "x", 0).with_children(vec![item("x1", "x1", 1)]),
    ]);
    assert!(merge_with_previous(&doc, &"x".into()).is_none());
}

#[test]
fn merge_with_next_pulls_the_following_item() {
    let doc = Document::from_items(vec![
        item("a", "Hello", 0),
        item("b", " there", 0).with_children(vec![item("b1", "kid", 1)]),
    ]);
    let merged = merge_with_next(&doc, &"a".into()).unwrap();
    assert_eq!(ids_in_order(&merged), vec!["a", "b1"]);
    assert_eq!(find(&merged, "a").text, "Hello there");
    assert_eq!(find(&merged, "b1").level, 1);
}

#[test]
fn merge_with_next_absorbs_the_first_child() {
    let doc = Document::from_items(vec![item("a", "A", 0).with_children(vec![
        item("c1", "1", 1).with_children(vec![item("g", "g", 2)]),
        item("c2", "2", 1),
    ])]);
    let merged = merge_with_next(&doc, &"a".into()).unwrap();
    assert_eq!(ids_in_order(&merged), vec!["a", "g", "c2"]);
    assert_eq!(find(&merged, "a").text, "A1");
    assert_eq!(find(&merged, "g").level, 1);
}

#[test]
fn merge_with_next_from_a_nested_leaf_reaches_the_uncle() {
    let doc = nested();
    let merged = merge_with_next(&doc, &"b".into()).unwrap();
    assert_eq!(ids_in_order(&merged), vec!["a", "b"]);
    assert_eq!(find(&merged, "b").text, "YZ");
    assert!(merge_with_next(&merged, &"b".into()).is_none());
}

#[test]
fn indent_moves_under_previous_sibling() {
    let doc = Document::from_items(vec![
        item("a", "A", 0).with_children(vec![item("a1", "A1", 1)]),
        item("b", "B", 0).with_children(vec![item("b1", "B1", 1)]),
    ]);
    let edited = indent(&doc, &"b".into()).unwrap();
    assert_eq!(edited.items().len(), 1);
    let parent = find(&edited, "a");
    assert_eq!(parent.children.len(), 2);
    assert_eq!(parent.children[1].id.as_str(), "b");
    assert_eq!(find(&edited, "b").level, 1);
    assert_eq!(find(&edited, "b1").level, 2);
    assert!(Arc::ptr_eq(
        &doc.items()[0].children[0],
        &edited.items()[0].children[0]
    ));
}

#[test]
fn indent_first_in_array_is_a_no_op() {
    let doc = nested();
    assert!(indent(&doc, &"a".into()).is_none());
    assert!(indent(&doc, &"b".into()).is_none());
}

#[test]
fn indent_is_rejected_when_a_descendant_would_pass_level_five() {
    let doc = Document::from_items(vec![
        item("p", "", 0),
        item("t", "", 0).with_children(vec![item("t1", "", 1).with_children(vec![
            item("t2", "", 2).with_children(vec![item("t3", "", 3).with_children(vec![
                item("t4", "", 4).with_children(vec![item("t5", "", 5)]),
            ])]),
        ])]),
    ]);
    assert!(indent(&doc, &"t".into()).is_none());
}

#[test]
fn outdent_example_from_nested_document() {
    let doc = nested();
    let edited = outdent(&doc, &"b".into()).unwrap();
    assert_eq!(ids_in_order(&edited), vec!["a", "b", "c"]);
    assert_eq!(edited.items().len(), 3);
    assert_eq!(find(&edited, "b").level, 0);
    assert!(!find(&edited, "a").has_children());
}

#[test]
fn outdent_keeps_following_siblings_with_the_parent() {
    let doc = Document::from_items(vec![item("p", "", 0).with_children(vec![
        item("x", "", 1),
        item("y", "", 1),
    ])]);
    let edited = outdent(&doc, &"x".into()).unwrap();
    assert_eq!(ids_in_order(&edited), vec!["p", "y", "x"]);
    assert_eq!(find(&edited, "p").children.len(), 1);
}

#[test]
fn outdent_of_a_root_item() {
    let flat = Document::from_items(vec![item("a", "", 0)]);
    assert!(outdent(&flat, &"a".into()).is_none());

    let floating = Document::from_items(vec![item("a", "", 2)]);
    let edited = outdent(&floating, &"a".into()).unwrap();
    assert_eq!(find(&edited, "a").level, 1);
}

#[test]
fn indent_then_outdent_restores_level_and_position() {
    let doc = Document::from_items(vec![
        item("a", "A", 0),
        item("b", "B", 0).with_children(vec![item("b1", "B1", 1)]),
    ]);
    let indented = indent(&doc, &"b".into()).unwrap();
    let restored = outdent(&indented, &"b".into()).unwrap();
    assert_eq!(restored, doc);
}

#[test]
fn move_up_and_down_stay_within_the_array() {
    let doc = Document::from_items(vec![
        item("a", "", 0).with_children(vec![item("a1", "", 1), item("a2", "", 1)]),
        item("b", "", 0),
    ]);
    let moved = move_up(&doc, &"a2".into()).unwrap();
    assert_eq!(ids_in_order(&moved), vec!["a", "a2", "a1", "b"]);
    assert!(move_up(&moved, &"a2".into()).is_none());

    let moved = move_down(&doc, &"a".into()).unwrap();
    assert_eq!(ids_in_order(&moved), vec!["b", "a", "a1", "a2"]);
    assert!(move_down(&moved, &"a".into()).is_none());
    assert!(move_down(&doc, &"a2".into()).is_none());
}

#[test]
fn duplicate_copies_content_with_fresh_ids() {
    let doc = nested();
    let mut ids = SequentialIds::new("dup");
    let (edited, copy_id) = duplicate(&doc, &"a".into(), &mut ids).unwrap();

    assert_eq!(ids_in_order(&edited), vec!["a", "b", "dup-1", "dup-2", "c"]);
    assert_eq!(copy_id.as_str(), "dup-1");
    let original = find(&edited, "a");
    let copy = find(&edited, "dup-1");
    assert_eq!(copy.text, original.text);
    assert_eq!(copy.children.len(), original.children.len());
    assert_eq!(copy.children[0].text, original.children[0].text);
    assert_eq!(copy.children[0].level, original.children[0].level);

    let all: Vec<_> = visual_order(&edited).map(|item| item.id.clone()).collect();
    let unique: HashSet<_> = all.iter().cloned().collect();
    assert_eq!(all.len(), unique.len());
}

#[test]
fn delete_subtree_takes_the_children_along() {
    let doc = nested();
    let edited = delete_subtree(&doc, &"a".into()).unwrap();
    assert_eq!(ids_in_order(&edited), vec!["c"]);
    assert!(delete_subtree(&doc, &"ghost".into()).is_none());
}

#[test]
fn delete_single_refuses_items_with_children() {
    let doc = nested();
    assert!(delete_single(&doc, &"a".into()).is_none());
    let edited = delete_single(&doc, &"b".into()).unwrap();
    assert_eq!(ids_in_order(&edited), vec!["a", "c"]);
    assert!(!find(&edited, "a").has_children());
}

#[test]
fn insert_after_and_append_root() {
    let doc = nested();
    let edited = insert_after(&doc, &"b".into(), item("n", "", 1)).unwrap();
    assert_eq!(ids_in_order(&edited), vec!["a", "b", "n", "c"]);
    let edited = append_root(&edited, item("z", "", 0));
    assert_eq!(ids_in_order(&edited), vec!["a", "b", "n", "c", "z"]);
    assert!(insert_after(&doc, &"ghost".into(), item("n", "", 0)).is_none());
}

#[derive(Clone, Debug)]
enum Op {
    Indent(usize),
    Outdent(usize),
    MoveUp(usize),
    MoveDown(usize),
    MergePrevious(usize),
    MergeNext(usize),
    Split(usize),
    Duplicate(usize),
    Delete(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..64).prop_map(Op::Indent),
        (0usize..64).prop_map(Op::Outdent),
        (0usize..64).prop_map(Op::MoveUp),
        (0usize..64).prop_map(Op::MoveDown),
        (0usize..64).prop_map(Op::MergePrevious),
        (0usize..64).prop_map(Op::MergeNext),
        (0usize..64).prop_map(Op::Split),
        (0usize..64).prop_map(Op::Duplicate),
        (0usize..64).prop_map(Op::Delete),
    ]
}

fn target(document: &Document, pick: usize) -> Option<ItemId> {
    let count = document.item_count();
    if count == 0 {
        return None;
    }
    crate::outline::order::nth(document, pick % count).map(|item| item.id.clone())
}

fn apply(document: &Document, op: &Op, ids: &mut SequentialIds) -> Option<Document> {
    match op {
        Op::Indent(pick) => indent(document, &target(document, *pick)?),
        Op::Outdent(pick) => outdent(document, &target(document, *pick)?),
        Op::MoveUp(pick) => move_up(document, &target(document, *pick)?),
        Op::MoveDown(pick) => move_down(document, &target(document, *pick)?),
        Op::MergePrevious(pick) => merge_with_previous(document, &target(document, *pick)?),
        Op::MergeNext(pick) => merge_with_next(document, &target(document, *pick)?),
        Op::Split(pick) => {
            let id = target(document, *pick)?;
            let new_id = ids.mint();
            split_at(document, &id, "a", "b", new_id)
        }
        Op::Duplicate(pick) => {
            duplicate(document, &target(document, *pick)?, ids).map(|(doc, _)| doc)
        }
        Op::Delete(pick) => delete_subtree(document, &target(document, *pick)?),
    }
}

fn manual_preorder(items: &[Arc<Item>], out: &mut Vec<String>) {
    for item in items {
        out.push(item.id.as_str().to_string());
        manual_preorder(&item.children, out);
    }
}

proptest! {
    #[test]
    fn levels_stay_in_bounds(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut ids = SequentialIds::new("p");
        let mut doc = Document::from_items(vec![
            item("r1", "one", 0),
            item("r2", "two", 0),
            item("r3", "three", 0),
        ]);
        for op in &ops {
            if let Some(next) = apply(&doc, op, &mut ids) {
                doc = next;
            }
            for node in visual_order(&doc) {
                prop_assert!(node.level <= MAX_LEVEL);
            }
            let all: Vec<_> = visual_order(&doc).map(|node| node.id.clone()).collect();
            let unique: HashSet<_> = all.iter().cloned().collect();
            prop_assert_eq!(all.len(), unique.len());
        }
    }

    #[test]
    fn visual_order_matches_recursive_walk(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut ids = SequentialIds::new("w");
        let mut doc = Document::from_items(vec![item("r1", "", 0), item("r2", "", 0)]);
        for op in &ops {
            if let Some(next) = apply(&doc, op, &mut ids) {
                doc = next;
            }
        }
        let mut expected = Vec::new();
        manual_preorder(doc.items(), &mut expected);
        prop_assert_eq!(ids_in_order(&doc), expected);
    }
}

//! Undo/redo over whole-document snapshots.
//!
//! Snapshots are cheap because documents share unchanged subtrees, so the
//! history keeps the full tree for every step instead of diffs.

use std::collections::VecDeque;

use crate::outline::Document;

pub const DEFAULT_CAPACITY: usize = 100;

/// Snapshot history with a present value.
///
/// `record` ignores values that are structurally equal to the present one,
/// and values brought back by `undo`/`redo` are never recorded again.
#[derive(Clone, Debug)]
pub struct History<T> {
    past: VecDeque<T>,
    present: T,
    future: Vec<T>,
    capacity: usize,
}

pub type DocumentHistory = History<Document>;

impl<T: Clone + PartialEq> History<T> {
    pub fn new(present: T) -> Self {
        Self::with_capacity(present, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(present: T, capacity: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present,
            future: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Makes `value` the present. Returns `false` when nothing changed.
    pub fn record(&mut self, value: T) -> bool {
        if value == self.present {
            return false;
        }
        let previous = std::mem::replace(&mut self.present, value);
        self.past.push_back(previous);
        while self.past.len() > self.capacity {
            self.past.pop_front();
        }
        self.future.clear();
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push(current);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        true
    }

    /// Drops both stacks, used when the editor switches to another document.
    pub fn reset(&mut self, present: T) {
        self.past.clear();
        self.future.clear();
        self.present = present;
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

//! Keyed, cancellable timers driven by the front-end's tick.
//!
//! Nothing here sleeps or spawns: callers pass the current `Instant` in and
//! get back the keys whose deadline has passed.

use std::time::{Duration, Instant};

use crate::outline::ItemId;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskKey {
    /// Remove an empty item that lost focus, if it is still empty.
    Prune(ItemId),
    /// Hand the current document to the persistence layer.
    Save,
}

#[derive(Clone, Debug)]
struct Task {
    key: TaskKey,
    due: Instant,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    tasks: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `key` for `now + delay`, replacing an earlier task with the
    /// same key.
    pub fn schedule(&mut self, key: TaskKey, now: Instant, delay: Duration) {
        self.cancel(&key);
        self.tasks.push(Task {
            key,
            due: now + delay,
        });
    }

    pub fn cancel(&mut self, key: &TaskKey) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| &task.key != key);
        before != self.tasks.len()
    }

    pub fn is_scheduled(&self, key: &TaskKey) -> bool {
        self.tasks.iter().any(|task| &task.key == key)
    }

    /// Removes and returns every task due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<TaskKey> {
        let mut due: Vec<Task> = Vec::new();
        self.tasks.retain(|task| {
            if task.due <= now {
                due.push(task.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|task| task.due);
        due.into_iter().map(|task| task.key).collect()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.tasks.iter().map(|task| task.due).min()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

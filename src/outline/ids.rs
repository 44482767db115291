use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, stable identifier of one outline item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Mints fresh item ids for operations that create items.
pub trait IdSource {
    fn mint(&mut self) -> ItemId;
}

/// Random v4 UUIDs, used by the application.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn mint(&mut self) -> ItemId {
        ItemId(Uuid::new_v4().to_string())
    }
}

/// Deterministic `prefix-N` ids for tests and benchmarks.
#[derive(Clone, Debug)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdSource for SequentialIds {
    fn mint(&mut self) -> ItemId {
        let id = ItemId(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

impl<T: IdSource + ?Sized> IdSource for Box<T> {
    fn mint(&mut self) -> ItemId {
        (**self).mint()
    }
}

impl<T: IdSource + ?Sized> IdSource for &mut T {
    fn mint(&mut self) -> ItemId {
        (**self).mint()
    }
}

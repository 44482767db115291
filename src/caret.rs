//! Caret position codec.
//!
//! Before a structural edit the caret (and selection anchor) is written down
//! as a path into the item's surface plus an offset. Once the next surface
//! exists the description is resolved against it. When the path no longer
//! exists the placement degrades to the end of the content, then to the
//! nearest text node, then to plain focus.

use crate::outline::ItemId;
use crate::surface::{ItemSurface, SurfaceMap};

pub const DEFAULT_RESTORE_ATTEMPTS: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaretPosition {
    pub path: Vec<usize>,
    pub offset: usize,
    pub at_end: bool,
}

/// Caret and optional selection anchor, both relative to one item surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaretSnapshot {
    pub focus: CaretPosition,
    pub anchor: Option<CaretPosition>,
}

pub fn capture_position(surface: &ItemSurface, offset: usize) -> CaretPosition {
    let (slot, local) = surface.locate_offset(offset);
    CaretPosition {
        path: slot.path.clone(),
        offset: local,
        at_end: offset >= surface.total_len(),
    }
}

pub fn capture(surface: &ItemSurface, caret: usize, anchor: Option<usize>) -> CaretSnapshot {
    CaretSnapshot {
        focus: capture_position(surface, caret),
        anchor: anchor.map(|offset| capture_position(surface, offset)),
    }
}

/// Where a restored caret ended up and how it got there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Exact(usize),
    EndOfContent(usize),
    Nearest(usize),
    FocusOnly,
}

impl Placement {
    pub fn offset(self) -> Option<usize> {
        match self {
            Placement::Exact(offset)
            | Placement::EndOfContent(offset)
            | Placement::Nearest(offset) => Some(offset),
            Placement::FocusOnly => None,
        }
    }
}

pub fn restore(surface: &ItemSurface, position: &CaretPosition) -> Placement {
    if let Some(offset) = surface.absolute_offset(&position.path, position.offset) {
        return Placement::Exact(offset);
    }
    if position.at_end {
        return Placement::EndOfContent(surface.total_len());
    }
    match surface.nearest_slot(&position.path) {
        Some(slot) => Placement::Nearest(slot.start + position.offset.min(slot.len)),
        None => Placement::FocusOnly,
    }
}

/// What the caret should do once the focused item's surface is available.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaretTarget {
    Start,
    End,
    Offset(usize),
    Saved(CaretSnapshot),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedCaret {
    pub caret: Placement,
    pub anchor: Option<Placement>,
}

pub fn resolve(surface: &ItemSurface, target: &CaretTarget) -> ResolvedCaret {
    let caret = match target {
        CaretTarget::Start => Placement::Exact(0),
        CaretTarget::End => Placement::EndOfContent(surface.total_len()),
        CaretTarget::Offset(offset) => {
            if *offset <= surface.total_len() {
                Placement::Exact(*offset)
            } else {
                Placement::Nearest(surface.total_len())
            }
        }
        CaretTarget::Saved(snapshot) => restore(surface, &snapshot.focus),
    };
    let anchor = match target {
        CaretTarget::Saved(CaretSnapshot {
            anchor: Some(anchor),
            ..
        }) => Some(restore(surface, anchor)),
        _ => None,
    };
    ResolvedCaret { caret, anchor }
}

/// A restore waiting for the focused item's surface to show up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRestore {
    item: ItemId,
    target: CaretTarget,
    attempts_left: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RestoreStep {
    Resolved(ResolvedCaret),
    /// The surface is not there yet; try again on the next render.
    Retry,
    GaveUp,
    /// Focus moved to another item before the restore could happen.
    Abandoned,
}

impl PendingRestore {
    pub fn new(item: ItemId, target: CaretTarget, attempts: u32) -> Self {
        Self {
            item,
            target,
            attempts_left: attempts.max(1),
        }
    }

    pub fn item(&self) -> &ItemId {
        &self.item
    }

    pub fn target(&self) -> &CaretTarget {
        &self.target
    }

    pub fn attempts_left(&self) -> u32 {
        self.attempts_left
    }

    /// One attempt against the surfaces of the latest render.
    pub fn attempt(&mut self, surfaces: &SurfaceMap) -> RestoreStep {
        if let Some(surface) = surfaces.get(&self.item) {
            return RestoreStep::Resolved(resolve(surface, &self.target));
        }
        self.attempts_left = self.attempts_left.saturating_sub(1);
        if self.attempts_left == 0 {
            RestoreStep::GaveUp
        } else {
            RestoreStep::Retry
        }
    }
}

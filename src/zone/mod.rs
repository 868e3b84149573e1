//! Zones drawn over the image and the pointer interaction that edits them.
//!
//! - [`RegionDecorator`] owns the live zone set, the active zone and the
//!   in-progress [`ResizeSession`].
//! - [`ZoneEvent`]s are the only thing that crosses into the markup side.

mod decorator;
mod resize;

pub use decorator::{DecoratorOptions, RegionDecorator};
pub use resize::{Axis, HandleKind, ResizeOutcome, ResizeSession, hit_handle};

use std::fmt;

use crate::geometry::{Region, ViewRect};

/// Opaque identity of a zone, assigned when the zone is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(u64);

impl ZoneId {
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "z{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    pub id: ZoneId,
    pub region: Region,
}

/// High-level changes the markup side has to mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneEvent {
    /// An existing zone was resized. Fired even when nothing moved.
    Updated {
        id: ZoneId,
        original: Region,
        updated: Region,
    },
    /// A zone was drawn or duplicated. `closest` is the insertion anchor.
    Added {
        id: ZoneId,
        region: Region,
        closest: Option<Zone>,
    },
    Removed { zone: Zone },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintStyle {
    Outline,
    Active,
    /// Drag handle marker around the grabbed or hovered point.
    Hint,
}

/// One rectangle to draw, already in view space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintOp {
    pub rect: ViewRect,
    pub style: PaintStyle,
}

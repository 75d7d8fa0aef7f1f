// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Events emitted on entities.
//!
//! Emission is queued and delivered before the public [`Scene`](crate::Scene)
//! call that caused it returns. An event goes to its target first and then
//! bubbles up through the target's ancestors. At each entity it reaches
//! listeners registered for its name, then components that list the name in
//! [`Component::events`](crate::Component::events).

use scenery_tree::Vec3;

use crate::entity::EntityId;

/// Event names used by the built-in interaction components.
pub mod names {
    /// Pointer pressed.
    pub const MOUSEDOWN: &str = "mousedown";
    /// Pointer released.
    pub const MOUSEUP: &str = "mouseup";
    /// Pointer click (manual or fuse).
    pub const CLICK: &str = "click";
    /// Cursor started hovering a target.
    pub const MOUSEENTER: &str = "mouseenter";
    /// Cursor stopped hovering a target.
    pub const MOUSELEAVE: &str = "mouseleave";
    /// Emitted on a target right after [`MOUSEENTER`].
    pub const HOVER: &str = "hover";
    /// The raycaster's closest hit, sent on every evaluation that has one.
    pub const INTERSECTION: &str = "intersection";
    /// The raycaster lost its previous closest hit.
    pub const INTERSECTION_CLEARED: &str = "intersectioncleared";

    /// State added to a target while a cursor hovers it.
    pub const STATE_HOVERED: &str = "hovered";
    /// State added to a cursor's entity while it hovers something.
    pub const STATE_HOVERING: &str = "hovering";
}

/// Payload carried by an [`Event`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EventDetail {
    /// No payload.
    #[default]
    None,
    /// A ray hit an entity.
    Intersection {
        /// Entity that was hit.
        el: EntityId,
        /// Distance from the ray origin.
        distance: f64,
        /// World-space hit point.
        point: Vec3,
    },
    /// A previously reported hit is gone.
    IntersectionCleared {
        /// Entity that is no longer hit.
        el: EntityId,
    },
    /// Sent by a cursor. On the cursor's own entity `target` names the hovered
    /// entity; on a target entity `cursor` names the cursor.
    Cursor {
        /// Entity carrying the cursor.
        cursor: EntityId,
        /// Hovered entity, if any.
        target: Option<EntityId>,
    },
}

/// A delivered (or recorded) event.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Event name, e.g. [`names::CLICK`].
    pub name: String,
    /// Entity the event was emitted on.
    pub target: EntityId,
    /// Payload.
    pub detail: EventDetail,
    /// Whether ancestors of `target` also receive it.
    pub bubbles: bool,
}

impl Event {
    /// A bubbling event.
    pub fn new(target: EntityId, name: impl Into<String>, detail: EventDetail) -> Self {
        Self {
            name: name.into(),
            target,
            detail,
            bubbles: true,
        }
    }

    /// Builder: deliver to the target only.
    #[must_use]
    pub fn local(mut self) -> Self {
        self.bubbles = false;
        self
    }
}

/// Handle for removing an event listener.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ListenerId(pub(crate) u64);

pub(crate) struct Listener {
    pub(crate) id: ListenerId,
    pub(crate) name: String,
    pub(crate) callback: Box<dyn FnMut(&Event)>,
}

impl core::fmt::Debug for Listener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

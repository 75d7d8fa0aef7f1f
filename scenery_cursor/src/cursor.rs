// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `cursor` component: applies [`CursorState`] effects to the scene.

use scenery_entity::event::names;
use scenery_entity::{
    Component, ComponentContext, EntityId, Event, EventDetail, Pointer, TimerId,
};
use tracing::debug;

use crate::config::CursorConfig;
use crate::raycaster::Raycaster;
use crate::state::{CursorEffect, CursorState, FuseToken, Recipient};

/// Hover, click, and fuse interaction driven by the `raycaster` on the same
/// entity.
///
/// Targets get the `hovered` state and `mouseenter`/`hover`/`mouseleave`
/// events; the cursor's entity gets `hovering`. Clicks come from a pointer
/// press and release on the same target, or, with `fuse: true` and a
/// positive `timeout`, from hovering one target for `timeout` time units.
#[derive(Debug)]
pub struct Cursor {
    state: CursorState<EntityId>,
    fuse: Option<(FuseToken, TimerId)>,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            state: CursorState::new(CursorConfig::default()),
            fuse: None,
        }
    }
}

impl Cursor {
    /// The hovered entity, if any.
    pub fn intersected(&self) -> Option<EntityId> {
        self.state.target()
    }

    /// The underlying state machine.
    pub fn state(&self) -> &CursorState<EntityId> {
        &self.state
    }

    fn apply(&mut self, ctx: &mut ComponentContext<'_>, effects: Vec<CursorEffect<EntityId>>) {
        let owner = ctx.entity();
        let resolve = |to: Recipient<EntityId>| match to {
            Recipient::Owner => owner,
            Recipient::Target(t) => t,
        };
        for effect in effects {
            match effect {
                CursorEffect::Emit { to, event } => {
                    let target = match to {
                        Recipient::Owner => self.state.target(),
                        Recipient::Target(t) => Some(t),
                    };
                    let detail = EventDetail::Cursor {
                        cursor: owner,
                        target,
                    };
                    ctx.emit_to(resolve(to), event, detail);
                }
                CursorEffect::AddState { to, state } => {
                    if let Err(err) = ctx.scene_mut().add_state(resolve(to), state) {
                        debug!(%err, state, "hover state not added");
                    }
                }
                CursorEffect::RemoveState { to, state } => {
                    if let Err(err) = ctx.scene_mut().remove_state(resolve(to), state) {
                        debug!(%err, state, "hover state not removed");
                    }
                }
                CursorEffect::StartFuse { token, delay } => {
                    let timer = ctx.set_timeout(delay);
                    self.fuse = Some((token, timer));
                }
                CursorEffect::CancelFuse(token) => {
                    if let Some((live, timer)) = self.fuse
                        && live == token
                    {
                        ctx.cancel_timer(timer);
                        self.fuse = None;
                    }
                }
            }
        }
    }
}

impl Component for Cursor {
    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        let effects = self.state.reconfigure(CursorConfig::from_data(ctx.data()));
        self.apply(ctx, effects);
    }

    fn remove(&mut self, ctx: &mut ComponentContext<'_>) {
        let effects = self.state.reset();
        self.apply(ctx, effects);
    }

    fn events(&self) -> &[&'static str] {
        &[names::INTERSECTION, names::INTERSECTION_CLEARED]
    }

    fn on_event(&mut self, ctx: &mut ComponentContext<'_>, event: &Event) {
        // Signals from raycasters further down the tree bubble through here.
        if event.target != ctx.entity() {
            return;
        }
        let before = self.state.target();
        let effects = match event.detail {
            EventDetail::Intersection { el, distance, .. } => {
                self.state.on_intersection(el, distance)
            }
            EventDetail::IntersectionCleared { el } => self.state.on_cleared(el),
            _ => return,
        };
        let after = self.state.target();
        if before != after {
            debug!(cursor = %ctx.entity(), ?before, ?after, "cursor target changed");
        }
        self.apply(ctx, effects);
    }

    fn on_timer(&mut self, ctx: &mut ComponentContext<'_>, timer: TimerId) {
        let Some((token, live)) = self.fuse else {
            return;
        };
        if live != timer {
            return;
        }
        self.fuse = None;
        let Some(target) = self.state.target() else {
            return;
        };
        // The last poll may predate the target moving off the ray.
        let effects = if Raycaster::cast(ctx).map(|c| c.el) == Some(target) {
            self.state.on_fuse_elapsed(token)
        } else {
            debug!(cursor = %ctx.entity(), %target, "fuse target lost before the click");
            self.state.on_cleared(target)
        };
        self.apply(ctx, effects);
    }

    fn on_pointer(&mut self, ctx: &mut ComponentContext<'_>, pointer: Pointer) {
        let effects = match pointer {
            Pointer::Down => self.state.on_pointer_down(),
            Pointer::Up => self.state.on_pointer_up(),
            // Clicks are synthesized from down and up.
            Pointer::Click => return,
        };
        self.apply(ctx, effects);
    }
}

// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `raycaster` component.

use scenery_entity::event::names;
use scenery_entity::{Component, ComponentContext, EntityId, EventDetail, Pointer, TimerId};
use scenery_tree::Vec3;
use tracing::debug;

use crate::CURSOR;
use crate::config::RaycasterConfig;
use crate::tracker::{IntersectionState, TrackSignal, closest_non_self, intersect};

/// Casts from the parent entity through its own entity and reports the
/// nearest other entity hit.
///
/// Evaluation runs every `interval` time units and on every pointer input.
/// Each one emits `intersectioncleared` for a target that stopped being the
/// closest hit, then `intersection` for the current closest hit, both on the
/// raycaster's own entity. Without a `cursor` on the same entity, pointer
/// input is also forwarded to the closest hit as `mousedown`, `mouseup` or
/// `click`.
#[derive(Debug, Default)]
pub struct Raycaster {
    tracker: IntersectionState<EntityId>,
    poll: Option<TimerId>,
    interval: u64,
}

/// The closest non-self hit of one evaluation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Closest {
    pub(crate) el: EntityId,
    distance: f64,
    point: Vec3,
}

impl Raycaster {
    /// The entity currently reported as the closest hit.
    pub fn intersected(&self) -> Option<EntityId> {
        self.tracker.current()
    }

    /// Poll period in effect.
    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Cast from the context's entity without touching the tracker.
    pub(crate) fn cast(ctx: &mut ComponentContext<'_>) -> Option<Closest> {
        ctx.scene_mut().commit();
        let me = ctx.entity();
        let node = ctx.node()?;
        let scene = ctx.scene();
        let tree = scene.tree();
        // Top-level casters shoot from the scene origin.
        let origin = scene
            .parent(me)
            .and_then(|p| scene.node(p))
            .and_then(|n| tree.world_position(n))
            .unwrap_or(Vec3::ZERO);
        let toward = tree.world_position(node)?;
        let hits = intersect(tree, origin, toward, scene.top_level_nodes());
        let hit = closest_non_self(&hits, node)?;
        Some(Closest {
            el: scene.entity_of(hit.node)?,
            distance: hit.distance,
            point: hit.point,
        })
    }

    fn evaluate(&mut self, ctx: &mut ComponentContext<'_>) -> Option<EntityId> {
        let closest = Self::cast(ctx);
        for signal in self.tracker.update(closest.map(|c| (c.el, c.distance))) {
            match signal {
                TrackSignal::Cleared(el) => {
                    ctx.emit(
                        names::INTERSECTION_CLEARED,
                        EventDetail::IntersectionCleared { el },
                    );
                }
                TrackSignal::Intersection { target, distance } => {
                    let point = closest.map_or(Vec3::ZERO, |c| c.point);
                    ctx.emit(
                        names::INTERSECTION,
                        EventDetail::Intersection {
                            el: target,
                            distance,
                            point,
                        },
                    );
                }
            }
        }
        closest.map(|c| c.el)
    }

    fn schedule(&mut self, ctx: &mut ComponentContext<'_>, interval: u64) {
        if let Some(timer) = self.poll.take() {
            ctx.cancel_timer(timer);
        }
        self.interval = interval;
        self.poll = Some(ctx.set_interval(interval));
        debug!(entity = %ctx.entity(), interval, "raycaster polling");
    }
}

impl Component for Raycaster {
    fn init(&mut self, ctx: &mut ComponentContext<'_>) {
        let interval = RaycasterConfig::from_data(ctx.data()).interval;
        self.schedule(ctx, interval);
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        let interval = RaycasterConfig::from_data(ctx.data()).interval;
        if interval != self.interval {
            self.schedule(ctx, interval);
        }
    }

    fn remove(&mut self, ctx: &mut ComponentContext<'_>) {
        if let Some(timer) = self.poll.take() {
            ctx.cancel_timer(timer);
        }
        if let Some(TrackSignal::Cleared(el)) = self.tracker.clear() {
            ctx.emit(
                names::INTERSECTION_CLEARED,
                EventDetail::IntersectionCleared { el },
            );
        }
    }

    fn on_timer(&mut self, ctx: &mut ComponentContext<'_>, timer: TimerId) {
        if self.poll == Some(timer) {
            self.evaluate(ctx);
        }
    }

    fn on_pointer(&mut self, ctx: &mut ComponentContext<'_>, pointer: Pointer) {
        let closest = self.evaluate(ctx);
        if ctx.scene().has_component(ctx.entity(), CURSOR) {
            return;
        }
        let Some(target) = closest else {
            return;
        };
        let name = match pointer {
            Pointer::Down => names::MOUSEDOWN,
            Pointer::Up => names::MOUSEUP,
            Pointer::Click => names::CLICK,
        };
        ctx.emit_to(target, name, EventDetail::None);
    }
}

// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The component capability trait and the context its hooks run in.

use core::any::Any;
use core::fmt::Debug;

use scenery_attr::{AttrValue, Data};
use scenery_tree::NodeId;

use crate::data::ComponentData;
use crate::entity::EntityId;
use crate::event::{Event, EventDetail};
use crate::scene::Scene;
use crate::timer::{TimerId, TimerOwner};

/// Pointer input from the host surface (canvas, controller trigger).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Pointer {
    /// Button pressed.
    Down,
    /// Button released.
    Up,
    /// Click reported by the host.
    Click,
}

/// Behavior attached to an entity under a registered name.
///
/// Every hook has a no-op default. Hooks run with the instance temporarily
/// taken out of its entity, so a hook may freely call back into the scene
/// through [`ComponentContext::scene_mut`], including on its own entity.
pub trait Component: Any + Debug {
    /// Runs once on attach, before the first [`update`](Component::update).
    fn init(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Runs after `init` and whenever the resolved data changes.
    /// [`ComponentContext::previous_data`] holds the data before the change.
    fn update(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Runs once on detach or entity removal.
    fn remove(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Turn a raw attribute into data. Defaults to the style mini-language.
    ///
    /// Not consulted for single-property schemas.
    fn parse(&self, raw: &AttrValue) -> Data {
        scenery_attr::parse(raw)
    }

    /// Serialize data. Defaults to the style mini-language.
    fn stringify(&self, data: &Data) -> String {
        scenery_attr::stringify(data)
    }

    /// Names of events this component wants delivered to
    /// [`on_event`](Component::on_event) when they reach its entity.
    fn events(&self) -> &[&'static str] {
        &[]
    }

    /// An event named in [`events`](Component::events) reached the entity.
    fn on_event(&mut self, _ctx: &mut ComponentContext<'_>, _event: &Event) {}

    /// A timer this component scheduled fired.
    fn on_timer(&mut self, _ctx: &mut ComponentContext<'_>, _timer: TimerId) {}

    /// Host pointer input. Delivered to every attached component.
    fn on_pointer(&mut self, _ctx: &mut ComponentContext<'_>, _pointer: Pointer) {}
}

/// Access to the scene from inside a component hook.
pub struct ComponentContext<'a> {
    pub(crate) scene: &'a mut Scene,
    pub(crate) entity: EntityId,
    pub(crate) name: &'a str,
    pub(crate) data: &'a ComponentData,
}

impl Debug for ComponentContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ComponentContext")
            .field("entity", &self.entity)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ComponentContext<'_> {
    /// The entity this component is attached to.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// The registered name of this component.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Current resolved data.
    pub fn data(&self) -> &Data {
        self.data.current()
    }

    /// Resolved data before the latest change.
    pub fn previous_data(&self) -> &Data {
        self.data.previous()
    }

    /// The scene.
    pub fn scene(&self) -> &Scene {
        &*self.scene
    }

    /// The scene, mutably.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut *self.scene
    }

    /// Scene-graph node of this entity.
    pub fn node(&self) -> Option<NodeId> {
        self.scene.node(self.entity)
    }

    /// Current virtual time.
    pub fn now(&self) -> u64 {
        self.scene.now()
    }

    /// Emit a bubbling event on this entity.
    pub fn emit(&mut self, name: &str, detail: EventDetail) {
        self.scene.enqueue(Event::new(self.entity, name, detail));
    }

    /// Emit a bubbling event on another entity. Stale targets are ignored.
    pub fn emit_to(&mut self, target: EntityId, name: &str, detail: EventDetail) {
        if self.scene.is_alive(target) {
            self.scene.enqueue(Event::new(target, name, detail));
        }
    }

    /// Run [`on_timer`](Component::on_timer) once, `delay` time units from now.
    pub fn set_timeout(&mut self, delay: u64) -> TimerId {
        let owner = self.owner();
        self.scene.scheduler.set_timeout(owner, delay)
    }

    /// Run [`on_timer`](Component::on_timer) every `period` time units.
    pub fn set_interval(&mut self, period: u64) -> TimerId {
        let owner = self.owner();
        self.scene.scheduler.set_interval(owner, period)
    }

    /// Cancel a pending timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel_timer(&mut self, timer: TimerId) -> bool {
        self.scene.scheduler.cancel(timer)
    }

    fn owner(&self) -> TimerOwner {
        TimerOwner {
            entity: self.entity,
            component: self.name.into(),
        }
    }
}

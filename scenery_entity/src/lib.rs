// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scenery Entity: declarative entity–component scenes.
//!
//! ## Overview
//!
//! A [`Scene`] holds entities. Each entity owns a node in a
//! [`scenery_tree::Tree`], a set of attributes, an ordered mixin list, string
//! states, and the components those attributes and mixins name.
//!
//! Components are registered by name in a [`ComponentRegistry`] together with
//! a [`Schema`] of typed defaults and dependencies. Setting an attribute whose
//! name is registered attaches the component; its data is resolved from three
//! layers, low to high precedence:
//!
//! 1. the schema defaults,
//! 2. the entity's mixins, first listed lowest,
//! 3. the attribute set directly on the entity.
//!
//! Each layer is coerced to the schema's types before it is applied, so a
//! malformed value falls back to the layer below.
//!
//! ## Lifecycle
//!
//! Attach runs [`Component::init`] once and then [`Component::update`]. Later
//! changes re-resolve the data and run `update` only if the result differs
//! from the previous data. Detach (attribute removal, mixin change, or entity
//! removal) runs [`Component::remove`] once and cancels the component's timers.
//!
//! ## Events and time
//!
//! Hooks emit events through their [`ComponentContext`]. Events are queued and
//! delivered before the public call that caused them returns. Time is virtual:
//! the host calls [`Scene::advance_to`] or [`Scene::advance_by`], and due timers
//! fire in order.
//!
//! ## Example
//!
//! ```
//! use scenery_attr::Value;
//! use scenery_entity::{Component, ComponentContext, ComponentRegistry, Scene, Schema};
//!
//! #[derive(Debug, Default)]
//! struct Spin {
//!     updates: u32,
//! }
//!
//! impl Component for Spin {
//!     fn update(&mut self, _ctx: &mut ComponentContext<'_>) {
//!         self.updates += 1;
//!     }
//! }
//!
//! let mut registry = ComponentRegistry::with_builtins();
//! registry
//!     .register::<Spin>("spin", Schema::new().property("speed", 1.0).depends_on("rotation"))
//!     .unwrap();
//! let mut scene = Scene::new(registry);
//! let e = scene.create_entity(None).unwrap();
//!
//! // `spin` needs `rotation` first.
//! assert!(scene.set_attribute(e, "spin", "speed: 2").is_err());
//! scene.set_attribute(e, "rotation", "0 45 0").unwrap();
//! scene.set_attribute(e, "spin", "speed: 2").unwrap();
//!
//! // Equal data does not re-run `update`.
//! scene.set_attribute(e, "spin", "speed: 2.0").unwrap();
//! assert_eq!(scene.component::<Spin>(e, "spin").unwrap().updates, 1);
//! assert_eq!(scene.get_data(e, "spin").unwrap()["speed"], Value::Number(2.0));
//! ```

mod component;
mod components;
pub mod data;
mod entity;
mod error;
pub mod event;
mod lifecycle;
mod registry;
mod scene;
mod schema;
pub mod timer;

pub use component::{Component, ComponentContext, Pointer};
pub use components::{Geometry, Position, Rotation, Scale, Visible};
pub use entity::EntityId;
pub use error::{Result, SceneError};
pub use event::{Event, EventDetail, ListenerId};
pub use lifecycle::LifecycleState;
pub use registry::ComponentRegistry;
pub use scene::{Scene, SceneConfig};
pub use schema::{Schema, VALUE_KEY};
pub use timer::{Scheduler, TimerId, TimerOwner};

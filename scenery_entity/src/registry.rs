// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Name-keyed catalog of component kinds.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::component::Component;
use crate::components;
use crate::error::{Result, SceneError};
use crate::schema::Schema;

type Factory = Box<dyn Fn() -> Box<dyn Component>>;

struct Registration {
    schema: Schema,
    factory: Factory,
}

/// Registered component kinds, each with a schema and a constructor.
#[derive(Default)]
pub struct ComponentRegistry {
    entries: FxHashMap<String, Registration>,
}

impl core::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ComponentRegistry")
            .field("components", &names)
            .finish()
    }
}

impl ComponentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the transform and geometry components
    /// (`position`, `rotation`, `scale`, `visible`, `geometry`).
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        components::register(&mut registry);
        registry
    }

    /// Register a component built with `Default`.
    pub fn register<C: Component + Default>(
        &mut self,
        name: impl Into<String>,
        schema: Schema,
    ) -> Result<()> {
        self.register_with(name, schema, || Box::new(C::default()))
    }

    /// Register a component with an explicit constructor.
    pub fn register_with<F>(&mut self, name: impl Into<String>, schema: Schema, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn Component> + 'static,
    {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(SceneError::DuplicateComponent(name));
        }
        schema
            .validate(&name)
            .map_err(|reason| SceneError::InvalidSchema {
                component: name.clone(),
                reason,
            })?;
        self.insert(name, schema, Box::new(factory));
        Ok(())
    }

    /// Insert without validation. Callers guarantee a fresh name and a valid schema.
    pub(crate) fn insert(&mut self, name: String, schema: Schema, factory: Factory) {
        debug!(component = %name, "component registered");
        self.entries.insert(name, Registration { schema, factory });
    }

    /// True when `name` is a registered component.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Schema of a registered component.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.entries.get(name).map(|r| &r.schema)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn create(&self, name: &str) -> Option<Box<dyn Component>> {
        self.entries.get(name).map(|r| (r.factory)())
    }
}

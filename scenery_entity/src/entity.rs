// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entity handles and per-entity storage.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use scenery_attr::AttrValue;
use scenery_tree::NodeId;

use crate::lifecycle::ComponentInstance;

/// Identifier for an entity in a [`Scene`](crate::Scene).
///
/// Like scene-graph node ids, this is a slot index plus a generation counter.
/// Removing an entity makes every copy of its id stale, and a reused slot gets a
/// new generation, so a stale id never addresses a different live entity.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EntityId(u32, u32);

impl EntityId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}v{}", self.0, self.1)
    }
}

/// A component attached to an entity, in attach order.
///
/// `instance` is `None` while one of the component's hooks is running.
#[derive(Debug)]
pub(crate) struct ComponentSlot {
    pub(crate) name: String,
    pub(crate) instance: Option<ComponentInstance>,
    // Inputs changed while a hook held the instance; resolve again on return.
    pub(crate) stale: bool,
}

#[derive(Debug)]
pub(crate) struct EntityRecord {
    pub(crate) generation: u32,
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,
    pub(crate) node: NodeId,
    pub(crate) attributes: BTreeMap<String, AttrValue>,
    pub(crate) mixins: Vec<String>,
    pub(crate) components: Vec<ComponentSlot>,
    pub(crate) states: BTreeSet<String>,
}

impl EntityRecord {
    pub(crate) fn new(generation: u32, parent: Option<EntityId>, node: NodeId) -> Self {
        Self {
            generation,
            parent,
            children: Vec::new(),
            node,
            attributes: BTreeMap::new(),
            mixins: Vec::new(),
            components: Vec::new(),
            states: BTreeSet::new(),
        }
    }

    pub(crate) fn slot(&self, name: &str) -> Option<&ComponentSlot> {
        self.components.iter().find(|s| s.name == name)
    }

    pub(crate) fn slot_mut(&mut self, name: &str) -> Option<&mut ComponentSlot> {
        self.components.iter_mut().find(|s| s.name == name)
    }

    pub(crate) fn has_component(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shows_slot_and_generation() {
        let id = EntityId::new(4, 2);
        assert_eq!(id.to_string(), "entity#4v2");
        assert_eq!(id.idx(), 4);
        assert_eq!(id.generation(), 2);
    }
}

// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene: entities, their components, events, and time.

use std::collections::{BTreeSet, VecDeque};

use rustc_hash::FxHashMap;
use scenery_attr::{AttrValue, Data, Mixin, resolve_mixins};
use scenery_tree::{LocalNode, NodeId, Tree};
use tracing::{debug, error, trace, warn};

use crate::component::{Component, ComponentContext, Pointer};
use crate::data;
use crate::entity::{ComponentSlot, EntityId, EntityRecord};
use crate::error::{Result, SceneError};
use crate::event::{Event, EventDetail, Listener, ListenerId};
use crate::lifecycle::{ComponentInstance, LifecycleState};
use crate::registry::ComponentRegistry;
use crate::schema::{Schema, VALUE_KEY};
use crate::timer::{Scheduler, TimerId, TimerOwner};

/// Scene-wide settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneConfig {
    /// Keep a log of every delivered event (see [`Scene::events`]).
    pub record_events: bool,
    /// Upper bound on events delivered by one public call. Anything beyond it
    /// is dropped with an error log, which stops handlers that re-emit forever.
    pub max_dispatch: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            record_events: false,
            max_dispatch: 10_000,
        }
    }
}

impl SceneConfig {
    /// Default settings with the event log turned on.
    pub fn recording() -> Self {
        Self {
            record_events: true,
            ..Self::default()
        }
    }
}

/// Entities, components, mixins, events, the scene graph, and the clock.
///
/// Every public mutating call is synchronous from the caller's point of view:
/// events emitted while it runs (including by component hooks) are delivered,
/// and the scene graph is committed, before it returns.
pub struct Scene {
    config: SceneConfig,
    registry: ComponentRegistry,
    tree: Tree,
    root: NodeId,
    entities: Vec<Option<EntityRecord>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    owners: FxHashMap<NodeId, EntityId>,
    mixins: FxHashMap<String, Mixin>,
    listeners: FxHashMap<EntityId, Vec<Listener>>,
    next_listener: u64,
    pub(crate) scheduler: Scheduler,
    queue: VecDeque<Event>,
    log: Vec<Event>,
    depth: u32,
    draining: bool,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive = self.entities.iter().filter(|e| e.is_some()).count();
        f.debug_struct("Scene")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("entities_alive", &alive)
            .field("mixins", &self.mixins.len())
            .field("tree", &self.tree)
            .field("scheduler", &self.scheduler)
            .field("logged_events", &self.log.len())
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// An empty scene using `registry` for component lookups.
    pub fn new(registry: ComponentRegistry) -> Self {
        Self::with_config(registry, SceneConfig::default())
    }

    /// An empty scene with explicit settings.
    pub fn with_config(registry: ComponentRegistry, config: SceneConfig) -> Self {
        let mut tree = Tree::new();
        let root = tree.insert(None, LocalNode::default());
        Self {
            config,
            registry,
            tree,
            root,
            entities: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            owners: FxHashMap::default(),
            mixins: FxHashMap::default(),
            listeners: FxHashMap::default(),
            next_listener: 0,
            scheduler: Scheduler::new(),
            queue: VecDeque::new(),
            log: Vec::new(),
            depth: 0,
            draining: false,
        }
    }

    /// Settings in effect.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The component registry.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Register another component kind. See [`ComponentRegistry::register`].
    pub fn register_component<C: Component + Default>(
        &mut self,
        name: impl Into<String>,
        schema: Schema,
    ) -> Result<()> {
        self.registry.register::<C>(name, schema)
    }

    // --- entities ---

    /// Create an entity under `parent`, or at the top level.
    pub fn create_entity(&mut self, parent: Option<EntityId>) -> Result<EntityId> {
        let parent_node = match parent {
            Some(p) => self.record(p).ok_or(SceneError::StaleEntity(p))?.node,
            None => self.root,
        };
        let node = self.tree.insert(Some(parent_node), LocalNode::default());
        let id = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.entities[idx] = Some(EntityRecord::new(generation, parent, node));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "EntityId uses 32-bit indices by design."
            )]
            EntityId::new(idx as u32, generation)
        } else {
            self.entities.push(Some(EntityRecord::new(1, parent, node)));
            self.generations.push(1);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "EntityId uses 32-bit indices by design."
            )]
            EntityId::new((self.entities.len() - 1) as u32, 1)
        };
        if let Some(p) = parent.and_then(|p| self.record_mut(p)) {
            p.children.push(id);
        }
        self.owners.insert(node, id);
        self.tree.commit();
        debug!(%id, "entity created");
        Ok(id)
    }

    /// Remove an entity and its descendants. Every component is detached
    /// (running `remove`), and their timers and listeners are dropped.
    pub fn remove_entity(&mut self, id: EntityId) -> Result<()> {
        self.batch(|s| s.remove_entity_inner(id))
    }

    /// True when `id` addresses a live entity.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.record(id).is_some()
    }

    /// Live entities in slot order.
    pub fn entities(&self) -> Vec<EntityId> {
        self.entities
            .iter()
            .enumerate()
            .filter_map(|(i, e)| {
                e.as_ref().map(|e| {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "EntityId uses 32-bit indices by design."
                    )]
                    EntityId::new(i as u32, e.generation)
                })
            })
            .collect()
    }

    /// Parent entity.
    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.record(id).and_then(|r| r.parent)
    }

    /// Child entities in creation order.
    pub fn children(&self, id: EntityId) -> &[EntityId] {
        self.record(id).map(|r| r.children.as_slice()).unwrap_or(&[])
    }

    /// Scene-graph node of an entity.
    pub fn node(&self, id: EntityId) -> Option<NodeId> {
        self.record(id).map(|r| r.node)
    }

    /// The entity owning `node`, or the nearest ancestor node that has one.
    pub fn entity_of(&self, node: NodeId) -> Option<EntityId> {
        let mut at = Some(node);
        while let Some(n) = at {
            if let Some(id) = self.owners.get(&n) {
                return Some(*id);
            }
            at = self.tree.parent(n);
        }
        None
    }

    // --- scene graph ---

    /// The scene graph.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The scene graph, mutably. Changes are committed at the end of the next
    /// public scene call, or explicitly with [`Scene::commit`].
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// Refresh world transforms now.
    pub fn commit(&mut self) {
        self.tree.commit();
    }

    /// Root node that top-level entities hang under.
    pub fn root_node(&self) -> NodeId {
        self.root
    }

    /// Nodes of top-level entities.
    pub fn top_level_nodes(&self) -> &[NodeId] {
        self.tree.children(self.root)
    }

    // --- attributes and components ---

    /// Set an attribute. A registered component name attaches the component
    /// (or refreshes it if already attached); any other name is kept as a plain
    /// attribute.
    ///
    /// Attaching fails with [`SceneError::MissingDependency`] if a component the
    /// schema depends on is not attached; nothing is stored in that case.
    pub fn set_attribute(
        &mut self,
        id: EntityId,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> Result<()> {
        let value = value.into();
        self.batch(|s| s.set_attribute_inner(id, name, value))
    }

    /// Remove an attribute. For a component, data falls back to mixins if any
    /// still carry it; otherwise the component is detached.
    pub fn remove_attribute(&mut self, id: EntityId, name: &str) -> Result<()> {
        self.batch(|s| s.remove_attribute_inner(id, name))
    }

    /// The raw attribute as set on the entity (mixin contributions excluded).
    pub fn get_attribute(&self, id: EntityId, name: &str) -> Option<&AttrValue> {
        self.record(id)?.attributes.get(name)
    }

    /// True when the component is attached.
    pub fn has_component(&self, id: EntityId, name: &str) -> bool {
        self.record(id).is_some_and(|r| r.has_component(name))
    }

    /// Attached component names in attach order.
    pub fn component_names(&self, id: EntityId) -> Vec<&str> {
        self.record(id)
            .map(|r| r.components.iter().map(|s| s.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// A copy of a component's resolved data.
    pub fn get_data(&self, id: EntityId, name: &str) -> Result<Data> {
        Ok(self.instance(id, name)?.data.current().clone())
    }

    /// Lifecycle state of an attached component.
    pub fn lifecycle_state(&self, id: EntityId, name: &str) -> Result<LifecycleState> {
        Ok(self.instance(id, name)?.state)
    }

    /// Serialize a component's resolved data in the attribute mini-language.
    pub fn stringify_component(&self, id: EntityId, name: &str) -> Result<String> {
        let instance = self.instance(id, name)?;
        let data = instance.data.current();
        let single = self.registry.schema(name).is_some_and(Schema::is_single);
        Ok(match data.get(VALUE_KEY) {
            Some(value) if single => value.to_string(),
            _ => instance.behavior.stringify(data),
        })
    }

    /// Borrow a component's behavior as its concrete type.
    pub fn component<T: Component>(&self, id: EntityId, name: &str) -> Option<&T> {
        let behavior: &dyn Component = self.instance(id, name).ok()?.behavior.as_ref();
        let any: &dyn core::any::Any = behavior;
        any.downcast_ref::<T>()
    }

    // --- mixins ---

    /// Add or replace a mixin. Entities already listing it are re-resolved,
    /// which may attach or detach components.
    pub fn register_mixin(&mut self, mixin: Mixin) {
        let id = mixin.id().to_owned();
        debug!(mixin = %id, "mixin registered");
        self.mixins.insert(id.clone(), mixin);
        self.batch(|s| s.sync_users_of(&id));
    }

    /// Remove a mixin, re-resolving entities that list it. The id stays in
    /// their lists and is skipped until a mixin with that id is registered again.
    pub fn remove_mixin(&mut self, id: &str) -> Option<Mixin> {
        let removed = self.mixins.remove(id)?;
        self.batch(|s| s.sync_users_of(id));
        Some(removed)
    }

    /// A registered mixin.
    pub fn mixin(&self, id: &str) -> Option<&Mixin> {
        self.mixins.get(id)
    }

    /// Replace the entity's ordered mixin list (first listed = lowest precedence).
    ///
    /// Components introduced by the new mixins are attached; components no
    /// longer carried by any source are detached. Fails without changing
    /// anything if an introduced component's dependency would be missing.
    pub fn set_mixins<I, S>(&mut self, id: EntityId, ids: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        self.batch(|s| s.set_mixins_inner(id, ids))
    }

    /// The entity's mixin list.
    pub fn mixins(&self, id: EntityId) -> &[String] {
        self.record(id).map(|r| r.mixins.as_slice()).unwrap_or(&[])
    }

    // --- states ---

    /// Add a state. Returns `false` if it was already present.
    pub fn add_state(&mut self, id: EntityId, state: &str) -> Result<bool> {
        let rec = self.record_mut(id).ok_or(SceneError::StaleEntity(id))?;
        Ok(rec.states.insert(state.to_owned()))
    }

    /// Remove a state. Returns `false` if it was absent.
    pub fn remove_state(&mut self, id: EntityId, state: &str) -> Result<bool> {
        let rec = self.record_mut(id).ok_or(SceneError::StaleEntity(id))?;
        Ok(rec.states.remove(state))
    }

    /// True when the entity is live and has the state.
    pub fn is_state(&self, id: EntityId, state: &str) -> bool {
        self.record(id).is_some_and(|r| r.states.contains(state))
    }

    /// The entity's states, in name order.
    pub fn states(&self, id: EntityId) -> Option<&BTreeSet<String>> {
        self.record(id).map(|r| &r.states)
    }

    // --- events ---

    /// Emit a bubbling event on `target`.
    pub fn emit(&mut self, target: EntityId, name: &str, detail: EventDetail) -> Result<()> {
        self.dispatch(Event::new(target, name, detail))
    }

    /// Emit a prepared event (e.g. a non-bubbling one from [`Event::local`]).
    pub fn dispatch(&mut self, event: Event) -> Result<()> {
        if !self.is_alive(event.target) {
            return Err(SceneError::StaleEntity(event.target));
        }
        self.batch(|s| s.enqueue(event));
        Ok(())
    }

    /// Call `callback` for every event named `name` that reaches `target`,
    /// directly or by bubbling.
    pub fn add_event_listener<F>(&mut self, target: EntityId, name: &str, callback: F) -> Result<ListenerId>
    where
        F: FnMut(&Event) + 'static,
    {
        if !self.is_alive(target) {
            return Err(SceneError::StaleEntity(target));
        }
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.entry(target).or_default().push(Listener {
            id,
            name: name.to_owned(),
            callback: Box::new(callback),
        });
        Ok(id)
    }

    /// Remove a listener. Returns `false` if it was not registered on `target`.
    pub fn remove_event_listener(&mut self, target: EntityId, listener: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(&target) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| l.id != listener);
        before != list.len()
    }

    /// Delivered events, oldest first. Empty unless
    /// [`SceneConfig::record_events`] is set.
    pub fn events(&self) -> &[Event] {
        &self.log
    }

    /// Take the event log, leaving it empty.
    pub fn take_events(&mut self) -> Vec<Event> {
        core::mem::take(&mut self.log)
    }

    /// Logged events named `name` whose target is `target`.
    pub fn events_for<'a>(
        &'a self,
        target: EntityId,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Event> + 'a {
        self.log
            .iter()
            .filter(move |e| e.target == target && e.name == name)
    }

    // --- input and time ---

    /// Deliver host pointer input to every attached component.
    pub fn pointer(&mut self, pointer: Pointer) {
        // One batch per component, so events a hook emits are delivered
        // before the next component sees the input.
        for id in self.entities() {
            for name in self.slot_names(id) {
                self.batch(|s| s.with_component(id, &name, |c, ctx| c.on_pointer(ctx, pointer)));
            }
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    /// Move time to `t`, firing every timer due on the way. Never moves backward.
    pub fn advance_to(&mut self, t: u64) {
        while let Some((timer, owner)) = self.scheduler.pop_due(t) {
            self.batch(|s| s.fire_timer(timer, &owner));
        }
        self.scheduler.set_now(t);
    }

    /// Move time forward by `delta`.
    pub fn advance_by(&mut self, delta: u64) {
        self.advance_to(self.now().saturating_add(delta));
    }

    // --- internals ---

    fn record(&self, id: EntityId) -> Option<&EntityRecord> {
        let rec = self.entities.get(id.idx())?.as_ref()?;
        (rec.generation == id.generation()).then_some(rec)
    }

    fn record_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        let rec = self.entities.get_mut(id.idx())?.as_mut()?;
        (rec.generation == id.generation()).then_some(rec)
    }

    fn instance(&self, id: EntityId, name: &str) -> Result<&ComponentInstance> {
        let rec = self.record(id).ok_or(SceneError::StaleEntity(id))?;
        rec.slot(name)
            .and_then(|s| s.instance.as_ref())
            .ok_or_else(|| SceneError::NotAttached {
                entity: id,
                component: name.to_owned(),
            })
    }

    fn slot_names(&self, id: EntityId) -> Vec<String> {
        self.record(id)
            .map(|r| r.components.iter().map(|s| s.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Run `f` as one public operation: deliver queued events and commit the
    /// scene graph once the outermost operation finishes.
    fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        if self.depth == 0 {
            self.tree.commit();
            self.flush();
        }
        out
    }

    pub(crate) fn enqueue(&mut self, event: Event) {
        trace!(event = %event.name, target = %event.target, "event queued");
        self.queue.push_back(event);
    }

    fn flush(&mut self) {
        if self.draining {
            return;
        }
        self.draining = true;
        let mut delivered = 0_usize;
        while let Some(event) = self.queue.pop_front() {
            delivered += 1;
            if delivered > self.config.max_dispatch {
                error!(
                    dropped = self.queue.len() + 1,
                    max = self.config.max_dispatch,
                    "event cascade exceeded max_dispatch"
                );
                self.queue.clear();
                break;
            }
            self.deliver(&event);
        }
        self.tree.commit();
        self.draining = false;
    }

    fn deliver(&mut self, event: &Event) {
        if !self.is_alive(event.target) {
            trace!(event = %event.name, target = %event.target, "event target gone");
            return;
        }
        if self.config.record_events {
            self.log.push(event.clone());
        }
        let mut at = Some(event.target);
        while let Some(current) = at {
            if let Some(list) = self.listeners.get_mut(&current) {
                for l in list.iter_mut().filter(|l| l.name == event.name) {
                    (l.callback)(event);
                }
            }
            let handlers: Vec<String> = self
                .record(current)
                .map(|r| {
                    r.components
                        .iter()
                        .filter(|s| {
                            s.instance.as_ref().is_some_and(|i| {
                                i.behavior.events().iter().any(|n| *n == event.name)
                            })
                        })
                        .map(|s| s.name.clone())
                        .collect()
                })
                .unwrap_or_default();
            for name in handlers {
                self.with_component(current, &name, |c, ctx| c.on_event(ctx, event));
            }
            if !event.bubbles {
                break;
            }
            at = self.parent(current);
        }
    }

    fn fire_timer(&mut self, timer: TimerId, owner: &TimerOwner) {
        self.tree.commit();
        trace!(?timer, entity = %owner.entity, component = %owner.component, "timer fired");
        let delivered =
            self.with_component(owner.entity, &owner.component, |c, ctx| c.on_timer(ctx, timer));
        if !delivered {
            trace!(?timer, "timer owner gone");
        }
    }

    fn remove_entity_inner(&mut self, id: EntityId) -> Result<()> {
        let rec = self.record(id).ok_or(SceneError::StaleEntity(id))?;
        let children = rec.children.clone();
        let names: Vec<String> = rec.components.iter().rev().map(|s| s.name.clone()).collect();
        for child in children {
            self.remove_entity_inner(child)?;
        }
        for name in names {
            self.detach(id, &name);
        }
        self.scheduler.cancel_owned_by(id, None);
        self.listeners.remove(&id);
        let Some(rec) = self.entities.get_mut(id.idx()).and_then(Option::take) else {
            return Ok(());
        };
        if let Some(p) = rec.parent.and_then(|p| self.record_mut(p)) {
            p.children.retain(|c| *c != id);
        }
        self.owners.remove(&rec.node);
        self.tree.remove(rec.node);
        self.free_list.push(id.idx());
        debug!(%id, "entity removed");
        Ok(())
    }

    fn set_attribute_inner(&mut self, id: EntityId, name: &str, value: AttrValue) -> Result<()> {
        let registered = self.registry.contains(name);
        let rec = self.record_mut(id).ok_or(SceneError::StaleEntity(id))?;
        if !registered {
            trace!(%id, attribute = name, "plain attribute set");
            rec.attributes.insert(name.to_owned(), value);
            return Ok(());
        }
        if rec.has_component(name) {
            rec.attributes.insert(name.to_owned(), value);
            self.refresh(id, name);
            return Ok(());
        }
        self.attach(id, name, Some(value))
    }

    fn remove_attribute_inner(&mut self, id: EntityId, name: &str) -> Result<()> {
        let registered = self.registry.contains(name);
        let rec = self.record_mut(id).ok_or(SceneError::StaleEntity(id))?;
        if !registered {
            rec.attributes.remove(name);
            return Ok(());
        }
        if !rec.has_component(name) {
            return Err(SceneError::NotAttached {
                entity: id,
                component: name.to_owned(),
            });
        }
        rec.attributes.remove(name);
        if self.mixin_carries(id, name) {
            self.refresh(id, name);
        } else {
            self.detach(id, name);
        }
        Ok(())
    }

    fn mixin_carries(&self, id: EntityId, component: &str) -> bool {
        self.record(id).is_some_and(|r| {
            r.mixins
                .iter()
                .filter_map(|m| self.mixins.get(m))
                .any(|m| m.get(component).is_some())
        })
    }

    fn check_dependencies(&self, id: EntityId, name: &str) -> Result<()> {
        let rec = self.record(id).ok_or(SceneError::StaleEntity(id))?;
        self.require(id, name, |dep| rec.has_component(dep))
    }

    /// Fails with the first dependency of `name` that `present` rejects.
    fn require(&self, id: EntityId, name: &str, present: impl Fn(&str) -> bool) -> Result<()> {
        let Some(schema) = self.registry.schema(name) else {
            return Ok(());
        };
        match schema.dependencies().iter().find(|dep| !present(dep)) {
            Some(dep) => Err(SceneError::MissingDependency {
                entity: id,
                component: name.to_owned(),
                dependency: dep.clone(),
            }),
            None => Ok(()),
        }
    }

    fn attach(&mut self, id: EntityId, name: &str, direct: Option<AttrValue>) -> Result<()> {
        self.check_dependencies(id, name)?;
        let Some(behavior) = self.registry.create(name) else {
            return Ok(());
        };
        let rec = self.record_mut(id).ok_or(SceneError::StaleEntity(id))?;
        if let Some(value) = direct {
            rec.attributes.insert(name.to_owned(), value);
        }
        rec.components.push(ComponentSlot {
            name: name.to_owned(),
            instance: None,
            stale: false,
        });

        let mut instance = ComponentInstance::new(name, behavior);
        let resolved = self.resolve_with(id, name, instance.behavior.as_ref());
        instance.data.initialize(resolved.unwrap_or_default());
        debug!(%id, component = name, "component attached");
        self.run_hook(id, &mut instance, |c, ctx| c.init(ctx));
        instance.state = LifecycleState::Initialized;
        self.run_hook(id, &mut instance, |c, ctx| c.update(ctx));
        self.restore(id, instance);
        Ok(())
    }

    fn detach(&mut self, id: EntityId, name: &str) {
        let Some(rec) = self.record_mut(id) else {
            return;
        };
        let Some(pos) = rec.components.iter().position(|s| s.name == name) else {
            return;
        };
        let slot = rec.components.remove(pos);
        match slot.instance {
            Some(mut instance) => self.finish_removal(id, &mut instance),
            // A hook holds it; `restore` finishes the removal.
            None => trace!(%id, component = name, "detach deferred to running hook"),
        }
    }

    fn finish_removal(&mut self, id: EntityId, instance: &mut ComponentInstance) {
        self.scheduler.cancel_owned_by(id, Some(&instance.name));
        if instance.state == LifecycleState::Initialized {
            self.run_hook(id, instance, |c, ctx| c.remove(ctx));
        }
        instance.state = LifecycleState::Removed;
        debug!(%id, component = %instance.name, "component removed");
    }

    /// Re-resolve a component's data and run `update` if it changed.
    fn refresh(&mut self, id: EntityId, name: &str) {
        let state = match self.record_mut(id).and_then(|r| r.slot_mut(name)) {
            None => return,
            Some(slot) => match slot.instance.as_ref() {
                Some(instance) => instance.state,
                None => {
                    slot.stale = true;
                    return;
                }
            },
        };
        if state != LifecycleState::Initialized {
            return;
        }
        let Some(next) = self
            .instance(id, name)
            .ok()
            .and_then(|i| self.resolve_with(id, name, i.behavior.as_ref()))
        else {
            return;
        };
        let changed = self
            .record_mut(id)
            .and_then(|r| r.slot_mut(name))
            .and_then(|s| s.instance.as_mut())
            .is_some_and(|i| i.data.update_attributes(next));
        if changed {
            self.with_component(id, name, |c, ctx| c.update(ctx));
        } else {
            trace!(%id, component = name, "update suppressed");
        }
    }

    fn resolve_with(&self, id: EntityId, name: &str, behavior: &dyn Component) -> Option<Data> {
        let schema = self.registry.schema(name)?;
        let rec = self.record(id)?;
        let parse = |raw: &AttrValue| {
            if schema.is_single() {
                Schema::parse_single(raw)
            } else {
                behavior.parse(raw)
            }
        };
        let sources = rec.mixins.iter().filter_map(|m| self.mixins.get(m));
        let mixin_layer = resolve_mixins(sources, name, parse);
        let direct = rec.attributes.get(name).map(parse);
        Some(data::resolve(schema, mixin_layer, direct))
    }

    fn set_mixins_inner(&mut self, id: EntityId, ids: Vec<String>) -> Result<()> {
        let rec = self.record(id).ok_or(SceneError::StaleEntity(id))?;
        // Components attached once the call is done: carried by the new
        // mixins or set directly.
        let mut after = self.carried_components(&ids);
        for name in rec.attributes.keys() {
            if self.registry.contains(name) && !after.contains(name) {
                after.push(name.clone());
            }
        }
        for name in after.iter().filter(|n| !rec.has_component(n)) {
            self.require(id, name, |dep| after.iter().any(|a| a == dep))?;
        }
        if let Some(rec) = self.record_mut(id) {
            rec.mixins = ids;
        }
        self.sync_components(id)
    }

    fn sync_users_of(&mut self, mixin: &str) {
        let users: Vec<EntityId> = self
            .entities()
            .into_iter()
            .filter(|e| self.mixins(*e).iter().any(|m| m == mixin))
            .collect();
        for id in users {
            if let Err(err) = self.sync_components(id) {
                warn!(%id, %mixin, %err, "mixin component not attached");
            }
        }
    }

    /// Registered components carried by the given mixins, first appearance first.
    fn carried_components(&self, mixin_ids: &[String]) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for m in mixin_ids.iter().filter_map(|m| self.mixins.get(m)) {
            for c in m.components() {
                if self.registry.contains(c) && !out.iter().any(|o| o == c) {
                    out.push(c.to_owned());
                }
            }
        }
        out
    }

    /// Bring attached components in line with attributes and mixins.
    fn sync_components(&mut self, id: EntityId) -> Result<()> {
        let rec = self.record(id).ok_or(SceneError::StaleEntity(id))?;
        let wanted = self.carried_components(&rec.mixins);
        let attached: Vec<String> = rec.components.iter().map(|s| s.name.clone()).collect();
        let direct: Vec<String> = rec.attributes.keys().cloned().collect();

        for name in attached.iter().rev() {
            if !wanted.contains(name) && !direct.contains(name) {
                self.detach(id, name);
            }
        }
        for name in &attached {
            if self.has_component(id, name) {
                self.refresh(id, name);
            }
        }

        let mut pending: Vec<String> = wanted
            .into_iter()
            .filter(|n| !self.has_component(id, n))
            .collect();
        // Attach in passes so components listed before their dependencies still go in.
        loop {
            let before = pending.len();
            let mut last_err = None;
            pending.retain(|name| match self.attach(id, name, None) {
                Ok(()) => false,
                Err(err) => {
                    last_err = Some(err);
                    true
                }
            });
            match last_err {
                None => return Ok(()),
                Some(err) if pending.len() == before => return Err(err),
                Some(_) => {}
            }
        }
    }

    /// Take the instance out of its slot, run `f`, and put it back.
    /// Returns `false` if the component is not attached or is already running a hook.
    fn with_component<F>(&mut self, id: EntityId, name: &str, f: F) -> bool
    where
        F: FnOnce(&mut dyn Component, &mut ComponentContext<'_>),
    {
        let Some(mut instance) = self
            .record_mut(id)
            .and_then(|r| r.slot_mut(name))
            .and_then(|s| s.instance.take())
        else {
            return false;
        };
        self.run_hook(id, &mut instance, f);
        self.restore(id, instance);
        true
    }

    fn run_hook<F>(&mut self, id: EntityId, instance: &mut ComponentInstance, f: F)
    where
        F: FnOnce(&mut dyn Component, &mut ComponentContext<'_>),
    {
        let ComponentInstance {
            name,
            behavior,
            data,
            ..
        } = instance;
        let mut ctx = ComponentContext {
            scene: self,
            entity: id,
            name: name.as_str(),
            data: &*data,
        };
        f(behavior.as_mut(), &mut ctx);
    }

    /// Return an instance to its slot after a hook. If the slot was detached
    /// meanwhile the removal is finished here instead.
    fn restore(&mut self, id: EntityId, instance: ComponentInstance) {
        let name = instance.name.clone();
        let outcome = match self.record_mut(id).and_then(|r| r.slot_mut(&name)) {
            Some(slot) if slot.instance.is_none() => {
                slot.instance = Some(instance);
                Ok(core::mem::take(&mut slot.stale))
            }
            _ => Err(instance),
        };
        match outcome {
            Ok(true) => self.refresh(id, &name),
            Ok(false) => {}
            Err(mut orphan) => self.finish_removal(id, &mut orphan),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::names;
    use scenery_attr::{Value, stringify};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    #[derive(Debug, Default)]
    struct Recorder {
        log: Log,
    }

    impl Recorder {
        fn push(&self, line: String) {
            self.log.borrow_mut().push(line);
        }
    }

    impl Component for Recorder {
        fn init(&mut self, _ctx: &mut ComponentContext<'_>) {
            self.push("init".into());
        }

        fn update(&mut self, ctx: &mut ComponentContext<'_>) {
            self.push(format!(
                "update {} <- {}",
                stringify(ctx.data()),
                stringify(ctx.previous_data())
            ));
        }

        fn remove(&mut self, _ctx: &mut ComponentContext<'_>) {
            self.push("remove".into());
        }

        fn events(&self) -> &[&'static str] {
            &["ping"]
        }

        fn on_event(&mut self, _ctx: &mut ComponentContext<'_>, event: &Event) {
            self.push(format!("event {}", event.name));
        }

        fn on_pointer(&mut self, _ctx: &mut ComponentContext<'_>, pointer: Pointer) {
            self.push(format!("pointer {pointer:?}"));
        }
    }

    #[derive(Debug, Default)]
    struct Ticker {
        log: Log,
    }

    impl Component for Ticker {
        fn init(&mut self, ctx: &mut ComponentContext<'_>) {
            ctx.set_interval(100);
        }

        fn on_timer(&mut self, ctx: &mut ComponentContext<'_>, _timer: TimerId) {
            self.log.borrow_mut().push(format!("tick {}", ctx.now()));
        }
    }

    #[derive(Debug, Default)]
    struct Clamp {
        updates: u32,
    }

    impl Component for Clamp {
        fn update(&mut self, ctx: &mut ComponentContext<'_>) {
            self.updates += 1;
            let x = ctx.data()["x"].as_number().unwrap_or(0.0);
            if x > 10.0 {
                let id = ctx.entity();
                ctx.scene_mut().set_attribute(id, "clamp", "x: 10").unwrap();
            }
        }
    }

    #[derive(Debug, Default)]
    struct Echo;

    impl Component for Echo {
        fn events(&self) -> &[&'static str] {
            &["ping"]
        }

        fn on_event(&mut self, ctx: &mut ComponentContext<'_>, _event: &Event) {
            ctx.emit("ping", EventDetail::None);
        }
    }

    fn scene_with(schema: Schema, config: SceneConfig) -> (Scene, Log) {
        let log: Log = Rc::default();
        let mut registry = ComponentRegistry::with_builtins();
        let shared = log.clone();
        registry
            .register_with("rec", schema, move || -> Box<dyn Component> {
                Box::new(Recorder {
                    log: shared.clone(),
                })
            })
            .unwrap();
        let shared = log.clone();
        registry
            .register_with("ticker", Schema::new(), move || -> Box<dyn Component> {
                Box::new(Ticker {
                    log: shared.clone(),
                })
            })
            .unwrap();
        registry
            .register::<Clamp>("clamp", Schema::new().property("x", 0.0))
            .unwrap();
        registry.register::<Echo>("echo", Schema::new()).unwrap();
        (Scene::with_config(registry, config), log)
    }

    fn xy() -> Schema {
        Schema::new().property("x", 0.0).property("y", 0.0)
    }

    fn lines(log: &Log) -> Vec<String> {
        log.borrow().clone()
    }

    fn num(scene: &Scene, e: EntityId, key: &str) -> f64 {
        scene.get_data(e, "rec").unwrap()[key].as_number().unwrap()
    }

    #[test]
    fn precedence_default_mixin_direct() {
        let (mut scene, _) = scene_with(xy(), SceneConfig::default());
        let e = scene.create_entity(None).unwrap();
        scene.register_mixin(Mixin::new("m").with("rec", "x: 1; y: 1"));

        scene.set_attribute(e, "rec", "x: 2").unwrap();
        assert_eq!((num(&scene, e, "x"), num(&scene, e, "y")), (2.0, 0.0));

        scene.set_mixins(e, ["m"]).unwrap();
        assert_eq!((num(&scene, e, "x"), num(&scene, e, "y")), (2.0, 1.0));

        // Removing the direct attribute falls back to the mixin.
        scene.remove_attribute(e, "rec").unwrap();
        assert_eq!((num(&scene, e, "x"), num(&scene, e, "y")), (1.0, 1.0));

        // No source left: detached.
        scene.set_mixins(e, Vec::<String>::new()).unwrap();
        assert!(!scene.has_component(e, "rec"));
    }

    #[test]
    fn later_mixins_win() {
        let (mut scene, _) = scene_with(xy(), SceneConfig::default());
        let e = scene.create_entity(None).unwrap();
        scene.register_mixin(Mixin::new("a").with("rec", "x: 1"));
        scene.register_mixin(Mixin::new("b").with("rec", "x: 2"));
        scene.set_mixins(e, ["a", "b"]).unwrap();
        assert!(scene.has_component(e, "rec"), "mixin introduces the component");
        assert_eq!(num(&scene, e, "x"), 2.0);
        scene.set_mixins(e, ["b", "a"]).unwrap();
        assert_eq!(num(&scene, e, "x"), 1.0);
        assert_eq!(scene.mixins(e), ["b", "a"]);

        // Unknown ids are skipped.
        scene.set_mixins(e, ["ghost", "b"]).unwrap();
        assert_eq!(num(&scene, e, "x"), 2.0);

        // Re-registering a mixin re-resolves its users.
        scene.register_mixin(Mixin::new("b").with("rec", "x: 7"));
        assert_eq!(num(&scene, e, "x"), 7.0);
        assert!(scene.remove_mixin("b").is_some());
        assert!(!scene.has_component(e, "rec"));
    }

    #[test]
    fn update_runs_only_on_change() {
        let (mut scene, log) = scene_with(xy(), SceneConfig::default());
        let e = scene.create_entity(None).unwrap();
        scene.set_attribute(e, "rec", "x: 1").unwrap();
        scene.set_attribute(e, "rec", "x: 1.0").unwrap();
        scene.set_attribute(e, "rec", "x: 1; y: junk").unwrap();
        scene.set_attribute(e, "rec", "x: 3").unwrap();
        assert_eq!(
            lines(&log),
            [
                "init",
                "update x: 1; y: 0 <- ",
                "update x: 3; y: 0 <- x: 1; y: 0",
            ]
        );
        assert_eq!(
            scene.lifecycle_state(e, "rec").unwrap(),
            LifecycleState::Initialized
        );
    }

    #[test]
    fn missing_dependency_fails_fast() {
        let (mut scene, log) = scene_with(xy().depends_on("position"), SceneConfig::default());
        let e = scene.create_entity(None).unwrap();
        assert_eq!(
            scene.set_attribute(e, "rec", "x: 1"),
            Err(SceneError::MissingDependency {
                entity: e,
                component: "rec".into(),
                dependency: "position".into(),
            })
        );
        assert!(scene.get_attribute(e, "rec").is_none());
        assert!(!scene.has_component(e, "rec"));
        assert!(lines(&log).is_empty());

        scene.set_attribute(e, "position", "1 2 3").unwrap();
        scene.set_attribute(e, "rec", "x: 1").unwrap();
        assert_eq!(scene.component_names(e), ["position", "rec"]);
    }

    #[test]
    fn mixin_dependencies_are_checked_up_front() {
        let (mut scene, _) = scene_with(xy().depends_on("position"), SceneConfig::default());
        let e = scene.create_entity(None).unwrap();
        scene.register_mixin(Mixin::new("lonely").with("rec", "x: 1"));
        scene.register_mixin(
            Mixin::new("full")
                .with("rec", "x: 1")
                .with("position", "0 1 0"),
        );
        assert!(matches!(
            scene.set_mixins(e, ["lonely"]),
            Err(SceneError::MissingDependency { .. })
        ));
        assert!(scene.mixins(e).is_empty());
        scene.set_mixins(e, ["full"]).unwrap();
        assert!(scene.has_component(e, "position"));
        assert!(scene.has_component(e, "rec"));
    }

    #[test]
    fn dependencies_dropped_by_the_new_mixin_list_fail_fast() {
        let (mut scene, log) = scene_with(xy().depends_on("position"), SceneConfig::default());
        let e = scene.create_entity(None).unwrap();
        scene.register_mixin(Mixin::new("placed").with("position", "0 1 0"));
        scene.register_mixin(Mixin::new("recorded").with("rec", "x: 1"));
        scene.set_mixins(e, ["placed"]).unwrap();
        assert!(matches!(
            scene.set_mixins(e, ["recorded"]),
            Err(SceneError::MissingDependency { ref dependency, .. }) if dependency == "position"
        ));
        assert_eq!(scene.mixins(e), ["placed"]);
        assert!(scene.has_component(e, "position"));
        assert!(!scene.has_component(e, "rec"));
        assert!(lines(&log).is_empty());

        // A direct attribute keeps the dependency alive across the switch.
        scene.set_attribute(e, "position", "0 2 0").unwrap();
        scene.set_mixins(e, ["recorded"]).unwrap();
        assert!(scene.has_component(e, "position"));
        assert!(scene.has_component(e, "rec"));
    }

    #[test]
    fn components_registered_on_a_live_scene_attach() {
        let mut scene = Scene::new(ComponentRegistry::new());
        let e = scene.create_entity(None).unwrap();
        scene.set_attribute(e, "limit", "x: 3").unwrap();
        assert!(!scene.has_component(e, "limit"));

        scene
            .register_component::<Clamp>("limit", Schema::new().property("x", 0.0))
            .unwrap();
        assert_eq!(
            scene.register_component::<Echo>("limit", Schema::new()),
            Err(SceneError::DuplicateComponent("limit".into()))
        );
        let other = scene.create_entity(None).unwrap();
        scene.set_attribute(other, "limit", "x: 3").unwrap();
        assert_eq!(scene.component::<Clamp>(other, "limit").unwrap().updates, 1);
    }

    #[test]
    fn mixins_are_looked_up_by_id() {
        let (mut scene, _) = scene_with(xy(), SceneConfig::default());
        assert!(scene.mixin("tall").is_none());
        scene.register_mixin(Mixin::new("tall").with("rec", "y: 9"));
        assert_eq!(
            scene.mixin("tall").and_then(|m| m.get("rec")),
            Some(&AttrValue::from("y: 9"))
        );
        assert!(scene.remove_mixin("tall").is_some());
        assert!(scene.mixin("tall").is_none());
    }

    #[test]
    fn get_data_returns_a_copy() {
        let (mut scene, _) = scene_with(xy(), SceneConfig::default());
        let e = scene.create_entity(None).unwrap();
        scene.set_attribute(e, "rec", "x: 2").unwrap();
        let mut copy = scene.get_data(e, "rec").unwrap();
        copy.insert("x".into(), Value::Number(99.0));
        assert_eq!(num(&scene, e, "x"), 2.0);
        assert_eq!(scene.stringify_component(e, "rec").unwrap(), "x: 2; y: 0");
    }

    #[test]
    fn detached_and_removed_addressing_errors() {
        let (mut scene, log) = scene_with(xy(), SceneConfig::default());
        let e = scene.create_entity(None).unwrap();
        scene.set_attribute(e, "rec", "").unwrap();
        scene.remove_attribute(e, "rec").unwrap();
        assert_eq!(lines(&log).last().map(String::as_str), Some("remove"));
        assert_eq!(
            scene.get_data(e, "rec"),
            Err(SceneError::NotAttached {
                entity: e,
                component: "rec".into()
            })
        );
        assert!(matches!(
            scene.remove_attribute(e, "rec"),
            Err(SceneError::NotAttached { .. })
        ));
        scene.remove_entity(e).unwrap();
        assert_eq!(scene.get_data(e, "rec"), Err(SceneError::StaleEntity(e)));
        assert_eq!(scene.remove_entity(e), Err(SceneError::StaleEntity(e)));
        let reused = scene.create_entity(None).unwrap();
        assert_ne!(reused, e);
        assert!(!scene.is_alive(e));
    }

    #[test]
    fn detach_cancels_timers() {
        let (mut scene, log) = scene_with(Schema::new(), SceneConfig::default());
        let e = scene.create_entity(None).unwrap();
        scene.set_attribute(e, "ticker", "").unwrap();
        scene.advance_to(250);
        assert_eq!(lines(&log), ["tick 100", "tick 200"]);
        scene.remove_attribute(e, "ticker").unwrap();
        scene.advance_by(1000);
        assert_eq!(lines(&log).len(), 2);
        assert_eq!(scene.now(), 1250);
    }

    #[test]
    fn removing_an_entity_tears_down_its_subtree() {
        let (mut scene, log) = scene_with(xy(), SceneConfig::default());
        let parent = scene.create_entity(None).unwrap();
        let child = scene.create_entity(Some(parent)).unwrap();
        scene.set_attribute(parent, "rec", "").unwrap();
        scene.set_attribute(child, "rec", "").unwrap();
        scene.set_attribute(child, "ticker", "").unwrap();
        assert_eq!(scene.children(parent), [child]);
        assert_eq!(scene.tree().len(), 3);

        scene.remove_entity(parent).unwrap();
        assert!(!scene.is_alive(child));
        assert_eq!(lines(&log).iter().filter(|l| *l == "remove").count(), 2);
        assert_eq!(scene.tree().len(), 1, "only the scene root is left");
        scene.advance_by(500);
        assert!(!lines(&log).iter().any(|l| l.starts_with("tick")));
    }

    #[test]
    fn hooks_may_set_their_own_attribute() {
        let (mut scene, _) = scene_with(Schema::new(), SceneConfig::default());
        let e = scene.create_entity(None).unwrap();
        scene.set_attribute(e, "clamp", "x: 50").unwrap();
        assert_eq!(scene.get_data(e, "clamp").unwrap()["x"], Value::Number(10.0));
        assert_eq!(scene.component::<Clamp>(e, "clamp").unwrap().updates, 2);
        assert!(scene.component::<Echo>(e, "clamp").is_none());
    }

    #[test]
    fn plain_attributes_are_kept() {
        let (mut scene, _) = scene_with(Schema::new(), SceneConfig::default());
        let e = scene.create_entity(None).unwrap();
        scene.set_attribute(e, "class", "crate").unwrap();
        assert_eq!(scene.get_attribute(e, "class"), Some(&AttrValue::from("crate")));
        assert!(scene.component_names(e).is_empty());
        scene.remove_attribute(e, "class").unwrap();
        assert!(scene.get_attribute(e, "class").is_none());
    }

    #[test]
    fn events_bubble_to_ancestors() {
        let (mut scene, log) = scene_with(xy(), SceneConfig::recording());
        let parent = scene.create_entity(None).unwrap();
        let child = scene.create_entity(Some(parent)).unwrap();
        scene.set_attribute(parent, "rec", "").unwrap();

        let seen: Rc<RefCell<Vec<EntityId>>> = Rc::default();
        let sink = seen.clone();
        let listener = scene
            .add_event_listener(parent, "ping", move |ev| sink.borrow_mut().push(ev.target))
            .unwrap();

        scene.emit(child, "ping", EventDetail::None).unwrap();
        assert_eq!(*seen.borrow(), [child]);
        assert_eq!(lines(&log).last().map(String::as_str), Some("event ping"));

        scene
            .dispatch(Event::new(child, "ping", EventDetail::None).local())
            .unwrap();
        assert_eq!(seen.borrow().len(), 1, "local events do not bubble");

        assert!(scene.remove_event_listener(parent, listener));
        assert!(!scene.remove_event_listener(parent, listener));
        scene.emit(parent, "ping", EventDetail::None).unwrap();
        assert_eq!(seen.borrow().len(), 1);

        assert_eq!(scene.events_for(child, "ping").count(), 2);
        assert_eq!(scene.take_events().len(), 3);
        assert!(scene.events().is_empty());
        assert!(scene.emit(EntityId::new(40, 1), names::CLICK, EventDetail::None).is_err());
    }

    #[test]
    fn runaway_cascades_are_capped() {
        let config = SceneConfig {
            record_events: true,
            max_dispatch: 50,
        };
        let (mut scene, _) = scene_with(Schema::new(), config);
        let e = scene.create_entity(None).unwrap();
        scene.set_attribute(e, "echo", "").unwrap();
        scene.emit(e, "ping", EventDetail::None).unwrap();
        assert_eq!(scene.events().len(), 50);
    }

    #[test]
    fn pointer_input_reaches_components() {
        let (mut scene, log) = scene_with(xy(), SceneConfig::default());
        let e = scene.create_entity(None).unwrap();
        scene.set_attribute(e, "rec", "").unwrap();
        scene.pointer(Pointer::Down);
        scene.pointer(Pointer::Up);
        let l = lines(&log);
        assert_eq!(&l[l.len() - 2..], ["pointer Down", "pointer Up"]);
    }

    #[test]
    fn states_are_tracked_per_entity() {
        let (mut scene, _) = scene_with(Schema::new(), SceneConfig::default());
        let e = scene.create_entity(None).unwrap();
        assert_eq!(scene.add_state(e, names::STATE_HOVERED), Ok(true));
        assert_eq!(scene.add_state(e, names::STATE_HOVERED), Ok(false));
        assert!(scene.is_state(e, "hovered"));
        assert_eq!(scene.remove_state(e, "hovered"), Ok(true));
        assert!(scene.states(e).unwrap().is_empty());
        scene.remove_entity(e).unwrap();
        assert_eq!(scene.add_state(e, "x"), Err(SceneError::StaleEntity(e)));
    }
}

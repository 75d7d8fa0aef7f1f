// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, updates, queries.

use alloc::vec::Vec;

use tracing::trace;

use crate::math::{Affine3, Transform3, Vec3};
use crate::ray::{Ray, RayHit, Raycast, ray_aabb};
use crate::types::{Aabb3, LocalNode, NodeFlags, NodeId};

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level scene graph.
pub struct Tree {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    needs_commit: bool,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("needs_commit", &self.needs_commit)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Default)]
struct WorldNode {
    transform: Affine3,
    // `None` when the world transform is singular; such a node cannot be hit.
    inverse: Option<Affine3>,
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: LocalNode,
    world: WorldNode,
    dirty: bool,
}

impl Node {
    fn new(generation: u32, local: LocalNode) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            local,
            world: WorldNode::default(),
            dirty: true,
        }
    }
}

impl Tree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            needs_commit: false,
        }
    }

    /// Insert a new node as a child of `parent` (or as a root if `None`).
    ///
    /// A stale `parent` inserts the node as a root.
    pub fn insert(&mut self, parent: Option<NodeId>, local: LocalNode) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, local));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, local)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        if let Some(p) = parent.filter(|p| self.is_alive(*p)) {
            self.link_parent(id, p);
        }
        self.needs_commit = true;
        id
    }

    /// Remove a node (and its subtree) from the tree.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).and_then(|n| n.parent) {
            self.unlink_parent(id, parent);
        }
        let children = self.node(id).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            self.remove(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Replace the local transform.
    pub fn set_transform(&mut self, id: NodeId, transform: Transform3) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.transform = transform;
            n.dirty = true;
            self.needs_commit = true;
        }
    }

    /// Update only the translation part of the local transform.
    pub fn set_translation(&mut self, id: NodeId, translation: Vec3) {
        if let Some(t) = self.local(id).map(|l| l.transform) {
            self.set_transform(id, Transform3 { translation, ..t });
        }
    }

    /// Update only the rotation part (XYZ Euler, radians) of the local transform.
    pub fn set_rotation(&mut self, id: NodeId, rotation: Vec3) {
        if let Some(t) = self.local(id).map(|l| l.transform) {
            self.set_transform(id, Transform3 { rotation, ..t });
        }
    }

    /// Update only the scale part of the local transform.
    pub fn set_scale(&mut self, id: NodeId, scale: Vec3) {
        if let Some(t) = self.local(id).map(|l| l.transform) {
            self.set_transform(id, Transform3 { scale, ..t });
        }
    }

    /// Update local bounds. `None` makes the node unhittable.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Option<Aabb3>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.bounds = bounds;
        }
    }

    /// Update node flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.flags = flags;
        }
    }

    /// Local data of a live node.
    pub fn local(&self, id: NodeId) -> Option<&LocalNode> {
        self.node(id).map(|n| &n.local)
    }

    /// Parent of a live node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Children of a live node, in insertion order. Empty for stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// All live nodes without a parent, in slot order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(n) if n.parent.is_none() =>
                {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "NodeId uses 32-bit indices by design."
                    )]
                    Some(NodeId::new(i as u32, n.generation))
                }
                _ => None,
            })
            .collect()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// True when the tree holds no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when `id` is live: its slot is occupied at the same generation.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// True when local changes are waiting for [`Tree::commit`].
    pub fn needs_commit(&self) -> bool {
        self.needs_commit
    }

    /// Recompute world transforms for every node whose transform (or an
    /// ancestor's) changed since the last commit. Returns the number of nodes updated.
    ///
    /// World-space queries ([`Tree::world_transform`], [`Raycast`]) read the
    /// committed state.
    pub fn commit(&mut self) -> usize {
        if !self.needs_commit {
            return 0;
        }
        let mut updated = 0;
        for root in self.roots() {
            updated += self.update_world_recursive(root, Affine3::IDENTITY, false);
        }
        self.needs_commit = false;
        trace!(updated, "scene graph committed");
        updated
    }

    /// Committed world transform of a live node.
    pub fn world_transform(&self, id: NodeId) -> Option<Affine3> {
        self.node(id).map(|n| n.world.transform)
    }

    /// Committed world-space position (where the local origin lands).
    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_transform(id).map(|t| t.translation())
    }

    // --- internals ---

    fn node(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.node_opt_mut(parent) {
            p.children.push(id);
        }
        if let Some(n) = self.node_opt_mut(id) {
            n.parent = Some(parent);
            n.dirty = true;
        }
        self.needs_commit = true;
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.node_opt_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.node_opt_mut(id) {
            n.parent = None;
            n.dirty = true;
        }
        self.needs_commit = true;
    }

    fn update_world_recursive(
        &mut self,
        id: NodeId,
        parent_tf: Affine3,
        parent_changed: bool,
    ) -> usize {
        let Some(node) = self.node_opt_mut(id) else {
            return 0;
        };
        let changed = parent_changed || node.dirty;
        if changed {
            let world = parent_tf * Affine3::from_transform(&node.local.transform);
            node.world = WorldNode {
                transform: world,
                inverse: world.inverse(),
            };
            node.dirty = false;
        }
        let world = node.world.transform;
        let children = node.children.clone();
        let mut updated = usize::from(changed);
        for child in children {
            updated += self.update_world_recursive(child, world, changed);
        }
        updated
    }

    fn raycast_recursive(&self, id: NodeId, ray: &Ray, recursive: bool, hits: &mut Vec<RayHit>) {
        let Some(node) = self.node(id) else {
            return;
        };
        if !node.local.flags.contains(NodeFlags::VISIBLE) {
            return;
        }
        if node.local.flags.contains(NodeFlags::PICKABLE)
            && let (Some(bounds), Some(inv)) = (node.local.bounds, node.world.inverse)
            // The local direction keeps the world parametrization, so `t` is a world distance.
            && let Some(t) = ray_aabb(
                inv.transform_point(ray.origin),
                inv.transform_vector(ray.direction),
                &bounds,
            )
        {
            hits.push(RayHit {
                node: id,
                distance: t,
                point: ray.at(t),
            });
        }
        if recursive {
            for child in &node.children {
                self.raycast_recursive(*child, ray, recursive, hits);
            }
        }
    }
}

impl Raycast for Tree {
    fn intersect_objects(&self, ray: &Ray, objects: &[NodeId], recursive: bool) -> Vec<RayHit> {
        let mut hits = Vec::new();
        for id in objects {
            self.raycast_recursive(*id, ray, recursive, &mut hits);
        }
        // Stable: equal distances keep traversal order.
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_2;

    fn cube_at(tree: &mut Tree, parent: Option<NodeId>, at: Vec3) -> NodeId {
        tree.insert(
            parent,
            LocalNode {
                bounds: Some(Aabb3::from_center_size(Vec3::ZERO, Vec3::ONE)),
                transform: Transform3::from_translation(at),
                ..Default::default()
            },
        )
    }

    fn forward_ray() -> Ray {
        Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)).unwrap()
    }

    #[test]
    fn hits_are_sorted_by_distance() {
        let mut tree = Tree::new();
        let far = cube_at(&mut tree, None, Vec3::new(0.0, 0.0, -10.0));
        let near = cube_at(&mut tree, None, Vec3::new(0.0, 0.0, -3.0));
        let _off = cube_at(&mut tree, None, Vec3::new(5.0, 0.0, -3.0));
        tree.commit();

        let hits = tree.intersect_objects(&forward_ray(), &[far, near], true);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].node, near);
        assert!((hits[0].distance - 2.5).abs() < 1e-9);
        assert_eq!(hits[1].node, far);
        assert!((hits[1].distance - 9.5).abs() < 1e-9);
        assert!((hits[0].point.z + 2.5).abs() < 1e-9);
    }

    #[test]
    fn world_transforms_compose_through_parents() {
        let mut tree = Tree::new();
        let pivot = tree.insert(
            None,
            LocalNode {
                transform: Transform3 {
                    translation: Vec3::new(0.0, 0.0, -4.0),
                    rotation: Vec3::new(0.0, FRAC_PI_2, 0.0),
                    scale: Vec3::ONE,
                },
                ..Default::default()
            },
        );
        // Local +x under a quarter turn about y lands on world -z.
        let child = cube_at(&mut tree, Some(pivot), Vec3::new(2.0, 0.0, 0.0));
        assert!(tree.needs_commit());
        assert_eq!(tree.commit(), 2);
        assert!(!tree.needs_commit());

        let p = tree.world_position(child).unwrap();
        assert!(p.distance(Vec3::new(0.0, 0.0, -6.0)) < 1e-9);

        let hits = tree.intersect_objects(&forward_ray(), &[pivot], true);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node, child);
        assert!((hits[0].distance - 5.5).abs() < 1e-9);

        // Non-recursive queries only test the listed objects; the pivot has no bounds.
        assert!(tree.intersect_objects(&forward_ray(), &[pivot], false).is_empty());
    }

    #[test]
    fn scale_stretches_hit_distance() {
        let mut tree = Tree::new();
        let n = cube_at(&mut tree, None, Vec3::new(0.0, 0.0, -5.0));
        tree.set_scale(n, Vec3::new(1.0, 1.0, 4.0));
        tree.commit();
        let hits = tree.intersect_objects(&forward_ray(), &[n], false);
        assert!((hits[0].distance - 3.0).abs() < 1e-9);
    }

    #[test]
    fn commit_only_touches_dirty_subtrees() {
        let mut tree = Tree::new();
        let a = cube_at(&mut tree, None, Vec3::ZERO);
        let _b = cube_at(&mut tree, Some(a), Vec3::ZERO);
        let c = cube_at(&mut tree, None, Vec3::ZERO);
        assert_eq!(tree.commit(), 3);
        assert_eq!(tree.commit(), 0);
        tree.set_translation(a, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(tree.commit(), 2);
        tree.set_translation(c, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(tree.commit(), 1);
    }

    #[test]
    fn flags_filter_hits() {
        let mut tree = Tree::new();
        let parent = cube_at(&mut tree, None, Vec3::new(0.0, 0.0, -3.0));
        let child = cube_at(&mut tree, Some(parent), Vec3::new(0.0, 0.0, -3.0));
        tree.commit();

        tree.set_flags(parent, NodeFlags::VISIBLE);
        let hits = tree.intersect_objects(&forward_ray(), &[parent], true);
        assert_eq!(hits.len(), 1, "unpickable parent still lets children through");
        assert_eq!(hits[0].node, child);

        tree.set_flags(parent, NodeFlags::PICKABLE);
        assert!(
            tree.intersect_objects(&forward_ray(), &[parent], true).is_empty(),
            "invisible parent hides its subtree"
        );
    }

    #[test]
    fn singular_transform_is_never_hit() {
        let mut tree = Tree::new();
        let n = cube_at(&mut tree, None, Vec3::new(0.0, 0.0, -3.0));
        tree.set_scale(n, Vec3::new(0.0, 1.0, 1.0));
        tree.commit();
        assert!(tree.intersect_objects(&forward_ray(), &[n], false).is_empty());
    }

    #[test]
    fn liveness_insert_remove_reuse() {
        let mut tree = Tree::new();
        let root = cube_at(&mut tree, None, Vec3::ZERO);
        let a = cube_at(&mut tree, Some(root), Vec3::ZERO);
        assert!(tree.is_alive(root));
        assert!(tree.is_alive(a));

        tree.remove(a);
        assert!(!tree.is_alive(a));
        assert!(tree.children(root).is_empty());

        let b = cube_at(&mut tree, Some(root), Vec3::ZERO);
        assert!(tree.is_alive(b));
        assert!(!tree.is_alive(a));
        assert_eq!(a.0, b.0, "freed slot is reused");
        assert!(b.1 > a.1, "generation must increase on reuse");
        assert!(tree.local(a).is_none());
        assert!(tree.world_transform(a).is_none());
    }

    #[test]
    fn remove_takes_the_subtree() {
        let mut tree = Tree::new();
        let root = cube_at(&mut tree, None, Vec3::ZERO);
        let child = cube_at(&mut tree, Some(root), Vec3::ZERO);
        let grandchild = cube_at(&mut tree, Some(child), Vec3::ZERO);
        assert_eq!(tree.len(), 3);
        tree.remove(child);
        assert!(!tree.is_alive(grandchild));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.roots(), [root]);
    }
}

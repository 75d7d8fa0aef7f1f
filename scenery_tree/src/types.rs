// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene graph: node identifiers, flags, bounds, and local data.

use crate::math::{Transform3, Vec3};

/// Handle to a scene-graph node: a slot index plus the slot's generation.
///
/// Removing a node frees its slot. A later insert may reuse the slot with a
/// bumped generation, so an old handle never reaches the new node; every
/// accessor treats it as missing. [`Tree::is_alive`](crate::Tree::is_alive)
/// tells the two apart.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Node flags controlling visibility and picking.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node and its subtree take part in ray queries.
        const VISIBLE  = 0b0000_0001;
        /// Node's own bounds can be hit. Children are still visited when this is clear.
        const PICKABLE = 0b0000_0010;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

/// Axis-aligned box in a node's local space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb3 {
    /// Create a box from its corners.
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// A box of the given size centered on `center`.
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    /// True when the box is inverted on any axis.
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// True when `p` lies inside or on the boundary.
    pub fn contains(&self, p: Vec3) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }
}

/// Local data for a node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocalNode {
    /// Pickable extent in local space; `None` for pure grouping nodes (cameras, pivots).
    pub bounds: Option<Aabb3>,
    /// Transform relative to the parent.
    pub transform: Transform3,
    /// Visibility and picking flags.
    pub flags: NodeFlags,
}

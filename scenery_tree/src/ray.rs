// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rays, ray hits, and the ray-query seam hosts implement.

use alloc::vec::Vec;

use crate::math::Vec3;
use crate::types::{Aabb3, NodeId};

/// A half-line with a unit direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    /// Start point in world space.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing `direction`. Returns `None` for a zero direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        Some(Self {
            origin,
            direction: direction.normalize()?,
        })
    }

    /// A ray from `origin` through `target`. Returns `None` when the points coincide.
    pub fn toward(origin: Vec3, target: Vec3) -> Option<Self> {
        Self::new(origin, target - origin)
    }

    /// The point at distance `t` along the ray.
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// One ray-vs-object intersection.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// The node whose bounds were struck.
    pub node: NodeId,
    /// World-space distance from the ray origin (0 when the origin is inside the bounds).
    pub distance: f64,
    /// World-space entry point.
    pub point: Vec3,
}

/// Ray queries over a scene graph.
///
/// This is the contract a renderer or physics backend provides to the
/// interaction layer. [`Tree`](crate::Tree) implements it with ray-vs-AABB tests.
pub trait Raycast {
    /// Intersect `ray` with `objects` (and, when `recursive`, all their
    /// descendants). Hits are ordered by ascending distance; equal distances
    /// keep traversal order.
    fn intersect_objects(&self, ray: &Ray, objects: &[NodeId], recursive: bool) -> Vec<RayHit>;
}

/// Slab test. `dir` need not be unit length; the returned parameter is in units of `dir`.
pub(crate) fn ray_aabb(origin: Vec3, dir: Vec3, aabb: &Aabb3) -> Option<f64> {
    let o = origin.to_array();
    let d = dir.to_array();
    let lo = aabb.min.to_array();
    let hi = aabb.max.to_array();
    let mut t_min = 0.0_f64;
    let mut t_max = f64::INFINITY;
    for axis in 0..3 {
        if d[axis].abs() < 1e-12 {
            if o[axis] < lo[axis] || o[axis] > hi[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d[axis];
        let mut t0 = (lo[axis] - o[axis]) * inv;
        let mut t1 = (hi[axis] - o[axis]) * inv;
        if t0 > t1 {
            core::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }
    Some(t_min)
}

// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Intersection tracking: turn the closest ray hit into enter/clear signals.
//!
//! ## Usage
//!
//! 1) Cast a ray with [`intersect`] against the candidate objects.
//! 2) Pick the first hit that is not the caster with [`closest_non_self`].
//! 3) Feed the hit's key and distance to [`IntersectionState::update`] to get
//!    `Cleared(..)` / `Intersection { .. }` signals.
//!
//! ## Minimal example
//!
//! ```
//! use scenery_cursor::tracker::{IntersectionState, TrackSignal};
//! let mut t: IntersectionState<u32> = IntersectionState::new();
//! assert_eq!(
//!     t.update(Some((1, 2.0))),
//!     vec![TrackSignal::Intersection { target: 1, distance: 2.0 }]
//! );
//! assert_eq!(
//!     t.update(Some((2, 3.0))),
//!     vec![
//!         TrackSignal::Cleared(1),
//!         TrackSignal::Intersection { target: 2, distance: 3.0 }
//!     ]
//! );
//! assert_eq!(t.update(None), vec![TrackSignal::Cleared(2)]);
//! ```

use scenery_tree::{NodeId, Ray, RayHit, Raycast, Vec3};

/// Cast one ray from `origin` through `toward` against `candidates` and all
/// their descendants. Hits come back nearest first.
///
/// A degenerate ray (`toward == origin`) hits nothing.
pub fn intersect<G: Raycast + ?Sized>(
    graph: &G,
    origin: Vec3,
    toward: Vec3,
    candidates: &[NodeId],
) -> Vec<RayHit> {
    match Ray::toward(origin, toward) {
        Some(ray) => graph.intersect_objects(&ray, candidates, true),
        None => Vec::new(),
    }
}

/// The nearest hit that is not the caster's own node.
pub fn closest_non_self(hits: &[RayHit], self_node: NodeId) -> Option<&RayHit> {
    hits.iter().find(|h| h.node != self_node)
}

/// A tracking transition.
///
/// Returned by [`IntersectionState::update`] and [`IntersectionState::clear`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TrackSignal<K> {
    /// The previously tracked target is no longer the closest hit.
    Cleared(K),
    /// `target` is the closest hit, `distance` away.
    Intersection {
        /// The hit key.
        target: K,
        /// Distance from the ray origin.
        distance: f64,
    },
}

/// Remembers the last closest target.
///
/// Every update with a hit reports it again, so consumers see redundant
/// `Intersection` signals for a target that stays put (its distance may still
/// change). `Cleared` always precedes the new target's `Intersection`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntersectionState<K: Copy + Eq> {
    current: Option<K>,
}

impl<K: Copy + Eq> Default for IntersectionState<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq> IntersectionState<K> {
    /// Nothing tracked.
    pub fn new() -> Self {
        Self { current: None }
    }

    /// The tracked target, if any.
    pub fn current(&self) -> Option<K> {
        self.current
    }

    /// Forget the tracked target, returning its `Cleared` signal.
    pub fn clear(&mut self) -> Option<TrackSignal<K>> {
        self.current.take().map(TrackSignal::Cleared)
    }

    /// Track `closest` (key and distance) and return the resulting signals.
    pub fn update(&mut self, closest: Option<(K, f64)>) -> Vec<TrackSignal<K>> {
        let mut out = Vec::new();
        if let Some(prev) = self.current
            && closest.is_none_or(|(k, _)| k != prev)
        {
            out.push(TrackSignal::Cleared(prev));
        }
        self.current = closest.map(|(k, _)| k);
        if let Some((target, distance)) = closest {
            out.push(TrackSignal::Intersection { target, distance });
        }
        out
    }
}

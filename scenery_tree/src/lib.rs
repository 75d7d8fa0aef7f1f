// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scenery Tree: a generational 3D scene graph with ray queries.
//!
//! - Represents a hierarchy of nodes with local TRS transforms, optional local bounds, and flags.
//! - Supports batched updates with a [`Tree::commit`] step that refreshes world transforms.
//! - Answers ray queries through the [`Raycast`] trait, returning hits ordered by distance.
//!
//! This is not a renderer. It holds just enough geometry for pointer interaction:
//! an axis-aligned box per node, tested in the node's own space so rotated and
//! scaled boxes are hit exactly.
//!
//! ## API overview
//!
//! - [`Tree`]: container managing nodes and their world transforms.
//! - [`LocalNode`]: per-node local data (bounds, transform, flags).
//! - [`NodeFlags`]: visibility and picking controls.
//! - [`NodeId`]: generational handle of a node.
//! - [`Ray`] / [`RayHit`]: query input and output.
//!
//! ## Example
//!
//! ```
//! use scenery_tree::{Aabb3, LocalNode, Ray, Raycast, Transform3, Tree, Vec3};
//!
//! let mut tree = Tree::new();
//! let group = tree.insert(None, LocalNode::default());
//! let cube = tree.insert(
//!     Some(group),
//!     LocalNode {
//!         bounds: Some(Aabb3::from_center_size(Vec3::ZERO, Vec3::ONE)),
//!         transform: Transform3::from_translation(Vec3::new(0.0, 0.0, -3.0)),
//!         ..Default::default()
//!     },
//! );
//! tree.commit();
//!
//! let ray = Ray::toward(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)).unwrap();
//! let hits = tree.intersect_objects(&ray, &[group], true);
//! assert_eq!(hits[0].node, cube);
//! assert_eq!(hits[0].distance, 2.5);
//! ```

extern crate alloc;

mod math;
mod ray;
mod tree;
mod types;

pub use math::{Affine3, Transform3, Vec3};
pub use ray::{Ray, RayHit, Raycast};
pub use tree::Tree;
pub use types::{Aabb3, LocalNode, NodeFlags, NodeId};

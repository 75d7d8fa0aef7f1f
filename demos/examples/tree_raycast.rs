// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene-graph basics: nested transforms, commit, and ray queries.
//!
//! Run:
//! - `cargo run -p scenery_demos --example tree_raycast`

use scenery_tree::{Aabb3, LocalNode, NodeFlags, Ray, Raycast, Transform3, Tree, Vec3};

fn cube() -> LocalNode {
    LocalNode {
        bounds: Some(Aabb3::from_center_size(Vec3::ZERO, Vec3::ONE)),
        ..LocalNode::default()
    }
}

fn main() {
    let mut tree = Tree::new();

    // A pivot 4 units ahead, turned a quarter around Y, carrying two cubes.
    let pivot = tree.insert(
        None,
        LocalNode {
            transform: Transform3 {
                translation: Vec3::new(0.0, 0.0, -4.0),
                rotation: Vec3::new(0.0, core::f64::consts::FRAC_PI_2, 0.0),
                ..Transform3::IDENTITY
            },
            ..LocalNode::default()
        },
    );
    let near = tree.insert(Some(pivot), cube());
    let far = tree.insert(Some(pivot), cube());
    tree.set_translation(far, Vec3::new(3.0, 0.0, 0.0));

    let updated = tree.commit();
    println!("== Commit ==\n  {updated} nodes updated");
    println!("  near at {:?}", tree.world_position(near));
    println!("  far at {:?}", tree.world_position(far));

    let Some(ray) = Ray::toward(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)) else {
        return;
    };
    let hits = tree.intersect_objects(&ray, &[pivot], true);
    println!("== Hits ==");
    for hit in &hits {
        println!("  {:?} at {:.2}", hit.node, hit.distance);
    }
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].node, near);

    // Unpickable nodes are skipped; their children still count.
    tree.set_flags(near, NodeFlags::VISIBLE);
    tree.commit();
    let hits = tree.intersect_objects(&ray, &[pivot], true);
    println!("== Hits with `near` unpickable ==\n  {:?}", hits.iter().map(|h| h.node).collect::<Vec<_>>());
    assert_eq!(hits[0].node, far);
}

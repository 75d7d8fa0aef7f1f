// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use scenery_cursor::state::CursorState;
use scenery_cursor::tracker::{closest_non_self, intersect};
use scenery_cursor::{CURSOR, CursorConfig, RAYCASTER};
use scenery_entity::{ComponentRegistry, Pointer, Scene};
use scenery_tree::{Aabb3, LocalNode, NodeId, Transform3, Tree, Vec3};

/// `n * n` unit cubes on a grid in the z = -10 plane, each under its own group.
fn gen_grid_tree(n: usize, cell: f64) -> (Tree, Vec<NodeId>) {
    let mut tree = Tree::new();
    let mut roots = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let group = tree.insert(
                None,
                LocalNode {
                    transform: Transform3::from_translation(Vec3::new(
                        x as f64 * cell,
                        y as f64 * cell,
                        -10.0,
                    )),
                    ..LocalNode::default()
                },
            );
            tree.insert(
                Some(group),
                LocalNode {
                    bounds: Some(Aabb3::from_center_size(Vec3::ZERO, Vec3::ONE)),
                    ..LocalNode::default()
                },
            );
            roots.push(group);
        }
    }
    let _ = tree.commit();
    (tree, roots)
}

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree");
    for &n in &[16usize, 64] {
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("insert_commit_n{n}"), |b| {
            b.iter(|| black_box(gen_grid_tree(n, 2.0).0.len()));
        });
        group.bench_function(format!("move_one_commit_n{n}"), |b| {
            b.iter_batched(
                || gen_grid_tree(n, 2.0),
                |(mut t, r)| {
                    t.set_translation(r[0], Vec3::new(0.5, 0.5, -9.0));
                    black_box(t.commit())
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_raycast(c: &mut Criterion) {
    let mut group = c.benchmark_group("raycast");
    for &n in &[16usize, 64] {
        let (tree, roots) = gen_grid_tree(n, 2.0);
        let self_node = roots[0];
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("closest_hit_n{n}"), |b| {
            b.iter(|| {
                let hits = intersect(
                    &tree,
                    Vec3::new(4.0, 4.0, 0.0),
                    Vec3::new(4.0, 4.0, -1.0),
                    black_box(&roots),
                );
                black_box(closest_non_self(&hits, self_node).map(|h| h.distance))
            });
        });
    }
    group.finish();
}

fn bench_cursor(c: &mut Criterion) {
    let mut group = c.benchmark_group("cursor");
    group.bench_function("state_enter_leave", |b| {
        b.iter_batched(
            || CursorState::<u32>::new(CursorConfig::default()),
            |mut state| {
                for t in 0..64_u32 {
                    black_box(state.on_intersection(t, 1.0));
                }
                black_box(state.reset())
            },
            BatchSize::SmallInput,
        );
    });
    group.bench_function("scene_poll_and_click", |b| {
        b.iter_batched(
            || {
                let mut registry = ComponentRegistry::with_builtins();
                let _ = scenery_cursor::register(&mut registry);
                let mut scene = Scene::new(registry);
                if let (Ok(camera), Ok(target)) = (scene.create_entity(None), scene.create_entity(None)) {
                    if let Ok(cursor) = scene.create_entity(Some(camera)) {
                        let _ = scene.set_attribute(cursor, "position", "0 0 -1");
                        let _ = scene.set_attribute(cursor, RAYCASTER, "interval: 10");
                        let _ = scene.set_attribute(cursor, CURSOR, "");
                    }
                    let _ = scene.set_attribute(target, "position", "0 0 -3");
                    let _ = scene.set_attribute(target, "geometry", "");
                }
                scene
            },
            |mut scene| {
                scene.advance_by(1000);
                scene.pointer(Pointer::Down);
                scene.pointer(Pointer::Up);
                black_box(scene.now())
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_commit, bench_raycast, bench_cursor);
criterion_main!(benches);

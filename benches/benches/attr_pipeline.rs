// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use scenery_attr::{AttrValue, Mixin, coerce, parse_style, resolve_mixins, stringify};
use scenery_entity::{ComponentRegistry, Scene, Schema, data};

fn gen_style(props: usize) -> String {
    let mut out = String::new();
    for i in 0..props {
        out.push_str(&format!("prop-{i}: {}.5; ", i * 3));
    }
    out
}

fn gen_schema(props: usize) -> Schema {
    let mut schema = Schema::new();
    for i in 0..props {
        schema = schema.property(format!("prop{i}"), 0.0);
    }
    schema
}

fn gen_mixins(count: usize, props: usize) -> Vec<Mixin> {
    (0..count)
        .map(|m| {
            let style: String = (0..props)
                .filter(|p| p % count == m)
                .map(|p| format!("prop{p}: {m}; "))
                .collect();
            Mixin::new(format!("m{m}")).with("bench", style)
        })
        .collect()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("style");
    for &n in &[4usize, 16, 64] {
        let raw = gen_style(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("parse_n{n}"), |b| {
            b.iter(|| black_box(parse_style(black_box(&raw))));
        });
        let parsed = parse_style(&raw);
        group.bench_function(format!("stringify_n{n}"), |b| {
            b.iter(|| black_box(stringify(black_box(&parsed))));
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    for &(mixins, props) in &[(1usize, 8usize), (4, 32), (8, 64)] {
        let schema = gen_schema(props);
        let sources = gen_mixins(mixins, props);
        let direct = parse_style(&gen_style(props / 2));
        group.throughput(Throughput::Elements(props as u64));
        group.bench_function(format!("three_layers_m{mixins}_p{props}"), |b| {
            b.iter(|| {
                let layer = resolve_mixins(&sources, "bench", scenery_attr::parse);
                black_box(data::resolve(&schema, layer, Some(direct.clone())))
            });
        });
        group.bench_function(format!("coerce_p{props}"), |b| {
            b.iter_batched(
                || direct.clone(),
                |d| black_box(coerce(d, schema.defaults())),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_set_attribute(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene");
    for &n in &[16usize, 256] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("attach_transforms_n{n}"), |b| {
            b.iter_batched(
                || Scene::new(ComponentRegistry::with_builtins()),
                |mut scene| {
                    for i in 0..n {
                        let Ok(e) = scene.create_entity(None) else {
                            continue;
                        };
                        let _ = scene.set_attribute(e, "position", format!("{i} 0 -2"));
                        let _ = scene.set_attribute(e, "rotation", "0 45 0");
                        let _ = scene.set_attribute(
                            e,
                            "geometry",
                            AttrValue::from("primitive: box; width: 0.5"),
                        );
                    }
                    black_box(scene.tree().len());
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_resolve, bench_set_attribute);
criterion_main!(benches);

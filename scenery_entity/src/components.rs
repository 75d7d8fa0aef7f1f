// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in components that drive the entity's scene-graph node.

use scenery_attr::{Data, Value};
use scenery_tree::{Aabb3, NodeFlags, Vec3};
use tracing::warn;

use crate::component::{Component, ComponentContext};
use crate::registry::ComponentRegistry;
use crate::schema::{Schema, VALUE_KEY};

pub(crate) fn register(registry: &mut ComponentRegistry) {
    registry.insert(
        "position".into(),
        Schema::single([0.0, 0.0, 0.0]),
        Box::new(|| Box::new(Position)),
    );
    registry.insert(
        "rotation".into(),
        Schema::single([0.0, 0.0, 0.0]),
        Box::new(|| Box::new(Rotation)),
    );
    registry.insert(
        "scale".into(),
        Schema::single([1.0, 1.0, 1.0]),
        Box::new(|| Box::new(Scale)),
    );
    registry.insert(
        "visible".into(),
        Schema::single(true),
        Box::new(|| Box::new(Visible)),
    );
    registry.insert(
        "geometry".into(),
        Schema::new()
            .property("primitive", "box")
            .property("width", 1.0)
            .property("height", 1.0)
            .property("depth", 1.0)
            .property("radius", 1.0),
        Box::new(|| Box::new(Geometry)),
    );
}

fn vec3(data: &Data, fallback: Vec3) -> Vec3 {
    data.get(VALUE_KEY)
        .and_then(Value::as_vec3)
        .map_or(fallback, Vec3::from_array)
}

fn number(data: &Data, key: &str) -> f64 {
    data.get(key).and_then(Value::as_number).unwrap_or(1.0)
}

/// Node translation, written `x y z`.
#[derive(Debug, Default)]
pub struct Position;

impl Component for Position {
    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        let v = vec3(ctx.data(), Vec3::ZERO);
        if let Some(node) = ctx.node() {
            ctx.scene_mut().tree_mut().set_translation(node, v);
        }
    }

    fn remove(&mut self, ctx: &mut ComponentContext<'_>) {
        if let Some(node) = ctx.node() {
            ctx.scene_mut().tree_mut().set_translation(node, Vec3::ZERO);
        }
    }
}

/// Node rotation as XYZ Euler angles in degrees.
#[derive(Debug, Default)]
pub struct Rotation;

impl Component for Rotation {
    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        let deg = vec3(ctx.data(), Vec3::ZERO);
        let rad = Vec3::new(deg.x.to_radians(), deg.y.to_radians(), deg.z.to_radians());
        if let Some(node) = ctx.node() {
            ctx.scene_mut().tree_mut().set_rotation(node, rad);
        }
    }

    fn remove(&mut self, ctx: &mut ComponentContext<'_>) {
        if let Some(node) = ctx.node() {
            ctx.scene_mut().tree_mut().set_rotation(node, Vec3::ZERO);
        }
    }
}

/// Node scale per axis.
#[derive(Debug, Default)]
pub struct Scale;

impl Component for Scale {
    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        let v = vec3(ctx.data(), Vec3::ONE);
        if let Some(node) = ctx.node() {
            ctx.scene_mut().tree_mut().set_scale(node, v);
        }
    }

    fn remove(&mut self, ctx: &mut ComponentContext<'_>) {
        if let Some(node) = ctx.node() {
            ctx.scene_mut().tree_mut().set_scale(node, Vec3::ONE);
        }
    }
}

/// Whether the node and its subtree take part in ray queries.
#[derive(Debug, Default)]
pub struct Visible;

impl Visible {
    fn apply(ctx: &mut ComponentContext<'_>, visible: bool) {
        let Some(node) = ctx.node() else {
            return;
        };
        let tree = ctx.scene_mut().tree_mut();
        let Some(mut flags) = tree.local(node).map(|l| l.flags) else {
            return;
        };
        flags.set(NodeFlags::VISIBLE, visible);
        tree.set_flags(node, flags);
    }
}

impl Component for Visible {
    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        let visible = ctx
            .data()
            .get(VALUE_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(true);
        Self::apply(ctx, visible);
    }

    fn remove(&mut self, ctx: &mut ComponentContext<'_>) {
        Self::apply(ctx, true);
    }
}

/// Pickable extent of the node.
///
/// `box` uses `width`/`height`/`depth`. `sphere` is approximated by its
/// bounding cube of side `2 * radius`.
#[derive(Debug, Default)]
pub struct Geometry;

impl Component for Geometry {
    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        let data = ctx.data();
        let size = match data.get("primitive").and_then(Value::as_str) {
            Some("box") => Some(Vec3::new(
                number(data, "width"),
                number(data, "height"),
                number(data, "depth"),
            )),
            Some("sphere") => {
                let d = 2.0 * number(data, "radius");
                Some(Vec3::new(d, d, d))
            }
            other => {
                warn!(entity = %ctx.entity(), primitive = ?other, "unknown primitive, node left unpickable");
                None
            }
        };
        let bounds = size.map(|s| Aabb3::from_center_size(Vec3::ZERO, s));
        if let Some(node) = ctx.node() {
            ctx.scene_mut().tree_mut().set_bounds(node, bounds);
        }
    }

    fn remove(&mut self, ctx: &mut ComponentContext<'_>) {
        if let Some(node) = ctx.node() {
            ctx.scene_mut().tree_mut().set_bounds(node, None);
        }
    }
}

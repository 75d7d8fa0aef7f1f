// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component data from three layers: schema defaults, mixins, and the entity.
//!
//! Run:
//! - `cargo run -p scenery_demos --example mixins`

use scenery_attr::{Mixin, Value};
use scenery_entity::{
    Component, ComponentContext, ComponentRegistry, Result, Scene, Schema,
};
use tracing::info;

/// Prints every data change it sees.
#[derive(Debug, Default)]
struct Light;

impl Component for Light {
    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        info!(
            entity = %ctx.entity(),
            from = %self.stringify(ctx.previous_data()),
            to = %self.stringify(ctx.data()),
            "light changed"
        );
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut registry = ComponentRegistry::with_builtins();
    registry.register::<Light>(
        "light",
        Schema::new()
            .property("color", "white")
            .property("intensity", 1.0)
            .property("castShadow", false),
    )?;
    let mut scene = Scene::new(registry);

    scene.register_mixin(Mixin::new("warm").with("light", "color: orange; intensity: 0.6"));
    scene.register_mixin(Mixin::new("bright").with("light", "intensity: 2"));

    let lamp = scene.create_entity(None)?;

    println!("== Mixins only ==");
    scene.set_mixins(lamp, ["warm", "bright"])?;
    println!("  {}", scene.stringify_component(lamp, "light")?);

    println!("== Entity attribute on top ==");
    scene.set_attribute(lamp, "light", "cast-shadow: true; intensity: oops")?;
    let data = scene.get_data(lamp, "light")?;
    println!("  {}", scene.stringify_component(lamp, "light")?);
    // The malformed intensity falls back to the mixin layer.
    assert_eq!(data["intensity"], Value::Number(2.0));
    assert_eq!(data["castShadow"], Value::Bool(true));
    assert_eq!(data["color"], Value::String("orange".into()));

    println!("== Mixin order flipped ==");
    scene.set_mixins(lamp, ["bright", "warm"])?;
    println!("  {}", scene.stringify_component(lamp, "light")?);

    println!("== Attribute and mixins removed ==");
    scene.remove_attribute(lamp, "light")?;
    scene.set_mixins(lamp, Vec::<String>::new())?;
    println!("  attached: {}", scene.has_component(lamp, "light"));
    Ok(())
}

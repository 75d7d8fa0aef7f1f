// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A fuse (gaze) cursor sweeping across two buttons.
//!
//! The cursor hangs one unit in front of the camera. Turning the camera moves
//! the ray; dwelling on a button for the fuse timeout clicks it.
//!
//! Run:
//! - `cargo run -p scenery_demos --example gaze_cursor`
//! - `RUST_LOG=scenery_entity=trace cargo run -p scenery_demos --example gaze_cursor`

use std::cell::RefCell;
use std::rc::Rc;

use scenery_cursor::{CURSOR, RAYCASTER};
use scenery_entity::event::names;
use scenery_entity::{ComponentRegistry, EntityId, Result, Scene};

fn button(scene: &mut Scene, x: f64, log: &Rc<RefCell<Vec<String>>>, label: &str) -> Result<EntityId> {
    let e = scene.create_entity(None)?;
    scene.set_attribute(e, "position", format!("{x} 0 -4"))?;
    scene.set_attribute(e, "geometry", "primitive: box; width: 1.5")?;
    for name in [names::MOUSEENTER, names::MOUSELEAVE, names::CLICK] {
        let log = Rc::clone(log);
        let label = label.to_owned();
        scene.add_event_listener(e, name, move |ev| {
            log.borrow_mut().push(format!("{label}: {}", ev.name));
        })?;
    }
    Ok(e)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut registry = ComponentRegistry::with_builtins();
    scenery_cursor::register(&mut registry)?;
    let mut scene = Scene::new(registry);

    let camera = scene.create_entity(None)?;
    let cursor = scene.create_entity(Some(camera))?;
    scene.set_attribute(cursor, "position", "0 0 -1")?;
    scene.set_attribute(cursor, "geometry", "primitive: sphere; radius: 0.02")?;
    scene.set_attribute(cursor, RAYCASTER, "interval: 50")?;
    scene.set_attribute(cursor, CURSOR, "fuse: true; timeout: 600")?;

    let log = Rc::new(RefCell::new(Vec::new()));
    let left = button(&mut scene, -2.0, &log, "left")?;
    button(&mut scene, 2.0, &log, "right")?;

    // Turning left by about 26.6 degrees aims at (-2, 0, -4).
    let aim_left = (2.0_f64 / 4.0).atan().to_degrees();

    println!("== Glance at the left button, then look away ==");
    scene.set_attribute(camera, "rotation", format!("0 {aim_left} 0"))?;
    scene.advance_by(300);
    println!("  left hovered: {}", scene.is_state(left, names::STATE_HOVERED));
    scene.set_attribute(camera, "rotation", "0 0 0")?;
    scene.advance_by(1000);

    println!("== Dwell on the right button ==");
    scene.set_attribute(camera, "rotation", format!("0 {} 0", -aim_left))?;
    scene.advance_by(1000);
    println!("  cursor hovering: {}", scene.is_state(cursor, names::STATE_HOVERING));

    println!("== Listener log ==");
    for line in log.borrow().iter() {
        println!("  {line}");
    }
    assert_eq!(
        *log.borrow(),
        [
            "left: mouseenter",
            "left: mouseleave",
            "right: mouseenter",
            "right: click",
        ]
    );
    Ok(())
}

// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scenery Cursor: ray-driven pointer interaction for scenery scenes.
//!
//! Two components, registered with [`register`]:
//!
//! - `raycaster` (`interval`, default 100): casts a ray from its parent
//!   entity through its own entity, finds the nearest other entity, and
//!   reports changes as `intersection` / `intersectioncleared` events on its
//!   entity. See [`Raycaster`].
//! - `cursor` (`timeout` 0, `maxDistance` 5, `fuse` false; needs
//!   `raycaster`): turns those reports and pointer input into hover states,
//!   `mouseenter`/`mouseleave`/`hover`, `mousedown`/`mouseup`, and `click`.
//!   See [`Cursor`].
//!
//! The pieces are usable on their own: [`tracker`] holds the ray query and
//! the closest-hit tracking, and [`state`] holds the cursor's pure state
//! machine.
//!
//! ## Example
//!
//! A gaze cursor one unit in front of the camera, with a box further out:
//!
//! ```
//! use scenery_cursor::{CURSOR, RAYCASTER};
//! use scenery_entity::{ComponentRegistry, Scene};
//!
//! let mut registry = ComponentRegistry::with_builtins();
//! scenery_cursor::register(&mut registry).unwrap();
//! let mut scene = Scene::new(registry);
//!
//! let camera = scene.create_entity(None).unwrap();
//! let cursor = scene.create_entity(Some(camera)).unwrap();
//! scene.set_attribute(cursor, "position", "0 0 -1").unwrap();
//! scene.set_attribute(cursor, RAYCASTER, "").unwrap();
//! scene.set_attribute(cursor, CURSOR, "").unwrap();
//!
//! let button = scene.create_entity(None).unwrap();
//! scene.set_attribute(button, "position", "0 0 -3").unwrap();
//! scene.set_attribute(button, "geometry", "primitive: box").unwrap();
//!
//! // The first poll finds the box.
//! scene.advance_by(100);
//! assert!(scene.is_state(button, "hovered"));
//! assert!(scene.is_state(cursor, "hovering"));
//! ```

pub mod config;
mod cursor;
mod raycaster;
pub mod state;
pub mod tracker;

pub use config::{CursorConfig, RaycasterConfig};
pub use cursor::Cursor;
pub use raycaster::Raycaster;

use scenery_entity::{ComponentRegistry, Result};

/// Registered name of [`Raycaster`].
pub const RAYCASTER: &str = "raycaster";

/// Registered name of [`Cursor`].
pub const CURSOR: &str = "cursor";

/// Add `raycaster` and `cursor` to `registry`.
pub fn register(registry: &mut ComponentRegistry) -> Result<()> {
    registry.register::<Raycaster>(RAYCASTER, RaycasterConfig::schema())?;
    registry.register::<Cursor>(CURSOR, CursorConfig::schema())
}

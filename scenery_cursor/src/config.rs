// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed views of the `raycaster` and `cursor` component data.

use scenery_attr::{Data, Value};
use scenery_entity::Schema;

/// Poll period used when `interval` is missing.
pub const DEFAULT_INTERVAL: u64 = 100;

/// Hover range used when `maxDistance` is missing.
pub const DEFAULT_MAX_DISTANCE: f64 = 5.0;

/// Settings of the `raycaster` component.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RaycasterConfig {
    /// Time units between polls.
    pub interval: u64,
}

impl Default for RaycasterConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl RaycasterConfig {
    /// Schema registered for `raycaster`.
    pub fn schema() -> Schema {
        Schema::new().property("interval", DEFAULT_INTERVAL as f64)
    }

    /// Read resolved component data.
    pub fn from_data(data: &Data) -> Self {
        Self {
            interval: time_units(data, "interval").unwrap_or(DEFAULT_INTERVAL),
        }
    }
}

/// Settings of the `cursor` component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CursorConfig {
    /// Fuse delay in time units. `0` disables the fuse.
    pub timeout: u64,
    /// Targets at or beyond this distance are not hovered.
    pub max_distance: f64,
    /// Click by dwelling instead of by pointer.
    pub fuse: bool,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            timeout: 0,
            max_distance: DEFAULT_MAX_DISTANCE,
            fuse: false,
        }
    }
}

impl CursorConfig {
    /// Schema registered for `cursor`. It depends on `raycaster`.
    pub fn schema() -> Schema {
        Schema::new()
            .property("timeout", 0.0)
            .property("maxDistance", DEFAULT_MAX_DISTANCE)
            .property("fuse", false)
            .depends_on("raycaster")
    }

    /// Read resolved component data.
    pub fn from_data(data: &Data) -> Self {
        let d = Self::default();
        Self {
            timeout: time_units(data, "timeout").unwrap_or(d.timeout),
            max_distance: data
                .get("maxDistance")
                .and_then(Value::as_number)
                .unwrap_or(d.max_distance),
            fuse: data.get("fuse").and_then(Value::as_bool).unwrap_or(d.fuse),
        }
    }

    /// True when an enter arms the fuse timer.
    pub fn fuse_armed(&self) -> bool {
        self.fuse && self.timeout > 0
    }
}

/// A non-negative whole number of time units. Fractions are truncated.
fn time_units(data: &Data, key: &str) -> Option<u64> {
    let n = data.get(key).and_then(Value::as_number)?;
    if !n.is_finite() || n < 0.0 {
        return None;
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Checked finite and non-negative; saturating float-to-int cast is intended."
    )]
    Some(n as u64)
}

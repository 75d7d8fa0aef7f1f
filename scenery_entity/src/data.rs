// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data resolution: defaults, mixins, and the direct attribute, layered.
//!
//! Precedence, low to high: schema default, mixins (first listed lowest), the
//! entity's own attribute. Each layer is coerced against the defaults before it
//! is overlaid, so a malformed value in a higher layer falls through to the
//! next layer down instead of erasing it.

use scenery_attr::{Data, coerce};
use tracing::trace;

use crate::schema::Schema;

/// Merge the layers for one component into fully typed data.
///
/// The result always contains every schema property. Keys the schema does not
/// declare are carried through untyped.
pub fn resolve(schema: &Schema, mixin_layer: Data, direct_layer: Option<Data>) -> Data {
    let defaults = schema.defaults();
    let mut out = defaults.clone();
    out.extend(coerce(mixin_layer, defaults));
    if let Some(direct) = direct_layer {
        out.extend(coerce(direct, defaults));
    }
    coerce(out, defaults)
}

/// Current and previous resolved data of one component instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComponentData {
    current: Data,
    previous: Data,
}

impl ComponentData {
    /// Data as of the last resolution.
    pub fn current(&self) -> &Data {
        &self.current
    }

    /// Data before the last resolution.
    pub fn previous(&self) -> &Data {
        &self.previous
    }

    /// Store freshly resolved data.
    ///
    /// `previous` always becomes the pre-call `current`. Returns `true` when
    /// `next` differs from `current`, meaning the component's `update` hook
    /// should run.
    pub fn update_attributes(&mut self, next: Data) -> bool {
        self.previous = self.current.clone();
        if next == self.current {
            trace!("resolved data unchanged");
            return false;
        }
        self.current = next;
        true
    }

    /// Set the first resolution on attach. Always reports a change.
    pub(crate) fn initialize(&mut self, next: Data) {
        self.previous = Data::new();
        self.current = next;
    }
}

// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component instance lifecycle.

use crate::component::Component;
use crate::data::ComponentData;

/// Where a component instance is in its life.
///
/// `Uninitialized → Initialized → Removed`. `Removed` is terminal.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum LifecycleState {
    /// Created, `init` not yet run.
    #[default]
    Uninitialized,
    /// `init` and the first `update` have run.
    Initialized,
    /// `remove` has run.
    Removed,
}

/// One component attached to one entity.
#[derive(Debug)]
pub(crate) struct ComponentInstance {
    pub(crate) name: String,
    pub(crate) behavior: Box<dyn Component>,
    pub(crate) data: ComponentData,
    pub(crate) state: LifecycleState,
}

impl ComponentInstance {
    pub(crate) fn new(name: impl Into<String>, behavior: Box<dyn Component>) -> Self {
        Self {
            name: name.into(),
            behavior,
            data: ComponentData::default(),
            state: LifecycleState::Uninitialized,
        }
    }
}

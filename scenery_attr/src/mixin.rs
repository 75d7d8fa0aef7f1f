// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mixins: reusable, named bags of component attributes.
//!
//! An entity lists mixin ids in order. For a given component, the mixins are
//! overlaid first to last, so a later mixin overrides an earlier one. All
//! mixins rank below the entity's own attributes.

use alloc::collections::BTreeMap;
use alloc::string::String;

use crate::value::{AttrValue, Data};

/// A named source of component attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mixin {
    id: String,
    attributes: BTreeMap<String, AttrValue>,
}

impl Mixin {
    /// Create an empty mixin.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder form of [`Mixin::set`].
    #[must_use]
    pub fn with(mut self, component: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set(component, value);
        self
    }

    /// The mixin id entities refer to.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Set the attribute for `component`, returning the previous one.
    pub fn set(
        &mut self,
        component: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> Option<AttrValue> {
        self.attributes.insert(component.into(), value.into())
    }

    /// Remove the attribute for `component`.
    pub fn remove(&mut self, component: &str) -> Option<AttrValue> {
        self.attributes.remove(component)
    }

    /// The attribute for `component`, if this mixin carries one.
    pub fn get(&self, component: &str) -> Option<&AttrValue> {
        self.attributes.get(component)
    }

    /// Names of the components this mixin carries, in name order.
    pub fn components(&self) -> impl Iterator<Item = &str> + '_ {
        self.attributes.keys().map(String::as_str)
    }
}

/// Merge the data every source carries for `component`.
///
/// Sources are applied in iteration order with a shallow overlay (later wins
/// per key). Sources without the component contribute nothing. `parse` turns
/// each raw attribute into data and is normally the component's own parser.
pub fn resolve_mixins<'a, I, F>(sources: I, component: &str, mut parse: F) -> Data
where
    I: IntoIterator<Item = &'a Mixin>,
    F: FnMut(&AttrValue) -> Data,
{
    let mut acc = Data::new();
    for mixin in sources {
        if let Some(raw) = mixin.get(component) {
            acc.extend(parse(raw));
        }
    }
    acc
}

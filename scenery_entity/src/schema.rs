// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component schemas: typed defaults and dependencies.

use scenery_attr::{AttrValue, Data, Value};

/// Key under which a single-property schema stores its value.
pub const VALUE_KEY: &str = "value";

/// The declared shape of a component's data.
///
/// Each property's default decides what type raw input is coerced to. A
/// *single-property* schema (see [`Schema::single`]) reads the whole attribute
/// as one value, so `position` is written `"0 1 -3"` rather than
/// `"value: 0 1 -3"`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    defaults: Data,
    dependencies: Vec<String>,
    single: bool,
}

impl Schema {
    /// An empty multi-property schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// A schema whose attribute is one value of the same type as `default`.
    pub fn single(default: impl Into<Value>) -> Self {
        let mut defaults = Data::new();
        defaults.insert(VALUE_KEY.into(), default.into());
        Self {
            defaults,
            dependencies: Vec::new(),
            single: true,
        }
    }

    /// Builder: declare a property and its default.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.defaults.insert(name.into(), default.into());
        self
    }

    /// Builder: require another component to be attached first.
    #[must_use]
    pub fn depends_on(mut self, component: impl Into<String>) -> Self {
        self.dependencies.push(component.into());
        self
    }

    /// Property defaults.
    pub fn defaults(&self) -> &Data {
        &self.defaults
    }

    /// Required components, in declaration order.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// True for single-property schemas.
    pub fn is_single(&self) -> bool {
        self.single
    }

    /// Parse a raw single-property attribute: the trimmed text becomes the value.
    pub(crate) fn parse_single(raw: &AttrValue) -> Data {
        match raw {
            AttrValue::Text(text) => {
                let mut data = Data::new();
                let text = text.trim();
                if !text.is_empty() {
                    data.insert(VALUE_KEY.into(), Value::from(text));
                }
                data
            }
            AttrValue::Data(data) => data.clone(),
        }
    }

    pub(crate) fn validate(&self, component: &str) -> Result<(), String> {
        if component.is_empty() {
            return Err("component name is empty".into());
        }
        for (i, dep) in self.dependencies.iter().enumerate() {
            if dep == component {
                return Err("component depends on itself".into());
            }
            if self.dependencies[..i].contains(dep) {
                return Err(format!("dependency {dep} is listed twice"));
            }
        }
        if self.single && self.defaults.len() != 1 {
            return Err("single-property schema declares extra properties".into());
        }
        Ok(())
    }
}

// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed property values and raw attribute input.
//!
//! ## Overview
//!
//! A component's resolved data is a [`Data`] map from property name to [`Value`].
//! What an author writes on an entity is an [`AttrValue`]: either the style-like
//! mini-language string, or data that was already structured by program code.

use alloc::collections::BTreeMap;
use alloc::string::String;
use core::fmt;

/// A typed property value.
///
/// The variant of a schema default decides what raw input is coerced into
/// (see [`coerce`](crate::coerce::coerce)).
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// `true` or `false`.
    Bool(bool),
    /// A finite or infinite number; never NaN once coerced.
    Number(f64),
    /// Free-form text.
    String(String),
    /// A three-component vector, written `x y z`.
    Vec3([f64; 3]),
}

/// The runtime type of a [`Value`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ValueKind {
    /// [`Value::Bool`]
    Bool,
    /// [`Value::Number`]
    Number,
    /// [`Value::String`]
    String,
    /// [`Value::Vec3`]
    Vec3,
}

impl Value {
    /// The runtime type of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
            Self::Vec3(_) => ValueKind::Vec3,
        }
    }

    /// Returns the boolean if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number if this is a [`Value::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the components if this is a [`Value::Vec3`].
    pub fn as_vec3(&self) -> Option<[f64; 3]> {
        match self {
            Self::Vec3(v) => Some(*v),
            _ => None,
        }
    }
}

/// Renders the value in the form the attribute parser accepts back.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Vec3([x, y, z]) => write!(f, "{x} {y} {z}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<[f64; 3]> for Value {
    fn from(v: [f64; 3]) -> Self {
        Self::Vec3(v)
    }
}

/// Resolved component data: property name to typed value, in key order.
pub type Data = BTreeMap<String, Value>;

/// A raw attribute as written on an entity or a mixin.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    /// Style-like text, e.g. `"timeout: 500; max-distance: 3"`.
    Text(String),
    /// Already-structured data, accepted as-is by [`parse`](crate::style::parse).
    Data(Data),
}

impl Default for AttrValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.into())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Data> for AttrValue {
    fn from(data: Data) -> Self {
        Self::Data(data)
    }
}

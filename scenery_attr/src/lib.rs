// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scenery Attr: the attribute mini-language behind Scenery components.
//!
//! ## Overview
//!
//! Entities carry component attributes written as style-like text
//! (`"timeout: 500; max-distance: 3"`). This crate turns that text into typed data:
//!
//! - [`style`]: split text into a flat, camel-cased key → string map, and serialize data back.
//! - [`coerce`]: convert each value to the type of the matching schema default.
//! - [`mixin`]: merge named attribute sources with "later wins" precedence.
//!
//! Nothing here fails. Malformed fragments and values are dropped one by one so
//! that a resolution layered on top (defaults, then mixins, then the attribute)
//! always ends up complete and fully typed.
//!
//! ## Example
//!
//! ```
//! use scenery_attr::{Data, Value, coerce, parse_style, stringify};
//!
//! let mut defaults = Data::new();
//! defaults.insert("timeout".into(), Value::Number(0.0));
//! defaults.insert("fuse".into(), Value::Bool(false));
//!
//! let data = coerce(parse_style("timeout: 500; fuse: true; junk"), &defaults);
//! assert_eq!(data["timeout"], Value::Number(500.0));
//! assert_eq!(data["fuse"], Value::Bool(true));
//!
//! // Serialization reads back to the same data.
//! assert_eq!(coerce(parse_style(&stringify(&data)), &defaults), data);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod coerce;
pub mod mixin;
pub mod style;
pub mod value;

pub use coerce::{coerce, coerce_value};
pub use mixin::{Mixin, resolve_mixins};
pub use style::{parse, parse_style, stringify, to_camel_case};
pub use value::{AttrValue, Data, Value, ValueKind};

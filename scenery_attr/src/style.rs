// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The style-like attribute mini-language.
//!
//! ## Grammar
//!
//! `key: value; key: value`. Fragments are separated by `;`. Each fragment is
//! split on its first `:` and both sides are trimmed. Keys may be written in
//! hyphen or camel case; `max-value` and `maxValue` name the same property.
//!
//! Parsing never fails. A fragment that is empty, has no `:`, or has an empty
//! key is skipped, and the property keeps whatever a lower layer provides.

use alloc::string::{String, ToString};
use core::fmt::Write;

use crate::value::{AttrValue, Data, Value};

/// Convert a hyphenated key to camel case (`max-value` → `maxValue`).
///
/// Every `-` directly followed by an ASCII lowercase letter is removed and the
/// letter upper-cased; other characters are copied unchanged.
pub fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '-'
            && let Some(&next) = chars.peek()
            && next.is_ascii_lowercase()
        {
            out.push(next.to_ascii_uppercase());
            chars.next();
            continue;
        }
        out.push(c);
    }
    out
}

/// Parse style-like text into a flat map of string values with camel-cased keys.
///
/// Values stay [`Value::String`]; converting them is the job of
/// [`coerce`](crate::coerce::coerce). Later duplicates of a key win.
pub fn parse_style(raw: &str) -> Data {
    let mut out = Data::new();
    for fragment in raw.split(';') {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        let Some((key, value)) = fragment.split_once(':') else {
            tracing::trace!(fragment, "skipping attribute fragment without `:`");
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            tracing::trace!(fragment, "skipping attribute fragment with an empty key");
            continue;
        }
        out.insert(to_camel_case(key), Value::String(value.trim().to_string()));
    }
    out
}

/// Default attribute deserializer.
///
/// Text goes through [`parse_style`]; structured data is returned unchanged.
pub fn parse(value: &AttrValue) -> Data {
    match value {
        AttrValue::Text(raw) => parse_style(raw),
        AttrValue::Data(data) => data.clone(),
    }
}

/// Default attribute serializer: `key: value` pairs joined by `; `, in key order.
pub fn stringify(data: &Data) -> String {
    let mut out = String::new();
    for (i, (key, value)) in data.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        // Writing into a String cannot fail.
        let _ = write!(out, "{key}: {value}");
    }
    out
}

// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Schema coercion: convert raw values to the type of each property's default.
//!
//! ## Rules
//!
//! | default  | accepted input                                           |
//! |----------|----------------------------------------------------------|
//! | `Bool`   | `Bool`, or the strings `true` / `false`                  |
//! | `Number` | `Number` (not NaN), or a string that parses as `f64`     |
//! | `String` | any scalar; non-strings are rendered with `Display`      |
//! | `Vec3`   | `Vec3`, or 1–3 whitespace-separated numbers              |
//!
//! A `Vec3` string with fewer than three parts keeps the default's trailing
//! components (`"2"` against a default of `0 0 1` gives `2 0 1`).
//!
//! Input that does not fit is dropped rather than stored, so the property
//! falls back to the next lower layer (mixin, then default). Keys that have no
//! default pass through untouched.

use alloc::string::ToString;

use crate::value::{Data, Value};

/// Coerce one value against a schema default. Returns `None` when the input is malformed.
pub fn coerce_value(value: &Value, default: &Value) -> Option<Value> {
    match (default, value) {
        (Value::Bool(_), Value::Bool(b)) => Some(Value::Bool(*b)),
        (Value::Bool(_), Value::String(s)) => match s.trim() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        (Value::Number(_), Value::Number(n)) => (!n.is_nan()).then_some(Value::Number(*n)),
        (Value::Number(_), Value::String(s)) => parse_number(s).map(Value::Number),
        (Value::String(_), Value::String(_)) => Some(value.clone()),
        (Value::String(_), other) => Some(Value::String(other.to_string())),
        (Value::Vec3(_), Value::Vec3(v)) => v.iter().all(|c| !c.is_nan()).then_some(Value::Vec3(*v)),
        (Value::Vec3(fallback), Value::String(s)) => parse_vec3(s, *fallback).map(Value::Vec3),
        _ => None,
    }
}

/// Coerce every value in `data` that has a default in `defaults`.
///
/// Malformed values are removed from the result; unknown keys are kept as-is.
pub fn coerce(data: Data, defaults: &Data) -> Data {
    let mut out = Data::new();
    for (key, value) in data {
        let Some(default) = defaults.get(&key) else {
            out.insert(key, value);
            continue;
        };
        match coerce_value(&value, default) {
            Some(coerced) => {
                out.insert(key, coerced);
            }
            None => {
                tracing::debug!(
                    key = key.as_str(),
                    value = ?value,
                    expected = ?default.kind(),
                    "dropping value that does not match its schema type"
                );
            }
        }
    }
    out
}

fn parse_number(s: &str) -> Option<f64> {
    let n: f64 = s.trim().parse().ok()?;
    (!n.is_nan()).then_some(n)
}

fn parse_vec3(s: &str, fallback: [f64; 3]) -> Option<[f64; 3]> {
    let mut out = fallback;
    let mut count = 0;
    for part in s.split_whitespace() {
        if count == 3 {
            return None;
        }
        out[count] = parse_number(part)?;
        count += 1;
    }
    (count > 0).then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{parse_style, stringify};

    fn defaults() -> Data {
        let mut d = Data::new();
        d.insert("timeout".into(), Value::Number(0.0));
        d.insert("maxDistance".into(), Value::Number(5.0));
        d.insert("fuse".into(), Value::Bool(false));
        d.insert("label".into(), Value::from("none"));
        d.insert("offset".into(), Value::Vec3([0.0, 0.0, 1.0]));
        d
    }

    #[test]
    fn strings_become_schema_types() {
        let raw = parse_style("timeout: 500; max-distance: 2.5; fuse: true; label: go; offset: 1 2 3");
        let out = coerce(raw, &defaults());
        assert_eq!(out["timeout"], Value::Number(500.0));
        assert_eq!(out["maxDistance"], Value::Number(2.5));
        assert_eq!(out["fuse"], Value::Bool(true));
        assert_eq!(out["label"], Value::from("go"));
        assert_eq!(out["offset"], Value::Vec3([1.0, 2.0, 3.0]));
    }

    #[test]
    fn malformed_values_are_dropped() {
        let raw = parse_style("timeout: soon; fuse: yes; offset: 1 2 3 4; maxDistance: NaN");
        let out = coerce(raw, &defaults());
        assert!(out.is_empty(), "nothing should survive: {out:?}");
    }

    #[test]
    fn unknown_keys_pass_through() {
        let raw = parse_style("extra: 42");
        let out = coerce(raw, &defaults());
        assert_eq!(out["extra"], Value::from("42"));
    }

    #[test]
    fn short_vec3_keeps_default_tail() {
        let d = defaults();
        let v = coerce_value(&Value::from("2"), &d["offset"]);
        assert_eq!(v, Some(Value::Vec3([2.0, 0.0, 1.0])));
        assert_eq!(coerce_value(&Value::from("   "), &d["offset"]), None);
    }

    #[test]
    fn typed_values_are_kept_and_scalars_render_to_strings() {
        let d = defaults();
        assert_eq!(
            coerce_value(&Value::Number(3.0), &d["timeout"]),
            Some(Value::Number(3.0))
        );
        assert_eq!(
            coerce_value(&Value::Number(3.0), &d["label"]),
            Some(Value::from("3"))
        );
        assert_eq!(coerce_value(&Value::Bool(true), &d["timeout"]), None);
        assert_eq!(coerce_value(&Value::Number(f64::NAN), &d["timeout"]), None);
    }

    #[test]
    fn round_trip_through_text() {
        let d = defaults();
        let mut m = Data::new();
        m.insert("timeout".into(), Value::Number(1500.0));
        m.insert("maxDistance".into(), Value::Number(0.125));
        m.insert("fuse".into(), Value::Bool(true));
        m.insert("label".into(), Value::from("hello world"));
        m.insert("offset".into(), Value::Vec3([-1.5, 0.0, 1e-3]));
        let text = stringify(&m);
        assert_eq!(coerce(parse_style(&text), &d), m);
    }

    #[test]
    fn round_trip_holds_for_defaults_themselves() {
        let d = defaults();
        assert_eq!(coerce(parse_style(&stringify(&d)), &d), d);
    }
}

//! Value coercion engine.
//!
//! Decides, for one raw value and one expected type, whether the value is
//! accepted as-is, accepted through a well-defined conversion, or rejected.
//! The rules are deliberately asymmetric:
//! - numeric-looking strings convert to numbers, scalars convert to strings;
//! - sequences and objects never convert to scalars;
//! - `array` only ever accepts a sequence.
//!
//! A rejection always carries the debug type of the raw value as supplied,
//! captured before any conversion is attempted.
pub mod boolean;
pub mod num;
pub mod str;

use indexmap::IndexMap;

use crate::context::Context;
use crate::record::Typed;
use crate::types::{Kind, TypeDescriptor};
use crate::value::{DebugType, Value};

/// Outcome of checking one raw value against one expected type.
#[derive(Debug, Clone, PartialEq)]
pub enum Coercion<'a> {
    Coerced(Typed),
    /// Compatible container; its entries are checked against their own
    /// declared types by the caller.
    Entries(Entries<'a>),
    Rejected(DebugType),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entries<'a> {
    Items(&'a [Value]),
    Keyed(&'a IndexMap<String, Value>),
}

pub fn coerce<'a>(raw: &'a Value, expected: &TypeDescriptor, ctx: &Context) -> Coercion<'a> {
    let current = raw.debug_type();

    if raw.is_null() {
        return if expected.nullable { Coercion::Coerced(Typed::Null) } else { Coercion::Rejected(current) };
    }

    let coerced = match &expected.kind {
        Kind::Bool => to_bool(raw, ctx),
        Kind::Int => to_int(raw),
        Kind::Float => to_float(raw),
        Kind::String => to_string(raw),
        Kind::Array(None) => match raw {
            Value::List(_) | Value::Map(_) => Some(Typed::Array(raw.clone())),
            _ => None,
        },
        Kind::Array(Some(_)) => {
            return match raw {
                Value::List(xs) => Coercion::Entries(Entries::Items(xs)),
                Value::Map(m) => Coercion::Entries(Entries::Keyed(m)),
                _ => Coercion::Rejected(current),
            };
        }
        Kind::Object(class) => {
            return match raw {
                Value::Map(m) => Coercion::Entries(Entries::Keyed(m)),
                Value::Object { class: c, fields } if c == class => Coercion::Entries(Entries::Keyed(fields)),
                _ => Coercion::Rejected(current),
            };
        }
    };

    match coerced {
        Some(t) => Coercion::Coerced(t),
        None => Coercion::Rejected(current),
    }
}

fn to_bool(raw: &Value, ctx: &Context) -> Option<Typed> {
    match raw {
        Value::Bool(b) => Some(Typed::Bool(*b)),
        Value::Int(_) | Value::String(_) if ctx.filter_bool => boolean::filter_bool(raw).map(Typed::Bool),
        _ => None,
    }
}

fn to_int(raw: &Value) -> Option<Typed> {
    match raw {
        Value::Int(i) => Some(Typed::Int(*i)),
        Value::Bool(b) => Some(Typed::Int(i64::from(*b))),
        Value::Float(f) => num::float_to_int(f.0).map(Typed::Int),
        Value::String(s) => num::parse_int(s).map(Typed::Int),
        _ => None,
    }
}

fn to_float(raw: &Value) -> Option<Typed> {
    match raw {
        Value::Float(f) if f.0.is_finite() => Some(Typed::Float(f.0)),
        Value::Int(i) => Some(Typed::Float(*i as f64)),
        Value::Bool(b) => Some(Typed::Float(if *b { 1.0 } else { 0.0 })),
        Value::String(s) => num::parse_float(s).map(Typed::Float),
        _ => None,
    }
}

fn to_string(raw: &Value) -> Option<Typed> {
    match raw {
        Value::String(s) => Some(Typed::String(s.clone())),
        Value::Bool(b) => Some(Typed::String(str::bool_to_string(*b))),
        Value::Int(i) => Some(Typed::String(i.to_string())),
        Value::Float(f) => Some(Typed::String(str::float_to_string(f.0))),
        _ => None,
    }
}

// ------------------------------- Tests ------------------------------------ //

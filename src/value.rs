//! Loosely-typed input values and the runtime-type classifier.
//!
//! `Value` is what a denormalizer receives: decoded document data where
//! sequences and associative maps share the "array" runtime category and
//! objects carry the name of their class.
use std::fmt;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::is_class_name;

/// Reserved JSON key that turns a decoded object into a class instance.
pub const CLASS_KEY: &str = "@class";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    String(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Object { class: String, fields: IndexMap<String, Value> },
}

/// Canonical runtime-type name of a [`Value`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DebugType {
    Null,
    Bool,
    Int,
    Float,
    String,
    Array,
    Class(String),
}

impl DebugType {
    pub fn as_str(&self) -> &str {
        match self {
            DebugType::Null => "null",
            DebugType::Bool => "bool",
            DebugType::Int => "int",
            DebugType::Float => "float",
            DebugType::String => "string",
            DebugType::Array => "array",
            DebugType::Class(name) => name,
        }
    }
}

impl fmt::Display for DebugType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DebugType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Value {
    pub fn float(f: f64) -> Self { Value::Float(OrderedFloat(f)) }

    /// An instance of `class` with no properties.
    pub fn object(class: impl Into<String>) -> Self {
        Value::Object { class: class.into(), fields: IndexMap::new() }
    }

    /// Classify the value as supplied. Total: every value has exactly one
    /// debug type, and it never depends on any later conversion.
    pub fn debug_type(&self) -> DebugType {
        match self {
            Value::Null => DebugType::Null,
            Value::Bool(_) => DebugType::Bool,
            Value::Int(_) => DebugType::Int,
            Value::Float(_) => DebugType::Float,
            Value::String(_) => DebugType::String,
            Value::List(_) | Value::Map(_) => DebugType::Array,
            Value::Object { class, .. } => DebugType::Class(class.clone()),
        }
    }

    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    /// Keyed entries, for values that can stand in for a property bag.
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            Value::Object { fields, .. } => Some(fields),
            _ => None,
        }
    }
}

// ------------------------------ JSON bridge ------------------------------- //

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match v {
            J::Null => Value::Null,
            J::Bool(b) => Value::Bool(b),
            J::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                // u64 past i64::MAX and every non-integer literal
                None => Value::float(n.as_f64().unwrap_or(f64::NAN)),
            },
            J::String(s) => Value::String(s),
            J::Array(xs) => Value::List(xs.into_iter().map(Value::from).collect()),
            J::Object(mut m) => {
                // the tag must name a class, never a built-in type
                let tagged = matches!(m.get(CLASS_KEY), Some(J::String(c)) if is_class_name(c));
                let class = if tagged { m.shift_remove(CLASS_KEY) } else { None };
                let fields = m.into_iter().map(|(k, v)| (k, Value::from(v))).collect();
                match class {
                    Some(J::String(class)) => Value::Object { class, fields },
                    _ => Value::Map(fields),
                }
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(f.0),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(xs) => serializer.collect_seq(xs),
            Value::Map(m) => serializer.collect_map(m),
            Value::Object { class, fields } => {
                let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
                map.serialize_entry(CLASS_KEY, class)?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl Value {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

// ------------------------------- Tests ------------------------------------ //

//! Denormalized output.
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::Value;

/// A value that passed coercion against its declared type.
#[derive(Clone, Debug, PartialEq)]
pub enum Typed {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Untyped sequence, kept exactly as supplied (list or keyed).
    Array(Value),
    /// Typed collection from a list.
    List(Vec<Typed>),
    /// Typed collection from a keyed array.
    Map(IndexMap<String, Typed>),
    Object(Record),
}

/// The assembled target object.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub class: String,
    pub fields: IndexMap<String, Typed>,
}

impl Record {
    pub fn new(class: impl Into<String>) -> Self {
        Self { class: class.into(), fields: IndexMap::new() }
    }

    pub fn get(&self, field: &str) -> Option<&Typed> { self.fields.get(field) }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        match self.get(field)? { Typed::Bool(b) => Some(*b), _ => None }
    }

    pub fn get_int(&self, field: &str) -> Option<i64> {
        match self.get(field)? { Typed::Int(i) => Some(*i), _ => None }
    }

    pub fn get_float(&self, field: &str) -> Option<f64> {
        match self.get(field)? { Typed::Float(f) => Some(*f), _ => None }
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        match self.get(field)? { Typed::String(s) => Some(s), _ => None }
    }

    pub fn get_object(&self, field: &str) -> Option<&Record> {
        match self.get(field)? { Typed::Object(r) => Some(r), _ => None }
    }

    /// Plain JSON view; the class name is not included.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for Typed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Typed::Null => serializer.serialize_unit(),
            Typed::Bool(b) => serializer.serialize_bool(*b),
            Typed::Int(i) => serializer.serialize_i64(*i),
            Typed::Float(f) => serializer.serialize_f64(*f),
            Typed::String(s) => serializer.serialize_str(s),
            Typed::Array(raw) => raw.serialize(serializer),
            Typed::List(xs) => serializer.collect_seq(xs),
            Typed::Map(m) => serializer.collect_map(m),
            Typed::Object(r) => r.serialize(serializer),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

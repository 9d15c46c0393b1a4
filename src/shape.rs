//! Field tables for target classes.
//!
//! A [`Shape`] is the statically-declared mapping from field name to
//! [`TypeDescriptor`] for one class, built once and reused for every call.
//! A [`Schema`] is a registry of shapes, which is what lets a field be typed
//! as another class.
use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::SchemaError;
use crate::types::{Kind, TypeDescriptor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    class: String,
    fields: IndexMap<String, TypeDescriptor>,
}

impl Shape {
    pub fn builder(class: impl Into<String>) -> ShapeBuilder {
        ShapeBuilder { class: class.into(), fields: IndexMap::new() }
    }

    pub fn class(&self) -> &str { &self.class }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &TypeDescriptor)> {
        self.fields.iter().map(|(k, t)| (k.as_str(), t))
    }

    pub fn field(&self, name: &str) -> Option<&TypeDescriptor> { self.fields.get(name) }
}

pub struct ShapeBuilder {
    class: String,
    fields: IndexMap<String, TypeDescriptor>,
}

impl ShapeBuilder {
    /// Declare a field. Re-declaring a name replaces its type in place.
    pub fn field(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.fields.insert(name.into(), ty);
        self
    }

    pub fn build(self) -> Shape {
        Shape { class: self.class, fields: self.fields }
    }
}

// ------------------------------- Registry --------------------------------- //

#[derive(Debug, Clone, Default)]
pub struct Schema {
    shapes: IndexMap<String, Shape>,
}

/// On-disk form: `{"classes": {"TypeInt": {"field": "int"}}}`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDoc {
    classes: IndexMap<String, IndexMap<String, TypeDescriptor>>,
}

impl Schema {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, shape: Shape) -> Self {
        self.insert(shape);
        self
    }

    pub fn insert(&mut self, shape: Shape) {
        self.shapes.insert(shape.class.clone(), shape);
    }

    pub fn get(&self, class: &str) -> Option<&Shape> { self.shapes.get(class) }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }

    /// Load a schema document and check every class reference resolves.
    pub fn from_json_str(src: &str) -> Result<Self, SchemaError> {
        let doc: SchemaDoc = crate::path_de::from_str_with_path(src).map_err(SchemaError::Document)?;
        let mut schema = Schema::new();
        for (class, fields) in doc.classes {
            schema.insert(Shape { class, fields });
        }
        schema.validate()?;
        Ok(schema)
    }

    pub fn from_path(path: &std::path::Path) -> Result<Self, SchemaError> {
        let src = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Document(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&src)
    }

    /// Every `Kind::Object` reference, at any depth, names a registered class.
    pub fn validate(&self) -> Result<(), SchemaError> {
        fn referenced(ty: &TypeDescriptor) -> Option<&str> {
            match &ty.kind {
                Kind::Object(c) => Some(c.as_str()),
                Kind::Array(Some(item)) => referenced(item),
                _ => None,
            }
        }
        for shape in self.shapes.values() {
            for (_, ty) in shape.fields() {
                if let Some(missing) = referenced(ty).filter(|c| !self.shapes.contains_key(*c)) {
                    return Err(SchemaError::DanglingReference {
                        class: shape.class.clone(),
                        missing: missing.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

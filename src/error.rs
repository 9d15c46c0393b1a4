//! Failure reporting.
//!
//! A [`DenormalizationFailure`] records what a field expected, the runtime
//! type of the value actually supplied, and where in the input it sat.
use std::fmt;

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use crate::types::TypeDescriptor;
use crate::value::{DebugType, Value};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Dotted/bracketed location inside the input: `field`, `outer.inner`, `items[2]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self { Self::default() }

    pub fn field(&self, name: &str) -> Self {
        let mut out = self.clone();
        out.0.push(PathSegment::Field(name.to_string()));
        out
    }

    pub fn index(&self, i: usize) -> Self {
        let mut out = self.clone();
        out.0.push(PathSegment::Index(i));
        out
    }

    pub fn segments(&self) -> &[PathSegment] { &self.0 }
    pub fn is_root(&self) -> bool { self.0.is_empty() }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                PathSegment::Field(name) if i == 0 => write!(f, "{name}")?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(ix) => write!(f, "[{ix}]")?,
            }
        }
        Ok(())
    }
}

/// One rejected value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenormalizationFailure {
    class: String,
    path: FieldPath,
    expected: TypeDescriptor,
    current_type: DebugType,
}

impl DenormalizationFailure {
    /// Classifies `actual` as supplied; the value itself is not kept.
    pub fn new(class: &str, path: FieldPath, expected: TypeDescriptor, actual: &Value) -> Self {
        Self::with_current_type(class, path, expected, actual.debug_type())
    }

    pub fn with_current_type(
        class: &str,
        path: FieldPath,
        expected: TypeDescriptor,
        current_type: DebugType,
    ) -> Self {
        Self { class: class.to_string(), path, expected, current_type }
    }

    /// Class whose shape declared the rejected field.
    pub fn class(&self) -> &str { &self.class }
    pub fn path(&self) -> &FieldPath { &self.path }
    pub fn expected(&self) -> &TypeDescriptor { &self.expected }
    pub fn expected_types(&self) -> Vec<String> { self.expected.expected_types() }
    pub fn current_type(&self) -> &str { self.current_type.as_str() }
    pub fn debug_type(&self) -> &DebugType { &self.current_type }

    pub fn message(&self) -> String {
        let expected = self.expected_types().join("\", \"");
        if self.path.is_root() {
            format!(
                "Data expected to be of type \"{expected}\" for class \"{}\" (\"{}\" given).",
                self.class, self.current_type,
            )
        } else {
            format!(
                "The type of the \"{}\" attribute for class \"{}\" must be one of \"{expected}\" (\"{}\" given).",
                self.path, self.class, self.current_type,
            )
        }
    }
}

impl fmt::Display for DenormalizationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl Serialize for DenormalizationFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("DenormalizationFailure", 5)?;
        s.serialize_field("path", &self.path.to_string())?;
        s.serialize_field("class", &self.class)?;
        s.serialize_field("expected_types", &self.expected_types())?;
        s.serialize_field("current_type", &self.current_type)?;
        s.serialize_field("message", &self.message())?;
        s.end()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DenormalizeError {
    #[error("{0}")]
    NotNormalizable(DenormalizationFailure),
    #[error("{} value(s) could not be denormalized; first: {}", .0.len(), first_message(.0))]
    Partial(Vec<DenormalizationFailure>),
    #[error("no shape registered for class \"{0}\"")]
    UnknownClass(String),
    #[error("at path {path} → {message}")]
    Deserialize { path: String, message: String },
}

fn first_message(failures: &[DenormalizationFailure]) -> String {
    failures.first().map(|f| f.message()).unwrap_or_default()
}

impl DenormalizeError {
    /// Every type-mismatch failure carried by this error, in input order.
    pub fn failures(&self) -> &[DenormalizationFailure] {
        match self {
            DenormalizeError::NotNormalizable(f) => std::slice::from_ref(f),
            DenormalizeError::Partial(fs) => fs,
            _ => &[],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid type string `{0}`")]
    InvalidType(String),
    #[error("class \"{class}\" references unknown class \"{missing}\"")]
    DanglingReference { class: String, missing: String },
    #[error("{0}")]
    Document(String),
}

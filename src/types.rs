// Declared field types. No input values here.
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Float,
    String,
    /// `None` is an untyped sequence kept as supplied.
    Array(Option<Box<TypeDescriptor>>),
    /// Instance of a named class, resolved through a `Schema`.
    Object(String),
}

/// The expected type of one field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeDescriptor {
    pub kind: Kind,
    pub nullable: bool,
}

impl TypeDescriptor {
    pub fn new(kind: Kind) -> Self { Self { kind, nullable: false } }
    pub fn bool() -> Self { Self::new(Kind::Bool) }
    pub fn int() -> Self { Self::new(Kind::Int) }
    pub fn float() -> Self { Self::new(Kind::Float) }
    pub fn string() -> Self { Self::new(Kind::String) }
    pub fn array() -> Self { Self::new(Kind::Array(None)) }
    pub fn array_of(item: TypeDescriptor) -> Self { Self::new(Kind::Array(Some(Box::new(item)))) }
    pub fn object(class: impl Into<String>) -> Self { Self::new(Kind::Object(class.into())) }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Flat list of accepted type names, `null` last when nullable.
    pub fn expected_types(&self) -> Vec<String> {
        let mut out = vec![self.kind.to_string()];
        if self.nullable {
            out.push("null".to_string());
        }
        out
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => f.write_str("bool"),
            Kind::Int => f.write_str("int"),
            Kind::Float => f.write_str("float"),
            Kind::String => f.write_str("string"),
            Kind::Array(None) => f.write_str("array"),
            Kind::Array(Some(item)) => write!(f, "array<{item}>"),
            Kind::Object(class) => f.write_str(class),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            f.write_str("?")?;
        }
        write!(f, "{}", self.kind)
    }
}

// ------------------------------ Parsing ----------------------------------- //

static CLASS_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\\?[A-Za-z_][A-Za-z0-9_]*(\\[A-Za-z_][A-Za-z0-9_]*)*$").expect("valid regex")
});

/// Built-in type names. Matched case-sensitively, so `Integer` stays a class.
const RESERVED: &[&str] = &[
    "bool", "boolean", "int", "integer", "float", "double", "string",
    "array", "list", "null", "mixed", "void",
];

/// A name usable as a class identifier: namespaced identifier syntax and
/// not one of the built-in type names.
pub fn is_class_name(s: &str) -> bool {
    CLASS_NAME.is_match(s) && !RESERVED.contains(&s.trim_start_matches('\\'))
}

static GENERIC_SEQ: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:array|list)\s*<\s*(?P<item>.+?)\s*>$").expect("valid regex")
});

impl FromStr for TypeDescriptor {
    type Err = SchemaError;

    /// Accepts `bool`, `int`, `float`, `string`, `array`, `T[]`,
    /// `array<T>`, `list<T>`, a class name, and `?T` / `T|null`.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let s = src.trim();
        let invalid = || SchemaError::InvalidType(src.to_string());
        if s.is_empty() {
            return Err(invalid());
        }

        if let Some(rest) = s.strip_prefix('?') {
            let inner: TypeDescriptor = rest.parse().map_err(|_| invalid())?;
            return Ok(inner.nullable());
        }
        if let Some(rest) = s.strip_suffix("|null").or_else(|| s.strip_prefix("null|")) {
            let inner: TypeDescriptor = rest.parse().map_err(|_| invalid())?;
            return Ok(inner.nullable());
        }
        if let Some(rest) = s.strip_suffix("[]") {
            let item: TypeDescriptor = rest.parse().map_err(|_| invalid())?;
            return Ok(TypeDescriptor::array_of(item));
        }
        if let Some(caps) = GENERIC_SEQ.captures(s) {
            let item: TypeDescriptor = caps["item"].parse().map_err(|_| invalid())?;
            return Ok(TypeDescriptor::array_of(item));
        }

        let kind = match s {
            "bool" | "boolean" => Kind::Bool,
            "int" | "integer" => Kind::Int,
            "float" | "double" => Kind::Float,
            "string" => Kind::String,
            "array" | "list" => Kind::Array(None),
            _ if is_class_name(s) => Kind::Object(s.trim_start_matches('\\').to_string()),
            _ => return Err(invalid()),
        };
        Ok(TypeDescriptor::new(kind))
    }
}

impl TryFrom<String> for TypeDescriptor {
    type Error = SchemaError;
    fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

impl From<TypeDescriptor> for String {
    fn from(t: TypeDescriptor) -> Self { t.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> TypeDescriptor { s.parse().unwrap() }

    #[test]
    fn scalar_names_and_aliases() {
        assert_eq!(parse("bool"), TypeDescriptor::bool());
        assert_eq!(parse("boolean"), TypeDescriptor::bool());
        assert_eq!(parse("integer"), TypeDescriptor::int());
        assert_eq!(parse("double"), TypeDescriptor::float());
        assert_eq!(parse(" string "), TypeDescriptor::string());
        assert_eq!(parse("array"), TypeDescriptor::array());
    }

    #[test]
    fn nullable_forms_agree() {
        assert_eq!(parse("?int"), TypeDescriptor::int().nullable());
        assert_eq!(parse("int|null"), TypeDescriptor::int().nullable());
        assert_eq!(parse("null|int"), TypeDescriptor::int().nullable());
    }

    #[test]
    fn collections_and_classes() {
        let ints = TypeDescriptor::array_of(TypeDescriptor::int());
        assert_eq!(parse("int[]"), ints);
        assert_eq!(parse("array<int>"), ints);
        assert_eq!(parse("list< int >"), ints);
        assert_eq!(parse("\\App\\Model\\User"), TypeDescriptor::object("App\\Model\\User"));
        assert_eq!(parse("?Point[]").to_string(), "?array<Point>");
    }

    #[test]
    fn type_names_are_case_sensitive() {
        for class in ["Integer", "List", "Double", "String", "Bool"] {
            let ty = TypeDescriptor::object(class);
            let back: TypeDescriptor = String::from(ty.clone()).try_into().unwrap();
            assert_eq!(back, ty, "{class} must stay a class");
        }
        assert_eq!(parse("int"), TypeDescriptor::int());
    }

    #[test]
    fn class_names_exclude_builtin_types() {
        assert!(is_class_name("stdClass"));
        assert!(is_class_name("\\App\\Point"));
        for bad in ["", "int", "array", "\\null", "not a class", "9x"] {
            assert!(!is_class_name(bad), "{bad:?}");
        }
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "?", "null", "int|", "9lives", "array<>", "a b"] {
            assert!(bad.parse::<TypeDescriptor>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn display_round_trips() {
        for src in ["bool", "?float", "array", "array<?string>", "Outer"] {
            assert_eq!(parse(src).to_string(), src);
        }
    }

    #[test]
    fn expected_types_lists_null_last() {
        assert_eq!(TypeDescriptor::int().expected_types(), vec!["int"]);
        assert_eq!(parse("?string").expected_types(), vec!["string", "null"]);
    }
}

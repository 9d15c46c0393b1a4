//! Denormalize loosely-typed data into declared classes.
//!
//! Input arrives as a [`Value`] (usually decoded JSON), each target class is
//! declared once as a [`Shape`], and [`Denormalizer`] coerces every field to
//! its declared type. When a field cannot be coerced, the resulting
//! [`DenormalizationFailure`] reports the runtime type of the value that was
//! actually supplied.
//!
//! ```
//! use typed_denorm::{Denormalizer, Schema, Shape, TypeDescriptor, Value};
//!
//! let schema = Schema::new().with(Shape::builder("TypeInt").field("field", TypeDescriptor::int()).build());
//! let d = Denormalizer::new(&schema);
//!
//! let ok = d.denormalize(&Value::from(serde_json::json!({"field": "42"})), "TypeInt").unwrap();
//! assert_eq!(ok.get_int("field"), Some(42));
//!
//! let err = d.denormalize(&Value::from(serde_json::json!({"field": [123]})), "TypeInt").unwrap_err();
//! assert_eq!(err.failures()[0].current_type(), "array");
//! ```
pub mod cli;
pub mod coerce;
pub mod conformance;
pub mod context;
pub mod denormalize;
pub mod error;
pub mod jq_exec;
pub mod path_de;
pub mod record;
pub mod shape;
pub mod types;
pub mod value;

pub use context::Context;
pub use denormalize::{denormalize, Denormalizer};
pub use error::{DenormalizationFailure, DenormalizeError, FieldPath, SchemaError};
pub use record::{Record, Typed};
pub use shape::{Schema, Shape};
pub use types::{Kind, TypeDescriptor};
pub use value::{DebugType, Value};

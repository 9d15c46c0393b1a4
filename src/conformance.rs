//! Current-type conformance cases.
//!
//! Each case denormalizes one payload into one class and states whether it
//! must succeed or which current type the failure must report. The built-in
//! table covers every incompatible input for the five single-field classes
//! `TypeBool`, `TypeString`, `TypeInt`, `TypeFloat` and `TypeArray`, plus the
//! accept-side controls.
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::denormalize::Denormalizer;
use crate::error::DenormalizeError;
use crate::shape::{Schema, Shape};
use crate::types::TypeDescriptor;
use crate::value::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Case {
    pub name: String,
    pub class: String,
    #[serde(deserialize_with = "de_value")]
    pub data: Value,
    #[serde(default)]
    pub context: Context,
    /// `None`: the case must denormalize cleanly.
    #[serde(default)]
    pub expect_current_type: Option<String>,
}

fn de_value<'de, D: serde::Deserializer<'de>>(de: D) -> Result<Value, D::Error> {
    serde_json::Value::deserialize(de).map(Value::from)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    /// Failed when it should have succeeded, or vice versa.
    Unexpected { detail: String },
    /// Failed as expected but reported the wrong current type.
    WrongType { expected: String, got: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub name: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl CaseReport {
    pub fn passed(&self) -> bool { self.outcome == Outcome::Pass }
}

pub fn run_case(schema: &Schema, case: &Case) -> CaseReport {
    let result = Denormalizer::new(schema).with_context(case.context).denormalize(&case.data, &case.class);
    let outcome = match (&case.expect_current_type, result) {
        (None, Ok(_)) => Outcome::Pass,
        (None, Err(e)) => Outcome::Unexpected { detail: format!("expected success, got: {e}") },
        (Some(want), Ok(_)) => Outcome::Unexpected { detail: format!("expected a \"{want}\" failure, got success") },
        (Some(want), Err(e)) => match first_current_type(&e) {
            Some(got) if &got == want => Outcome::Pass,
            Some(got) => Outcome::WrongType { expected: want.clone(), got },
            None => Outcome::Unexpected { detail: format!("expected a type mismatch, got: {e}") },
        },
    };
    CaseReport { name: case.name.clone(), outcome }
}

fn first_current_type(e: &DenormalizeError) -> Option<String> {
    e.failures().first().map(|f| f.current_type().to_string())
}

/// Cases are independent, so they run in parallel; reports keep case order.
pub fn run_cases(schema: &Schema, cases: &[Case]) -> Vec<CaseReport> {
    cases.par_iter().map(|case| run_case(schema, case)).collect()
}

pub fn cases_from_json_str(src: &str) -> Result<Vec<Case>, String> {
    crate::path_de::from_str_with_path(src)
}

// ---------------------------- Built-in table ------------------------------ //

pub fn builtin_schema() -> Schema {
    let single = |class: &str, ty: TypeDescriptor| Shape::builder(class).field("field", ty).build();
    Schema::new()
        .with(single("TypeBool", TypeDescriptor::bool()))
        .with(single("TypeString", TypeDescriptor::string()))
        .with(single("TypeInt", TypeDescriptor::int()))
        .with(single("TypeFloat", TypeDescriptor::float()))
        .with(single("TypeArray", TypeDescriptor::array()))
}

pub fn builtin_cases() -> Vec<Case> {
    use serde_json::json;

    let std_class = json!({"@class": "stdClass"});
    let strict = Context::default();
    let filtered = Context::default().filter_bool(true);

    let rejects = |name: &str, class: &str, field: serde_json::Value, context: Context, current: &str| Case {
        name: name.to_string(),
        class: class.to_string(),
        data: Value::from(json!({ "field": field })),
        context,
        expect_current_type: Some(current.to_string()),
    };
    let accepts = |name: &str, class: &str, field: serde_json::Value, context: Context| Case {
        name: name.to_string(),
        class: class.to_string(),
        data: Value::from(json!({ "field": field })),
        context,
        expect_current_type: None,
    };

    vec![
        rejects("null to bool", "TypeBool", json!(null), strict, "null"),
        rejects("array to bool", "TypeBool", json!(["value"]), strict, "array"),
        rejects("stdClass to bool", "TypeBool", std_class.clone(), strict, "stdClass"),
        rejects("int to bool (filtered)", "TypeBool", json!(123), filtered, "int"),
        rejects("string to bool (filtered)", "TypeBool", json!("not-a-bool"), filtered, "string"),
        rejects("null to string", "TypeString", json!(null), strict, "null"),
        rejects("array to string", "TypeString", json!(["abc"]), strict, "array"),
        rejects("stdClass to string", "TypeString", std_class.clone(), strict, "stdClass"),
        rejects("null to int", "TypeInt", json!(null), strict, "null"),
        rejects("string to int", "TypeInt", json!("not a number"), strict, "string"),
        rejects("array to int", "TypeInt", json!([123]), strict, "array"),
        rejects("stdClass to int", "TypeInt", std_class.clone(), strict, "stdClass"),
        rejects("null to float", "TypeFloat", json!(null), strict, "null"),
        rejects("string to float", "TypeFloat", json!("not a number"), strict, "string"),
        rejects("array to float", "TypeFloat", json!([3.14]), strict, "array"),
        rejects("stdClass to float", "TypeFloat", std_class.clone(), strict, "stdClass"),
        rejects("null to array", "TypeArray", json!(null), strict, "null"),
        rejects("bool to array", "TypeArray", json!(true), strict, "bool"),
        rejects("int to array", "TypeArray", json!(42), strict, "int"),
        rejects("float to array", "TypeArray", json!(2.718), strict, "float"),
        rejects("string to array", "TypeArray", json!("string"), strict, "string"),
        rejects("stdClass to array", "TypeArray", std_class, strict, "stdClass"),
        accepts("numeric string to int", "TypeInt", json!("42"), strict),
        accepts("array to array", "TypeArray", json!([123]), strict),
        accepts("int to string", "TypeString", json!(7), strict),
        accepts("bool to float", "TypeFloat", json!(true), strict),
        accepts("one to bool (filtered)", "TypeBool", json!(1), filtered),
        accepts("yes to bool (filtered)", "TypeBool", json!("yes"), filtered),
    ]
}

//! Denormalization driver.
//!
//! Walks a raw mapping against a class shape: resolve each declared field's
//! type, look up its raw value (missing reads as null), coerce, and either
//! assemble a [`Record`] or fail.
//!
//! By default the first rejection aborts the call and no partial object is
//! returned. With [`Context::collect_errors`] every field is visited and all
//! failures come back together, in input order.
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::coerce::{self, Coercion, Entries};
use crate::context::Context;
use crate::error::{DenormalizationFailure, DenormalizeError, FieldPath};
use crate::record::{Record, Typed};
use crate::shape::{Schema, Shape};
use crate::types::{Kind, TypeDescriptor};
use crate::value::Value;

pub struct Denormalizer<'s> {
    schema: &'s Schema,
    context: Context,
}

/// Signals that a fail-fast walk hit its first rejection.
struct Halt;

struct Walk<'s> {
    schema: &'s Schema,
    context: Context,
    failures: Vec<DenormalizationFailure>,
    unknown_class: Option<String>,
}

impl<'s> Denormalizer<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema, context: Context::default() }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn context(&self) -> &Context { &self.context }

    pub fn denormalize(&self, raw: &Value, class: &str) -> Result<Record, DenormalizeError> {
        let shape = self.schema.get(class).ok_or_else(|| DenormalizeError::UnknownClass(class.to_string()))?;
        self.denormalize_shape(raw, shape)
    }

    /// Like [`Denormalizer::denormalize`] with an explicit shape, which need
    /// not be registered. Class-typed fields still resolve through the schema.
    pub fn denormalize_shape(&self, raw: &Value, shape: &Shape) -> Result<Record, DenormalizeError> {
        debug!(class = shape.class(), current_type = %raw.debug_type(), "denormalize");
        let mut walk = Walk {
            schema: self.schema,
            context: self.context,
            failures: Vec::new(),
            unknown_class: None,
        };
        let out = walk.top_level(raw, shape);

        if let Some(class) = walk.unknown_class {
            return Err(DenormalizeError::UnknownClass(class));
        }
        match (out, walk.failures.len()) {
            (Ok(Some(record)), 0) => Ok(record),
            (_, 1) if !self.context.collect_errors => {
                let failure = walk.failures.remove(0);
                Err(DenormalizeError::NotNormalizable(failure))
            }
            _ => Err(DenormalizeError::Partial(walk.failures)),
        }
    }

    /// Denormalize, then deserialize the record into `T`.
    pub fn denormalize_into<T: DeserializeOwned>(&self, raw: &Value, class: &str) -> Result<T, DenormalizeError> {
        let record = self.denormalize(raw, class)?;
        crate::path_de::from_record_with_path(&record)
    }
}

/// One-shot helper over a standalone shape with default options.
pub fn denormalize(raw: &Value, shape: &Shape) -> Result<Record, DenormalizeError> {
    let schema = Schema::new();
    Denormalizer::new(&schema).denormalize_shape(raw, shape)
}

impl<'s> Walk<'s> {
    fn top_level(&mut self, raw: &Value, shape: &Shape) -> Result<Option<Record>, Halt> {
        let expected = TypeDescriptor::object(shape.class());
        match coerce::coerce(raw, &expected, &self.context) {
            Coercion::Entries(Entries::Keyed(entries)) => self.shape(entries, shape, &FieldPath::root()),
            _ => {
                let failure = DenormalizationFailure::new(shape.class(), FieldPath::root(), expected, raw);
                self.reject(failure)?;
                Ok(None)
            }
        }
    }

    fn shape(
        &mut self,
        entries: &IndexMap<String, Value>,
        shape: &Shape,
        path: &FieldPath,
    ) -> Result<Option<Record>, Halt> {
        let mut record = Record::new(shape.class());
        let mut complete = true;
        for (name, expected) in shape.fields() {
            let raw = entries.get(name).unwrap_or(&Value::Null);
            trace!(class = shape.class(), field = name, %expected, current_type = %raw.debug_type(), "field");
            match self.value(raw, expected, shape.class(), &path.field(name))? {
                Some(typed) => { record.fields.insert(name.to_string(), typed); }
                None => complete = false,
            }
        }
        Ok(complete.then_some(record))
    }

    /// `Ok(None)` means rejected, with the failure already recorded and the
    /// walk allowed to continue.
    fn value(
        &mut self,
        raw: &Value,
        expected: &TypeDescriptor,
        owner: &str,
        path: &FieldPath,
    ) -> Result<Option<Typed>, Halt> {
        match coerce::coerce(raw, expected, &self.context) {
            Coercion::Coerced(typed) => Ok(Some(typed)),
            Coercion::Rejected(current_type) => {
                let failure = DenormalizationFailure::with_current_type(owner, path.clone(), expected.clone(), current_type);
                self.reject(failure)?;
                Ok(None)
            }
            Coercion::Entries(entries) => match (&expected.kind, entries) {
                (Kind::Object(class), Entries::Keyed(fields)) => {
                    let Some(shape) = self.schema.get(class) else {
                        self.unknown_class = Some(class.clone());
                        return Err(Halt);
                    };
                    Ok(self.shape(fields, shape, path)?.map(Typed::Object))
                }
                (Kind::Array(Some(item)), Entries::Items(xs)) => {
                    let mut out = Vec::with_capacity(xs.len());
                    let mut complete = true;
                    for (i, x) in xs.iter().enumerate() {
                        match self.value(x, item, owner, &path.index(i))? {
                            Some(t) => out.push(t),
                            None => complete = false,
                        }
                    }
                    Ok(complete.then_some(Typed::List(out)))
                }
                (Kind::Array(Some(item)), Entries::Keyed(m)) => {
                    let mut out = IndexMap::with_capacity(m.len());
                    let mut complete = true;
                    for (k, x) in m {
                        match self.value(x, item, owner, &path.field(k))? {
                            Some(t) => { out.insert(k.clone(), t); }
                            None => complete = false,
                        }
                    }
                    Ok(complete.then_some(Typed::Map(out)))
                }
                // coerce only hands back entries for container kinds
                _ => {
                    let failure = DenormalizationFailure::new(owner, path.clone(), expected.clone(), raw);
                    self.reject(failure)?;
                    Ok(None)
                }
            },
        }
    }

    fn reject(&mut self, failure: DenormalizationFailure) -> Result<(), Halt> {
        debug!(
            path = %failure.path(),
            expected = %failure.expected(),
            current_type = failure.current_type(),
            "rejected"
        );
        self.failures.push(failure);
        if self.context.collect_errors { Ok(()) } else { Err(Halt) }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn single(ty: TypeDescriptor) -> Shape {
        Shape::builder("Target").field("field", ty).build()
    }

    fn failure_of(raw: serde_json::Value, ty: TypeDescriptor, ctx: Context) -> DenormalizationFailure {
        let schema = Schema::new();
        let raw = Value::from(raw);
        match Denormalizer::new(&schema).with_context(ctx).denormalize_shape(&raw, &single(ty)) {
            Err(DenormalizeError::NotNormalizable(f)) => f,
            other => panic!("expected a single failure, got {other:?}"),
        }
    }

    fn nested_schema() -> Schema {
        Schema::new()
            .with(Shape::builder("Tag").field("name", TypeDescriptor::string()).build())
            .with(
                Shape::builder("Post")
                    .field("id", TypeDescriptor::int())
                    .field("title", TypeDescriptor::string())
                    .field("tags", TypeDescriptor::array_of(TypeDescriptor::object("Tag")))
                    .field("draft", TypeDescriptor::bool().nullable())
                    .build(),
            )
    }

    #[test]
    fn boundary_scenarios() {
        let strict = Context::default();
        assert_eq!(failure_of(json!({"field": null}), TypeDescriptor::bool(), strict).current_type(), "null");
        assert_eq!(failure_of(json!({"field": ["value"]}), TypeDescriptor::bool(), strict).current_type(), "array");
        assert_eq!(
            failure_of(json!({"field": {"@class": "stdClass"}}), TypeDescriptor::int(), strict).current_type(),
            "stdClass"
        );

        let ok = denormalize(&Value::from(json!({"field": [123]})), &single(TypeDescriptor::array())).unwrap();
        assert_eq!(ok.get("field"), Some(&Typed::Array(Value::from(json!([123])))));
    }

    #[test]
    fn numeric_string_coerces_to_int() {
        let rec = denormalize(&Value::from(json!({"field": "42"})), &single(TypeDescriptor::int())).unwrap();
        assert_eq!(rec.get_int("field"), Some(42));
        assert_eq!(rec.class, "Target");
    }

    #[test]
    fn failure_is_idempotent() {
        let a = failure_of(json!({"field": [3.14]}), TypeDescriptor::float(), Context::default());
        let b = failure_of(json!({"field": [3.14]}), TypeDescriptor::float(), Context::default());
        assert_eq!(a.current_type(), b.current_type());
        assert_eq!(a.expected(), b.expected());
        assert_eq!(a, b);
    }

    #[test]
    fn missing_field_reads_as_null() {
        let f = failure_of(json!({}), TypeDescriptor::string(), Context::default());
        assert_eq!(f.current_type(), "null");
        assert_eq!(f.path().to_string(), "field");

        let rec = denormalize(&Value::from(json!({})), &single(TypeDescriptor::string().nullable())).unwrap();
        assert_eq!(rec.get("field"), Some(&Typed::Null));
    }

    #[test]
    fn lenient_bool_mode() {
        let lenient = Context::default().filter_bool(true);
        assert_eq!(failure_of(json!({"field": 123}), TypeDescriptor::bool(), lenient).current_type(), "int");
        assert_eq!(failure_of(json!({"field": "not-a-bool"}), TypeDescriptor::bool(), lenient).current_type(), "string");

        let schema = Schema::new();
        let d = Denormalizer::new(&schema).with_context(lenient);
        assert!(d.context().filter_bool);
        assert!(!d.context().collect_errors);
        let rec = d.denormalize_shape(&Value::from(json!({"field": "yes"})), &single(TypeDescriptor::bool())).unwrap();
        assert_eq!(rec.get_bool("field"), Some(true));
        let rec = d.denormalize_shape(&Value::from(json!({"field": 0})), &single(TypeDescriptor::bool())).unwrap();
        assert_eq!(rec.get_bool("field"), Some(false));
    }

    #[test]
    fn top_level_must_be_a_mapping() {
        let err = denormalize(&Value::from(json!([1, 2])), &single(TypeDescriptor::int())).unwrap_err();
        let failures = err.failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].path().is_root());
        assert_eq!(failures[0].current_type(), "array");

        let err = denormalize(&Value::from(json!("x")), &single(TypeDescriptor::int())).unwrap_err();
        assert_eq!(err.failures()[0].current_type(), "string");
    }

    #[test]
    fn instance_of_target_class_is_revalidated() {
        let shape = single(TypeDescriptor::int());
        let rec = denormalize(&Value::from(json!({"@class": "Target", "field": "7"})), &shape).unwrap();
        assert_eq!(rec.get_int("field"), Some(7));

        let err = denormalize(&Value::from(json!({"@class": "Other", "field": 7})), &shape).unwrap_err();
        assert_eq!(err.failures()[0].current_type(), "Other");
    }

    #[test]
    fn nested_objects_and_lists() {
        let schema = nested_schema();
        let raw = Value::from(json!({
            "id": "12",
            "title": 99,
            "tags": [{"name": "rust"}, {"name": 1.5}],
            "extra": "ignored"
        }));
        let rec = Denormalizer::new(&schema).denormalize(&raw, "Post").unwrap();
        assert_eq!(rec.get_int("id"), Some(12));
        assert_eq!(rec.get_str("title"), Some("99"));
        assert_eq!(rec.get("draft"), Some(&Typed::Null));
        assert!(rec.get("extra").is_none());
        match rec.get("tags") {
            Some(Typed::List(tags)) => {
                assert_eq!(tags.len(), 2);
                let Typed::Object(second) = &tags[1] else { panic!("tag is not an object") };
                assert_eq!(second.class, "Tag");
                assert_eq!(second.get_str("name"), Some("1.5"));
            }
            other => panic!("unexpected tags {other:?}"),
        }
    }

    #[test]
    fn nested_single_object_field() {
        let schema = Schema::new()
            .with(Shape::builder("Point").field("x", TypeDescriptor::float()).build())
            .with(Shape::builder("Line").field("start", TypeDescriptor::object("Point")).build());
        let raw = Value::from(json!({"start": {"x": "2.5"}}));
        let rec = Denormalizer::new(&schema).denormalize(&raw, "Line").unwrap();
        let start = rec.get_object("start").unwrap();
        assert_eq!(start.class, "Point");
        assert_eq!(start.get_float("x"), Some(2.5));
        assert_eq!(rec.get_float("start"), None);
    }

    #[test]
    fn class_tag_naming_a_builtin_type_reports_array() {
        let f = failure_of(json!({"field": {"@class": "int"}}), TypeDescriptor::int(), Context::default());
        assert_eq!(f.current_type(), "array");
        let f = failure_of(json!({"field": {"@class": ""}}), TypeDescriptor::string(), Context::default());
        assert_eq!(f.current_type(), "array");
    }

    #[test]
    fn nested_failure_has_full_path_and_item_type() {
        let schema = nested_schema();
        let raw = Value::from(json!({"id": 1, "title": "t", "tags": [{"name": "a"}, {"name": ["b"]}]}));
        let err = Denormalizer::new(&schema).denormalize(&raw, "Post").unwrap_err();
        let DenormalizeError::NotNormalizable(f) = err else { panic!("expected one failure") };
        assert_eq!(f.path().to_string(), "tags[1].name");
        assert_eq!(f.class(), "Tag");
        assert_eq!(f.current_type(), "array");

        let raw = Value::from(json!({"id": 1, "title": "t", "tags": [{"@class": "stdClass"}]}));
        let err = Denormalizer::new(&schema).denormalize(&raw, "Post").unwrap_err();
        assert_eq!(err.failures()[0].path().to_string(), "tags[0]");
        assert_eq!(err.failures()[0].current_type(), "stdClass");
    }

    #[test]
    fn fail_fast_stops_at_first_field() {
        let schema = nested_schema();
        let raw = Value::from(json!({"id": null, "title": [], "tags": "no"}));
        let err = Denormalizer::new(&schema).denormalize(&raw, "Post").unwrap_err();
        let DenormalizeError::NotNormalizable(f) = err else { panic!("expected fail-fast") };
        assert_eq!(f.path().to_string(), "id");
    }

    #[test]
    fn collect_mode_reports_every_field_in_order() {
        let schema = nested_schema();
        let raw = Value::from(json!({"id": null, "title": [], "tags": [{"name": {}}, 5], "draft": "x"}));
        let d = Denormalizer::new(&schema).with_context(Context::default().collect_errors(true));
        let err = d.denormalize(&raw, "Post").unwrap_err();
        let DenormalizeError::Partial(fs) = err else { panic!("expected aggregated failures") };
        let got: Vec<_> = fs.iter().map(|f| (f.path().to_string(), f.current_type().to_string())).collect();
        assert_eq!(got, [
            ("id".to_string(), "null".to_string()),
            ("title".to_string(), "array".to_string()),
            ("tags[0].name".to_string(), "array".to_string()),
            ("tags[1]".to_string(), "int".to_string()),
            ("draft".to_string(), "string".to_string()),
        ]);
    }

    #[test]
    fn collect_mode_with_one_failure_is_still_partial() {
        let schema = Schema::new();
        let d = Denormalizer::new(&schema).with_context(Context::default().collect_errors(true));
        let err = d.denormalize_shape(&Value::from(json!({"field": null})), &single(TypeDescriptor::int())).unwrap_err();
        assert!(matches!(err, DenormalizeError::Partial(ref fs) if fs.len() == 1));
    }

    #[test]
    fn unknown_classes() {
        let schema = Schema::new();
        let d = Denormalizer::new(&schema);
        assert!(matches!(d.denormalize(&Value::from(json!({})), "Nope"), Err(DenormalizeError::UnknownClass(c)) if c == "Nope"));

        let shape = single(TypeDescriptor::object("Missing"));
        let err = d.denormalize_shape(&Value::from(json!({"field": {}})), &shape).unwrap_err();
        assert!(matches!(err, DenormalizeError::UnknownClass(c) if c == "Missing"));
    }

    #[test]
    fn typed_keyed_array_uses_keys_in_path() {
        let shape = single(TypeDescriptor::array_of(TypeDescriptor::int()));
        let rec = denormalize(&Value::from(json!({"field": {"a": "1", "b": 2}})), &shape).unwrap();
        let Some(Typed::Map(m)) = rec.get("field") else { panic!("expected map") };
        assert_eq!(m["a"], Typed::Int(1));

        let err = denormalize(&Value::from(json!({"field": {"a": 1, "b": "x"}})), &shape).unwrap_err();
        assert_eq!(err.failures()[0].path().to_string(), "field.b");
        assert_eq!(err.failures()[0].current_type(), "string");
    }

    #[test]
    fn into_serde_type() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Post { id: u32, title: String, tags: Vec<Tag>, draft: Option<bool> }
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Tag { name: String }

        let schema = nested_schema();
        let raw = Value::from(json!({"id": "3", "title": "hi", "tags": [{"name": true}]}));
        let post: Post = Denormalizer::new(&schema).denormalize_into(&raw, "Post").unwrap();
        assert_eq!(post, Post { id: 3, title: "hi".into(), tags: vec![Tag { name: "1".into() }], draft: None });
    }
}

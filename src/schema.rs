//! Declarative attribute contracts and strict construction.
//!
//! Every entity in a manifest, whether a kind-dispatched node or an auxiliary value, declares a
//! [`Schema`]: an ordered list of [`Field`]s naming each attribute, the [`Shape`] its raw value
//! must have, whether it is required, and an optional default. Shared field groups (the trait
//! bundles in [`crate::traits`]) are plain `&[Field]` tables that a schema composes at
//! construction time with [`Schema::with`].
//!
//! [`Schema::validate`] turns a raw key/value fragment into [`Attrs`], a read-only view of the
//! checked values. Construction is all-or-nothing: the first offending field aborts with a
//! [`ManifestError::SchemaViolation`] and no partial entity is produced.

use crate::{
    error::ManifestError,
    values::{Deprecation, Privacy},
};
use serde_json::Value;
use std::collections::BTreeMap;

/// A decoded JSON object, as supplied by the caller.
pub type RawMap = serde_json::Map<String, Value>;

/// The expected shape of a raw attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    String,
    Bool,
    Integer,
    Array,
    Object,
    /// `deprecated`-style union: a reason string or a flag.
    StringOrBool,
    /// Literally `true`.
    True,
    /// One exact string, used for `kind` discriminants.
    Literal(&'static str),
    /// One of a closed set of strings.
    OneOf(&'static [&'static str]),
}

impl Shape {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Shape::String => value.is_string(),
            Shape::Bool => value.is_boolean(),
            Shape::Integer => value.is_i64() || value.is_u64(),
            Shape::Array => value.is_array(),
            Shape::Object => value.is_object(),
            Shape::StringOrBool => value.is_string() || value.is_boolean(),
            Shape::True => value.as_bool() == Some(true),
            Shape::Literal(lit) => value.as_str() == Some(*lit),
            Shape::OneOf(options) => value
                .as_str()
                .map(|s| options.contains(&s))
                .unwrap_or(false),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Shape::String => "a string".to_string(),
            Shape::Bool => "a boolean".to_string(),
            Shape::Integer => "an integer".to_string(),
            Shape::Array => "an array".to_string(),
            Shape::Object => "an object".to_string(),
            Shape::StringOrBool => "a string or a boolean".to_string(),
            Shape::True => "the literal `true`".to_string(),
            Shape::Literal(lit) => format!("the literal \"{lit}\""),
            Shape::OneOf(options) => format!("one of {options:?}"),
        }
    }
}

/// One attribute of an entity contract.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    pub required: bool,
    pub default: Option<fn() -> Value>,
}

impl Field {
    pub const fn required(name: &'static str, shape: Shape) -> Self {
        Field {
            name,
            shape,
            required: true,
            default: None,
        }
    }

    pub const fn optional(name: &'static str, shape: Shape) -> Self {
        Field {
            name,
            shape,
            required: false,
            default: None,
        }
    }

    pub const fn with_default(mut self, default: fn() -> Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// An entity's full attribute contract.
#[derive(Debug, Clone)]
pub struct Schema {
    entity: &'static str,
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(entity: &'static str) -> Self {
        Schema {
            entity,
            fields: Vec::new(),
        }
    }

    /// Append a field group. A field whose name is already declared keeps its earlier
    /// definition, so the first bundle to declare a name decides its shape.
    pub fn with(mut self, fields: &[Field]) -> Self {
        for field in fields {
            if self.field(field.name).is_none() {
                self.fields.push(*field);
            }
        }
        self
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Validate a raw object against this contract.
    ///
    /// Absent and `null` values are treated alike. Unknown keys are rejected when `strict` is
    /// set and logged otherwise.
    pub fn validate<'a>(&self, raw: &'a RawMap, strict: bool) -> Result<Attrs<'a>, ManifestError> {
        let mut values = BTreeMap::new();
        for field in self.fields.iter() {
            match raw.get(field.name).filter(|v| !v.is_null()) {
                Some(value) => {
                    if !field.shape.accepts(value) {
                        return Err(ManifestError::schema(
                            self.entity,
                            field.name,
                            field.shape.describe(),
                        ));
                    }
                    values.insert(field.name, AttrValue::Raw(value));
                }
                None if field.required => {
                    return Err(ManifestError::schema(
                        self.entity,
                        field.name,
                        format!("{} (field is required)", field.shape.describe()),
                    ));
                }
                None => {
                    if let Some(default) = field.default {
                        values.insert(field.name, AttrValue::Default(default()));
                    }
                }
            }
        }

        for key in raw.keys() {
            if self.field(key).is_none() {
                if strict {
                    return Err(ManifestError::schema(
                        self.entity,
                        key.as_str(),
                        "no such field under a strict contract",
                    ));
                }
                tracing::warn!(
                    "[Schema::validate] ignoring unknown field '{}' on '{}'",
                    key,
                    self.entity
                );
            }
        }

        Ok(Attrs {
            entity: self.entity,
            values,
        })
    }
}

/// Checks the `kind` discriminant of a raw node against the constant of the type being built.
///
/// A missing or non-string discriminant is a schema violation; a well-formed but different one
/// is a kind mismatch.
pub fn check_kind(raw: &RawMap, expected: &'static str) -> Result<(), ManifestError> {
    match raw.get("kind") {
        Some(Value::String(found)) if found == expected => Ok(()),
        Some(Value::String(found)) => Err(ManifestError::mismatched(expected, found.as_str())),
        Some(_) => Err(ManifestError::schema(expected, "kind", "a string")),
        None => Err(ManifestError::schema(
            expected,
            "kind",
            format!("the literal \"{expected}\" (field is required)"),
        )),
    }
}

/// Borrow a raw value as an object, or fail naming the entity that expected one.
pub fn as_object<'a>(entity: &'static str, value: &'a Value) -> Result<&'a RawMap, ManifestError> {
    value
        .as_object()
        .ok_or_else(|| ManifestError::schema(entity, "<self>", "an object"))
}

#[derive(Debug, Clone)]
enum AttrValue<'a> {
    Raw(&'a Value),
    Default(Value),
}

impl AttrValue<'_> {
    fn get(&self) -> &Value {
        match self {
            AttrValue::Raw(value) => value,
            AttrValue::Default(value) => value,
        }
    }
}

/// The validated attributes of one raw entity.
///
/// Typed getters only ever see values that already passed their field's [`Shape`] check.
#[derive(Debug, Clone)]
pub struct Attrs<'a> {
    entity: &'static str,
    values: BTreeMap<&'static str, AttrValue<'a>>,
}

impl<'a> Attrs<'a> {
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).map(AttrValue::get)
    }

    pub fn string(&self, name: &str) -> Option<String> {
        self.get(name).and_then(Value::as_str).map(str::to_string)
    }

    pub fn required_string(&self, name: &str) -> Result<String, ManifestError> {
        self.string(name)
            .ok_or_else(|| ManifestError::schema(self.entity, name, "a string"))
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn deprecated(&self) -> Option<Deprecation> {
        match self.get("deprecated")? {
            Value::Bool(flag) => Some(Deprecation::Flag(*flag)),
            Value::String(reason) => Some(Deprecation::Reason(reason.clone())),
            _ => None,
        }
    }

    pub fn privacy(&self) -> Option<Privacy> {
        self.get("privacy")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }

    /// A raw nested value, left for the resolution pass. Only available for values that came
    /// from the input (defaults are never borrowed).
    pub fn raw(&self, name: &str) -> Option<&'a Value> {
        match self.values.get(name)? {
            AttrValue::Raw(value) => Some(*value),
            AttrValue::Default(_) => None,
        }
    }

    pub fn array(&self, name: &str) -> Option<&'a Vec<Value>> {
        self.raw(name).and_then(Value::as_array)
    }
}

//! Auxiliary value types.
//!
//! These appear as fields inside declarations (a class's `superclass`, an element's `events`,
//! a field's `type`) and are constructed directly from the field's raw value through the
//! [`ValueTypeTable`](crate::roles::ValueTypeTable). Once built they are never mutated by the
//! engine; nested values (the `references` of a [`Type`], the `source` of a [`Demo`]) are
//! resolved through their own roles while the outer value is being built.

use crate::{
    engine::Engine,
    error::ManifestError,
    roles::{Role, ValueType},
    schema::{as_object, Field, Schema, Shape},
    traits::{PropertyLike, PROPERTY_LIKE},
};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

/// Whether an entity is deprecated. A string value is the reason for the deprecation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deprecation {
    Flag(bool),
    Reason(String),
}

impl Deprecation {
    pub fn is_deprecated(&self) -> bool {
        match self {
            Deprecation::Flag(flag) => *flag,
            Deprecation::Reason(_) => true,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Deprecation::Flag(_) => None,
            Deprecation::Reason(reason) => Some(reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Privacy {
    Public,
    Private,
    Protected,
}

impl Privacy {
    pub const NAMES: &'static [&'static str] = &["public", "private", "protected"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Private => "private",
            Privacy::Protected => "protected",
        }
    }
}

impl Display for Privacy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Privacy {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Privacy::Public),
            "private" => Ok(Privacy::Private),
            "protected" => Ok(Privacy::Protected),
            other => Err(ManifestError::schema(
                "privacy",
                "privacy",
                format!("one of {:?}, got \"{other}\"", Privacy::NAMES),
            )),
        }
    }
}

const REFERENCE_FIELDS: &[Field] = &[
    Field::required("name", Shape::String),
    Field::optional("package", Shape::String),
    Field::optional("module", Shape::String),
];

static REFERENCE: Lazy<Schema> = Lazy::new(|| Schema::new(Reference::ENTITY).with(REFERENCE_FIELDS));

/// A reference to an export of a module.
///
/// `package` is an npm package name; when absent the reference is local to this package.
/// When `module` is absent the reference is local to the containing module. Globals such as
/// `HTMLElement` use the package `"global:"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub name: String,
    pub package: Option<String>,
    pub module: Option<String>,
}

impl Reference {
    pub fn is_global(&self) -> bool {
        self.package.as_deref() == Some("global:")
    }
}

impl ValueType for Reference {
    const ENTITY: &'static str = "reference";

    fn from_raw(raw: &Value, engine: &Engine) -> Result<Self, ManifestError> {
        let attrs = REFERENCE.validate(as_object(Self::ENTITY, raw)?, engine.config().strict)?;
        Ok(Reference {
            name: attrs.required_string("name")?,
            package: attrs.string("package"),
            module: attrs.string("module"),
        })
    }
}

static TYPE_REFERENCE: Lazy<Schema> = Lazy::new(|| {
    Schema::new(TypeReference::ENTITY)
        .with(REFERENCE_FIELDS)
        .with(&[
            Field::optional("start", Shape::Integer),
            Field::optional("end", Shape::Integer),
        ])
});

/// Indices into a type string, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeRange {
    pub start: u64,
    pub end: u64,
}

/// A [`Reference`] tied to a type string and optionally to a range within it.
///
/// `start` and `end` are present together or not at all. Without them the whole type string
/// names the referenced symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    pub reference: Reference,
    pub range: Option<TypeRange>,
}

impl TypeReference {
    pub fn name(&self) -> &str {
        &self.reference.name
    }

    pub fn start(&self) -> Option<u64> {
        self.range.map(|r| r.start)
    }

    pub fn end(&self) -> Option<u64> {
        self.range.map(|r| r.end)
    }
}

impl ValueType for TypeReference {
    const ENTITY: &'static str = "type_reference";

    fn from_raw(raw: &Value, engine: &Engine) -> Result<Self, ManifestError> {
        let attrs =
            TYPE_REFERENCE.validate(as_object(Self::ENTITY, raw)?, engine.config().strict)?;
        let index = |name: &str| -> Result<Option<u64>, ManifestError> {
            match attrs.get(name) {
                None => Ok(None),
                Some(value) => value.as_u64().map(Some).ok_or_else(|| {
                    ManifestError::schema(Self::ENTITY, name, "a non-negative integer")
                }),
            }
        };
        let range = match (index("start")?, index("end")?) {
            (Some(start), Some(end)) => Some(TypeRange { start, end }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ManifestError::schema(
                    Self::ENTITY,
                    "end",
                    "an integer whenever `start` is present",
                ))
            }
            (None, Some(_)) => {
                return Err(ManifestError::schema(
                    Self::ENTITY,
                    "start",
                    "an integer whenever `end` is present",
                ))
            }
        };
        Ok(TypeReference {
            reference: Reference {
                name: attrs.required_string("name")?,
                package: attrs.string("package"),
                module: attrs.string("module"),
            },
            range,
        })
    }
}

static TYPE: Lazy<Schema> = Lazy::new(|| {
    Schema::new(Type::ENTITY).with(&[
        Field::required("text", Shape::String),
        Field::optional("references", Shape::Array),
        Field::optional("source", Shape::Object),
    ])
});

/// A JSDoc, Closure, or TypeScript type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    /// The full type string, in whatever type syntax the source uses.
    pub text: String,
    /// References to the types named in `text`, so tools can cross-link
    /// `Array<FooElement | BarElement>` without understanding the type syntax.
    pub references: Option<Vec<TypeReference>>,
    pub source: Option<SourceReference>,
}

impl ValueType for Type {
    const ENTITY: &'static str = "type";

    fn from_raw(raw: &Value, engine: &Engine) -> Result<Self, ManifestError> {
        let attrs = TYPE.validate(as_object(Self::ENTITY, raw)?, engine.config().strict)?;
        let values = engine.values();
        let source = values.construct_optional(Role::Source, attrs.raw("source"), engine)?;
        let references =
            values.construct_list(Role::TypeReference, attrs.array("references"), engine)?;
        Ok(Type {
            text: attrs.required_string("text")?,
            references,
            source,
        })
    }
}

static SOURCE_REFERENCE: Lazy<Schema> = Lazy::new(|| {
    Schema::new(SourceReference::ENTITY).with(&[Field::required("href", Shape::String)])
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReference {
    /// An absolute URL to the source, e.g. a GitHub URL.
    pub href: String,
}

impl ValueType for SourceReference {
    const ENTITY: &'static str = "source";

    fn from_raw(raw: &Value, engine: &Engine) -> Result<Self, ManifestError> {
        let attrs =
            SOURCE_REFERENCE.validate(as_object(Self::ENTITY, raw)?, engine.config().strict)?;
        Ok(SourceReference {
            href: attrs.required_string("href")?,
        })
    }
}

static ATTRIBUTE: Lazy<Schema> = Lazy::new(|| {
    Schema::new(Attribute::ENTITY).with(&[
        Field::required("name", Shape::String),
        Field::optional("summary", Shape::String),
        Field::optional("description", Shape::String),
        Field::optional("inheritedFrom", Shape::Object),
        Field::optional("type", Shape::Object),
        Field::optional("default", Shape::String),
        Field::optional("fieldName", Shape::String),
        Field::optional("resolveInitializer", Shape::Object),
        Field::optional("deprecated", Shape::StringOrBool),
    ])
});

/// An HTML attribute understood by a custom element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub inherited_from: Option<Reference>,
    /// The type the attribute is (de)serialized as.
    pub ty: Option<Type>,
    /// Attributes are always strings, so this is the literal default value.
    pub default: Option<String>,
    /// The associated field, if any.
    pub field_name: Option<String>,
    pub resolve_initializer: Option<ResolveInitializer>,
    pub deprecated: Option<Deprecation>,
}

impl ValueType for Attribute {
    const ENTITY: &'static str = "attribute";

    fn from_raw(raw: &Value, engine: &Engine) -> Result<Self, ManifestError> {
        let attrs = ATTRIBUTE.validate(as_object(Self::ENTITY, raw)?, engine.config().strict)?;
        let values = engine.values();
        let inherited_from =
            values.construct_optional(Role::InheritedFrom, attrs.raw("inheritedFrom"), engine)?;
        let ty = values.construct_optional(Role::Type, attrs.raw("type"), engine)?;
        let resolve_initializer = values.construct_optional(
            Role::ResolveInitializer,
            attrs.raw("resolveInitializer"),
            engine,
        )?;
        Ok(Attribute {
            name: attrs.required_string("name")?,
            summary: attrs.string("summary"),
            description: attrs.string("description"),
            inherited_from,
            ty,
            default: attrs.string("default"),
            field_name: attrs.string("fieldName"),
            resolve_initializer,
            deprecated: attrs.deprecated(),
        })
    }
}

static EVENT: Lazy<Schema> = Lazy::new(|| {
    Schema::new(Event::ENTITY).with(&[
        Field::required("name", Shape::String),
        Field::required("type", Shape::Object),
        Field::optional("summary", Shape::String),
        Field::optional("description", Shape::String),
        Field::optional("inheritedFrom", Shape::Object),
        Field::optional("deprecated", Shape::StringOrBool),
    ])
});

/// An event fired by a custom element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    /// The type of the event object that's fired.
    pub ty: Type,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub inherited_from: Option<Reference>,
    pub deprecated: Option<Deprecation>,
}

impl ValueType for Event {
    const ENTITY: &'static str = "event";

    fn from_raw(raw: &Value, engine: &Engine) -> Result<Self, ManifestError> {
        let attrs = EVENT.validate(as_object(Self::ENTITY, raw)?, engine.config().strict)?;
        let values = engine.values();
        let inherited_from =
            values.construct_optional(Role::InheritedFrom, attrs.raw("inheritedFrom"), engine)?;
        let ty = match attrs.raw("type") {
            Some(raw) => values.construct(Role::Type, raw, engine)?,
            None => return Err(ManifestError::schema(Self::ENTITY, "type", "an object")),
        };
        Ok(Event {
            name: attrs.required_string("name")?,
            ty,
            summary: attrs.string("summary"),
            description: attrs.string("description"),
            inherited_from,
            deprecated: attrs.deprecated(),
        })
    }
}

const NAMED_FEATURE: &[Field] = &[
    Field::required("name", Shape::String),
    Field::optional("summary", Shape::String),
    Field::optional("description", Shape::String),
    Field::optional("deprecated", Shape::StringOrBool),
];

static SLOT: Lazy<Schema> = Lazy::new(|| Schema::new(Slot::ENTITY).with(NAMED_FEATURE));

/// A shadow DOM content slot. The empty name is the default slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: Option<Deprecation>,
}

impl Slot {
    pub fn is_default(&self) -> bool {
        self.name.is_empty()
    }
}

impl ValueType for Slot {
    const ENTITY: &'static str = "slot";

    fn from_raw(raw: &Value, engine: &Engine) -> Result<Self, ManifestError> {
        let attrs = SLOT.validate(as_object(Self::ENTITY, raw)?, engine.config().strict)?;
        Ok(Slot {
            name: attrs.required_string("name")?,
            summary: attrs.string("summary"),
            description: attrs.string("description"),
            deprecated: attrs.deprecated(),
        })
    }
}

static CSS_PART: Lazy<Schema> = Lazy::new(|| Schema::new(CssPart::ENTITY).with(NAMED_FEATURE));

/// A CSS shadow part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssPart {
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: Option<Deprecation>,
}

impl ValueType for CssPart {
    const ENTITY: &'static str = "css_part";

    fn from_raw(raw: &Value, engine: &Engine) -> Result<Self, ManifestError> {
        let attrs = CSS_PART.validate(as_object(Self::ENTITY, raw)?, engine.config().strict)?;
        Ok(CssPart {
            name: attrs.required_string("name")?,
            summary: attrs.string("summary"),
            description: attrs.string("description"),
            deprecated: attrs.deprecated(),
        })
    }
}

static CSS_CUSTOM_PROPERTY: Lazy<Schema> = Lazy::new(|| {
    Schema::new(CssCustomProperty::ENTITY)
        .with(NAMED_FEATURE)
        .with(&[
            Field::optional("syntax", Shape::String),
            Field::optional("default", Shape::String),
        ])
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssCustomProperty {
    /// Includes the leading `--`.
    pub name: String,
    /// A CSS syntax string such as `"<color>"` or `"small | medium | large"`.
    pub syntax: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub default: Option<String>,
    pub deprecated: Option<Deprecation>,
}

impl ValueType for CssCustomProperty {
    const ENTITY: &'static str = "css_custom_property";

    fn from_raw(raw: &Value, engine: &Engine) -> Result<Self, ManifestError> {
        let attrs =
            CSS_CUSTOM_PROPERTY.validate(as_object(Self::ENTITY, raw)?, engine.config().strict)?;
        Ok(CssCustomProperty {
            name: attrs.required_string("name")?,
            syntax: attrs.string("syntax"),
            summary: attrs.string("summary"),
            description: attrs.string("description"),
            default: attrs.string("default"),
            deprecated: attrs.deprecated(),
        })
    }
}

static DEMO: Lazy<Schema> = Lazy::new(|| {
    Schema::new(Demo::ENTITY).with(&[
        Field::required("url", Shape::String),
        Field::optional("description", Shape::String),
        Field::optional("source", Shape::Object),
    ])
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demo {
    /// Relative if published with the package, absolute if hosted.
    pub url: String,
    pub description: Option<String>,
    pub source: Option<SourceReference>,
}

impl ValueType for Demo {
    const ENTITY: &'static str = "demo";

    fn from_raw(raw: &Value, engine: &Engine) -> Result<Self, ManifestError> {
        let attrs = DEMO.validate(as_object(Self::ENTITY, raw)?, engine.config().strict)?;
        let source =
            engine
                .values()
                .construct_optional(Role::Source, attrs.raw("source"), engine)?;
        Ok(Demo {
            url: attrs.required_string("url")?,
            description: attrs.string("description"),
            source,
        })
    }
}

static PARAMETER: Lazy<Schema> = Lazy::new(|| {
    Schema::new(Parameter::ENTITY).with(PROPERTY_LIKE).with(&[
        Field::optional("optional", Shape::Bool).with_default(|| Value::Bool(false)),
        Field::optional("rest", Shape::Bool).with_default(|| Value::Bool(false)),
    ])
});

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub property: PropertyLike,
    /// Absent in the input means not optional.
    pub optional: bool,
    /// Only the last parameter may be a rest parameter.
    pub rest: bool,
}

impl Parameter {
    pub fn name(&self) -> &str {
        &self.property.name
    }
}

impl ValueType for Parameter {
    const ENTITY: &'static str = "parameter";

    fn from_raw(raw: &Value, engine: &Engine) -> Result<Self, ManifestError> {
        let attrs = PARAMETER.validate(as_object(Self::ENTITY, raw)?, engine.config().strict)?;
        Ok(Parameter {
            property: PropertyLike::from_attrs(&attrs, engine)?,
            optional: attrs.bool("optional").unwrap_or(false),
            rest: attrs.bool("rest").unwrap_or(false),
        })
    }
}

static FUNCTION_RETURN_TYPE: Lazy<Schema> = Lazy::new(|| {
    Schema::new(FunctionReturnType::ENTITY).with(&[
        Field::optional("type", Shape::Object),
        Field::optional("summary", Shape::String),
        Field::optional("description", Shape::String),
    ])
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionReturnType {
    pub ty: Option<Type>,
    pub summary: Option<String>,
    pub description: Option<String>,
}

impl ValueType for FunctionReturnType {
    const ENTITY: &'static str = "function_return_type";

    fn from_raw(raw: &Value, engine: &Engine) -> Result<Self, ManifestError> {
        let attrs =
            FUNCTION_RETURN_TYPE.validate(as_object(Self::ENTITY, raw)?, engine.config().strict)?;
        let ty = engine
            .values()
            .construct_optional(Role::Type, attrs.raw("type"), engine)?;
        Ok(FunctionReturnType {
            ty,
            summary: attrs.string("summary"),
            description: attrs.string("description"),
        })
    }
}

static RESOLVE_INITIALIZER: Lazy<Schema> = Lazy::new(|| {
    Schema::new(ResolveInitializer::ENTITY).with(&[Field::optional("module", Shape::String)])
});

/// Emitted by some analyzers alongside attributes; names the module an initializer lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveInitializer {
    pub module: Option<String>,
}

impl ValueType for ResolveInitializer {
    const ENTITY: &'static str = "resolve_initializer";

    fn from_raw(raw: &Value, engine: &Engine) -> Result<Self, ManifestError> {
        let attrs =
            RESOLVE_INITIALIZER.validate(as_object(Self::ENTITY, raw)?, engine.config().strict)?;
        Ok(ResolveInitializer {
            module: attrs.string("module"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_log::test;

    fn engine() -> Engine {
        Engine::default()
    }

    #[test]
    fn test_reference_fields() {
        let reference = Reference::from_raw(
            &json!({ "name": "HTMLElement", "package": "global:" }),
            &engine(),
        )
        .unwrap();
        assert_eq!(reference.name, "HTMLElement");
        assert!(reference.is_global());
        assert_eq!(reference.module, None);
    }

    #[test]
    fn test_reference_must_be_an_object() {
        let err = Reference::from_raw(&json!("HTMLElement"), &engine()).unwrap_err();
        assert!(err.is_schema_violation());
    }

    #[test]
    fn test_type_reference_range_is_joint() {
        let engine = engine();
        let full = TypeReference::from_raw(
            &json!({ "name": "Foo", "module": "foo.js", "start": 6, "end": 9 }),
            &engine,
        )
        .unwrap();
        assert_eq!(full.start(), Some(6));
        assert_eq!(full.end(), Some(9));
        assert_eq!(full.name(), "Foo");

        let bare = TypeReference::from_raw(&json!({ "name": "Foo" }), &engine).unwrap();
        assert_eq!(bare.range, None);

        let half = TypeReference::from_raw(&json!({ "name": "Foo", "start": 1 }), &engine)
            .unwrap_err();
        assert_eq!(half.field(), Some("end"));

        let other_half =
            TypeReference::from_raw(&json!({ "name": "Foo", "end": 1 }), &engine).unwrap_err();
        assert_eq!(other_half.field(), Some("start"));

        let negative = TypeReference::from_raw(
            &json!({ "name": "Foo", "start": -1, "end": 2 }),
            &engine,
        )
        .unwrap_err();
        assert_eq!(negative.field(), Some("start"));
    }

    #[test]
    fn test_type_resolves_nested_references_in_order() {
        let ty = Type::from_raw(
            &json!({
                "text": "Array<FooElement | BarElement>",
                "references": [
                    { "name": "FooElement", "start": 6, "end": 16 },
                    { "name": "BarElement", "start": 19, "end": 29 }
                ],
                "source": { "href": "https://example.com/types.ts" }
            }),
            &engine(),
        )
        .unwrap();
        let names = ty
            .references
            .as_ref()
            .unwrap()
            .iter()
            .map(TypeReference::name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["FooElement", "BarElement"]);
        assert_eq!(
            ty.source.unwrap().href,
            "https://example.com/types.ts".to_string()
        );
    }

    #[test]
    fn test_event_requires_a_type() {
        let err = Event::from_raw(&json!({ "name": "change" }), &engine()).unwrap_err();
        assert_eq!(err.field(), Some("type"));

        let event = Event::from_raw(
            &json!({
                "name": "change",
                "type": { "text": "CustomEvent" },
                "inheritedFrom": { "name": "BaseElement", "module": "base.js" }
            }),
            &engine(),
        )
        .unwrap();
        assert_eq!(event.ty.text, "CustomEvent");
        assert_eq!(event.inherited_from.unwrap().name, "BaseElement");
    }

    #[test]
    fn test_attribute_resolves_composite_fields() {
        let attribute = Attribute::from_raw(
            &json!({
                "name": "disabled",
                "type": { "text": "boolean" },
                "default": "false",
                "fieldName": "disabled",
                "resolveInitializer": { "module": "src/light-pen.js" },
                "deprecated": "Use inert"
            }),
            &engine(),
        )
        .unwrap();
        assert_eq!(attribute.ty.unwrap().text, "boolean");
        assert_eq!(
            attribute.resolve_initializer.unwrap().module.as_deref(),
            Some("src/light-pen.js")
        );
        let deprecated = attribute.deprecated.unwrap();
        assert!(deprecated.is_deprecated());
        assert_eq!(deprecated.reason(), Some("Use inert"));
    }

    #[test]
    fn test_parameter_flags_default_to_false() {
        let parameter = Parameter::from_raw(
            &json!({ "name": "base", "type": { "text": "Constructor" } }),
            &engine(),
        )
        .unwrap();
        assert_eq!(parameter.name(), "base");
        assert!(!parameter.optional);
        assert!(!parameter.rest);
        assert_eq!(parameter.property.ty.unwrap().text, "Constructor");

        let rest = Parameter::from_raw(&json!({ "name": "args", "rest": true }), &engine())
            .unwrap();
        assert!(rest.rest);
    }

    #[test]
    fn test_slot_default_and_demo_source() {
        let slot = Slot::from_raw(&json!({ "name": "" }), &engine()).unwrap();
        assert!(slot.is_default());

        let demo = Demo::from_raw(
            &json!({ "url": "/demo", "source": { "href": "https://example.com/demo.html" } }),
            &engine(),
        )
        .unwrap();
        assert!(demo.source.is_some());
    }

    #[test]
    fn test_unknown_field_on_value_is_rejected() {
        let err = CssPart::from_raw(&json!({ "name": "base", "color": "red" }), &engine())
            .unwrap_err();
        assert_eq!(err.field(), Some("color"));
    }

    #[test]
    fn test_privacy_parsing() {
        assert_eq!("protected".parse::<Privacy>().unwrap(), Privacy::Protected);
        assert!("internal".parse::<Privacy>().is_err());
        assert_eq!(Privacy::Private.to_string(), "private");
    }

    #[test]
    fn test_deprecation_flag_false_is_not_deprecated() {
        assert!(!Deprecation::Flag(false).is_deprecated());
        assert!(Deprecation::Flag(true).is_deprecated());
        assert_eq!(Deprecation::Flag(true).reason(), None);
    }
}

//! Shared field groups composed by the concrete node kinds.
//!
//! A node embeds the bundle structs it needs rather than inheriting them: a `class` holds a
//! [`ClassLike`] and, when it is a custom element, a [`CustomElementLike`]; a `mixin` adds a
//! [`FunctionLike`] on top. Each bundle publishes its raw field table (`CLASS_LIKE`, ...) for
//! the node's [`Schema`](crate::schema::Schema) and a `from_attrs` routine that upgrades its
//! auxiliary-value fields through the engine's role table.

use crate::{
    engine::Engine,
    error::ManifestError,
    nodes::{JavaScriptModule, Node},
    registry::Slot,
    roles::Role,
    schema::{Attrs, Field, Shape},
    values::{
        Attribute, CssCustomProperty, CssPart, Demo, Deprecation, Event, FunctionReturnType,
        Parameter, Reference, Slot as SlotValue, SourceReference, Type,
    },
};
use once_cell::sync::OnceCell;
use std::{
    fmt::{Debug, Formatter},
    sync::{Arc, Weak},
};

/// Non-owning back-reference from a declaration to the module that contains it.
///
/// Unset until the owning module finishes resolving its children, then set exactly once. The
/// handle never keeps the module alive: once the manifest is dropped, [`ParentModule::get`]
/// returns `None`.
#[derive(Default, Clone)]
pub struct ParentModule(OnceCell<Weak<JavaScriptModule>>);

impl ParentModule {
    pub fn unset() -> Self {
        ParentModule::default()
    }

    pub fn get(&self) -> Option<Arc<JavaScriptModule>> {
        self.0.get().and_then(Weak::upgrade)
    }

    pub fn is_set(&self) -> bool {
        self.0.get().is_some()
    }

    /// Record the owning module. Returns `false` if a module was already recorded, in which case
    /// the earlier one is kept.
    pub fn attach(&self, module: &Arc<JavaScriptModule>) -> bool {
        self.0.set(Arc::downgrade(module)).is_ok()
    }

    fn path(&self) -> Option<String> {
        self.get().map(|module| module.path.clone())
    }
}

impl Debug for ParentModule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ParentModule").field(&self.path()).finish()
    }
}

// Compared by module path so independently resolved trees can be compared.
impl PartialEq for ParentModule {
    fn eq(&self, other: &Self) -> bool {
        self.is_set() == other.is_set() && self.path() == other.path()
    }
}

impl Eq for ParentModule {}

/// A node that can locate its owning module.
pub trait Declarable {
    fn parent(&self) -> &ParentModule;

    fn parent_module(&self) -> Option<Arc<JavaScriptModule>> {
        self.parent().get()
    }
}

pub const PROPERTY_LIKE: &[Field] = &[
    Field::required("name", Shape::String),
    Field::optional("summary", Shape::String),
    Field::optional("description", Shape::String),
    Field::optional("type", Shape::Object),
    Field::optional("default", Shape::String),
    Field::optional("deprecated", Shape::StringOrBool),
    Field::optional("readonly", Shape::Bool),
];

/// Variables, class fields, and function parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyLike {
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub ty: Option<Type>,
    pub default: Option<String>,
    pub deprecated: Option<Deprecation>,
    pub readonly: Option<bool>,
}

impl PropertyLike {
    pub fn from_attrs(attrs: &Attrs<'_>, engine: &Engine) -> Result<Self, ManifestError> {
        let ty = engine
            .values()
            .construct_optional(Role::Type, attrs.raw("type"), engine)?;
        Ok(PropertyLike {
            name: attrs.required_string("name")?,
            summary: attrs.string("summary"),
            description: attrs.string("description"),
            ty,
            default: attrs.string("default"),
            deprecated: attrs.deprecated(),
            readonly: attrs.bool("readonly"),
        })
    }
}

pub const FUNCTION_LIKE: &[Field] = &[
    Field::optional("name", Shape::String),
    Field::optional("summary", Shape::String),
    Field::optional("description", Shape::String),
    Field::optional("deprecated", Shape::StringOrBool),
    Field::optional("parameters", Shape::Array),
    Field::optional("return", Shape::Object),
];

/// Functions, methods, and mixins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionLike {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: Option<Deprecation>,
    pub parameters: Option<Vec<Parameter>>,
    pub return_type: Option<FunctionReturnType>,
}

impl FunctionLike {
    pub fn from_attrs(attrs: &Attrs<'_>, engine: &Engine) -> Result<Self, ManifestError> {
        let values = engine.values();
        let parameters =
            values.construct_list(Role::Parameter, attrs.array("parameters"), engine)?;
        let return_type =
            values.construct_optional(Role::FunctionReturnType, attrs.raw("return"), engine)?;
        Ok(FunctionLike {
            name: attrs.string("name"),
            summary: attrs.string("summary"),
            description: attrs.string("description"),
            deprecated: attrs.deprecated(),
            parameters,
            return_type,
        })
    }
}

pub const CLASS_LIKE: &[Field] = &[
    Field::required("name", Shape::String),
    Field::optional("summary", Shape::String),
    Field::optional("description", Shape::String),
    Field::optional("superclass", Shape::Object),
    Field::optional("mixins", Shape::Array),
    Field::optional("members", Shape::Array),
    Field::optional("source", Shape::Object),
    Field::optional("deprecated", Shape::StringOrBool),
];

/// The common interface of classes and mixins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLike {
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    /// The true superclass. With mixin applications in the extends clause, the prototype chain
    /// is this superclass with `mixins` applied in order.
    pub superclass: Option<Reference>,
    /// Mixin applications, innermost first: `class T extends B(A(S))` lists `[A, B]`.
    pub mixins: Option<Vec<Reference>>,
    /// `field` and `method` nodes.
    pub members: Option<Vec<Node>>,
    pub source: Option<SourceReference>,
    pub deprecated: Option<Deprecation>,
}

impl ClassLike {
    /// Builds the bundle with its reference and composite fields resolved. `members` is left
    /// empty; call [`ClassLike::resolve_members`] once the node's feature lists are built.
    pub fn from_attrs(attrs: &Attrs<'_>, engine: &Engine) -> Result<Self, ManifestError> {
        let values = engine.values();
        let superclass =
            values.construct_optional(Role::Superclass, attrs.raw("superclass"), engine)?;
        let mixins = values.construct_list(Role::Mixin, attrs.array("mixins"), engine)?;
        let source = values.construct_optional(Role::Source, attrs.raw("source"), engine)?;
        Ok(ClassLike {
            name: attrs.required_string("name")?,
            summary: attrs.string("summary"),
            description: attrs.string("description"),
            superclass,
            mixins,
            members: None,
            source,
            deprecated: attrs.deprecated(),
        })
    }

    pub fn resolve_members(
        &mut self,
        attrs: &Attrs<'_>,
        engine: &Engine,
    ) -> Result<(), ManifestError> {
        self.members = attrs
            .array("members")
            .map(|members| engine.dispatch_all(members, Slot::Members))
            .transpose()?;
        Ok(())
    }

    pub fn member(&self, name: &str) -> Option<&Node> {
        self.members
            .iter()
            .flatten()
            .find(|member| member.name() == Some(name))
    }

    pub(crate) fn attach_members(&self, module: &Arc<JavaScriptModule>) {
        for member in self.members.iter().flatten() {
            member.attach_module(module, false);
        }
    }
}

/// Fields that only make sense on a custom element.
pub const CUSTOM_ELEMENT_ONLY: &[&str] = &[
    "tagName",
    "attributes",
    "demos",
    "cssProperties",
    "cssParts",
    "slots",
    "events",
];

pub const CUSTOM_ELEMENT_LIKE: &[Field] = &[
    Field::optional("customElement", Shape::True),
    Field::optional("tagName", Shape::String),
    Field::optional("attributes", Shape::Array),
    Field::optional("demos", Shape::Array),
    Field::optional("cssProperties", Shape::Array),
    Field::optional("cssParts", Shape::Array),
    Field::optional("slots", Shape::Array),
    Field::optional("events", Shape::Array),
];

/// The additional fields a custom element adds to a class or mixin.
///
/// Every `class` and `mixin` must carry `customElement: true`, so a declaration built by the
/// stock engine always has this bundle. Only an engine configured with
/// [`plain_classes`](crate::config::ParserConfig::plain_classes) builds declarations without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomElementLike {
    /// Set for self-registering elements, which must also export a
    /// `custom-element-definition`.
    pub tag_name: Option<String>,
    /// HTML attributes, distinct from the entity's raw attribute bag.
    pub attributes: Option<Vec<Attribute>>,
    pub demos: Option<Vec<Demo>>,
    pub css_properties: Option<Vec<CssCustomProperty>>,
    pub css_parts: Option<Vec<CssPart>>,
    pub slots: Option<Vec<SlotValue>>,
    pub events: Option<Vec<Event>>,
}

impl CustomElementLike {
    /// Always `true`.
    pub fn custom_element(&self) -> bool {
        true
    }

    /// Fails unless `customElement` is `true`. With `plain_classes` set, a declaration without
    /// the flag yields `Ok(None)` as long as it carries no custom-element fields either.
    pub fn from_attrs(attrs: &Attrs<'_>, engine: &Engine) -> Result<Option<Self>, ManifestError> {
        if attrs.bool("customElement") != Some(true) {
            if !engine.config().plain_classes {
                return Err(ManifestError::schema(
                    attrs.entity(),
                    "customElement",
                    "to be present and `true`",
                ));
            }
            if let Some(field) = CUSTOM_ELEMENT_ONLY.iter().find(|f| attrs.contains(f)) {
                return Err(ManifestError::schema(
                    attrs.entity(),
                    *field,
                    "to be absent unless `customElement` is true",
                ));
            }
            return Ok(None);
        }

        let values = engine.values();
        let attributes =
            values.construct_list(Role::Attribute, attrs.array("attributes"), engine)?;
        let events = values.construct_list(Role::Event, attrs.array("events"), engine)?;
        let slots = values.construct_list(Role::Slot, attrs.array("slots"), engine)?;
        let css_parts = values.construct_list(Role::CssPart, attrs.array("cssParts"), engine)?;
        let css_properties = values.construct_list(
            Role::CssCustomProperty,
            attrs.array("cssProperties"),
            engine,
        )?;
        let demos = values.construct_list(Role::Demo, attrs.array("demos"), engine)?;
        Ok(Some(CustomElementLike {
            tag_name: attrs.string("tagName"),
            attributes,
            demos,
            css_properties,
            css_parts,
            slots,
            events,
        }))
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().flatten().find(|a| a.name == name)
    }

    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.iter().flatten().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ParserConfig,
        schema::{RawMap, Schema},
    };
    use serde_json::json;
    use test_log::test;

    fn raw(value: serde_json::Value) -> RawMap {
        value.as_object().cloned().unwrap()
    }

    fn class_schema() -> Schema {
        Schema::new("class")
            .with(CLASS_LIKE)
            .with(CUSTOM_ELEMENT_LIKE)
    }

    #[test]
    fn test_parent_module_starts_unset() {
        let parent = ParentModule::unset();
        assert!(!parent.is_set());
        assert!(parent.get().is_none());
        assert_eq!(parent, ParentModule::default());
    }

    #[test]
    fn test_mixins_keep_application_order() {
        let engine = Engine::default();
        let raw = raw(json!({
            "name": "T",
            "superclass": { "name": "S" },
            "mixins": [{ "name": "A" }, { "name": "B" }]
        }));
        let attrs = class_schema().validate(&raw, true).unwrap();
        let class_like = ClassLike::from_attrs(&attrs, &engine).unwrap();
        let mixins = class_like
            .mixins
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect::<Vec<_>>();
        assert_eq!(mixins, vec!["A", "B"]);
        assert_eq!(class_like.superclass.unwrap().name, "S");
    }

    fn plain_engine() -> Engine {
        Engine::with_config(ParserConfig {
            plain_classes: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_missing_custom_element_flag_is_rejected() {
        let raw = raw(json!({ "name": "Plain" }));
        let attrs = class_schema().validate(&raw, true).unwrap();
        let err = CustomElementLike::from_attrs(&attrs, &Engine::default()).unwrap_err();
        assert!(err.is_schema_violation());
        assert_eq!(err.field(), Some("customElement"));
    }

    #[test]
    fn test_plain_class_has_no_custom_element_bundle() {
        let raw = raw(json!({ "name": "Plain" }));
        let attrs = class_schema().validate(&raw, true).unwrap();
        assert!(CustomElementLike::from_attrs(&attrs, &plain_engine())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_custom_element_fields_need_the_flag() {
        let engine = plain_engine();
        let raw = raw(json!({ "name": "Half", "tagName": "half-element" }));
        let attrs = class_schema().validate(&raw, true).unwrap();
        let err = CustomElementLike::from_attrs(&attrs, &engine).unwrap_err();
        assert_eq!(err.field(), Some("tagName"));
    }

    #[test]
    fn test_custom_element_flag_must_be_true() {
        let raw = raw(json!({ "name": "Nope", "customElement": false }));
        let err = class_schema().validate(&raw, true).unwrap_err();
        assert_eq!(err.field(), Some("customElement"));
    }

    #[test]
    fn test_feature_lists_preserve_order() {
        let engine = Engine::default();
        let raw = raw(json!({
            "name": "LightPen",
            "customElement": true,
            "tagName": "light-pen",
            "slots": [{ "name": "title" }, { "name": "" }, { "name": "footer" }],
            "cssParts": [{ "name": "base" }, { "name": "panel" }]
        }));
        let attrs = class_schema().validate(&raw, true).unwrap();
        let element = CustomElementLike::from_attrs(&attrs, &engine)
            .unwrap()
            .unwrap();
        assert!(element.custom_element());
        assert_eq!(element.tag_name.as_deref(), Some("light-pen"));
        let slots = element
            .slots
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect::<Vec<_>>();
        assert_eq!(slots, vec!["title", "", "footer"]);
        assert_eq!(element.css_parts.unwrap().len(), 2);
        assert!(element.events.is_none());
    }
}

use crate::{
    engine::Engine,
    error::ManifestError,
    nodes::NodeKind,
    roles::Role,
    schema::{check_kind, Field, RawMap, Schema, Shape},
    traits::{Declarable, ParentModule},
    values::{Deprecation, Reference},
};
use once_cell::sync::Lazy;

const EXPORT: &[Field] = &[
    Field::required("name", Shape::String),
    Field::optional("declaration", Shape::Object),
    Field::optional("deprecated", Shape::StringOrBool),
];

static JS_EXPORT: Lazy<Schema> = Lazy::new(|| {
    Schema::new(JavaScriptExport::KIND)
        .with(&[Field::required(
            "kind",
            Shape::Literal(JavaScriptExport::KIND),
        )])
        .with(EXPORT)
});

static CUSTOM_ELEMENT_EXPORT: Lazy<Schema> = Lazy::new(|| {
    Schema::new(CustomElementExport::KIND)
        .with(&[
            Field::required("kind", Shape::Literal(CustomElementExport::KIND)),
            Field::required("declaration", Shape::Object),
        ])
        .with(EXPORT)
});

/// A JavaScript export. `name` is the exported symbol, or `*` for a re-export of all symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaScriptExport {
    parent: ParentModule,
    pub name: String,
    /// What is exported. Absent for re-exports that don't resolve to one declaration.
    pub declaration: Option<Reference>,
    pub deprecated: Option<Deprecation>,
}

impl NodeKind for JavaScriptExport {
    const KIND: &'static str = "js";
}

impl Declarable for JavaScriptExport {
    fn parent(&self) -> &ParentModule {
        &self.parent
    }
}

impl JavaScriptExport {
    pub fn from_raw(raw: &RawMap, engine: &Engine) -> Result<Self, ManifestError> {
        check_kind(raw, Self::KIND)?;
        let attrs = JS_EXPORT.validate(raw, engine.config().strict)?;
        let declaration = engine.values().construct_optional(
            Role::Declaration,
            attrs.raw("declaration"),
            engine,
        )?;
        Ok(JavaScriptExport {
            parent: ParentModule::unset(),
            name: attrs.required_string("name")?,
            declaration,
            deprecated: attrs.deprecated(),
        })
    }
}

/// A global custom element registration: `customElements.define(name, declaration)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomElementExport {
    parent: ParentModule,
    /// The tag name the element is registered under.
    pub name: String,
    pub declaration: Reference,
    pub deprecated: Option<Deprecation>,
}

impl NodeKind for CustomElementExport {
    const KIND: &'static str = "custom-element-definition";
}

impl Declarable for CustomElementExport {
    fn parent(&self) -> &ParentModule {
        &self.parent
    }
}

impl CustomElementExport {
    pub fn from_raw(raw: &RawMap, engine: &Engine) -> Result<Self, ManifestError> {
        check_kind(raw, Self::KIND)?;
        let attrs = CUSTOM_ELEMENT_EXPORT.validate(raw, engine.config().strict)?;
        let declaration = match attrs.raw("declaration") {
            Some(raw) => engine.values().construct(Role::Declaration, raw, engine)?,
            None => return Err(ManifestError::schema(Self::KIND, "declaration", "an object")),
        };
        Ok(CustomElementExport {
            parent: ParentModule::unset(),
            name: attrs.required_string("name")?,
            declaration,
            deprecated: attrs.deprecated(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_log::test;

    #[test]
    fn test_js_export_without_declaration() {
        let raw = json!({ "kind": "js", "name": "*" });
        let export = JavaScriptExport::from_raw(raw.as_object().unwrap(), &Engine::default())
            .unwrap();
        assert_eq!(export.name, "*");
        assert!(export.declaration.is_none());
    }

    #[test]
    fn test_custom_element_export_requires_declaration() {
        let raw = json!({ "kind": "custom-element-definition", "name": "light-pen" });
        let err = CustomElementExport::from_raw(raw.as_object().unwrap(), &Engine::default())
            .unwrap_err();
        assert_eq!(err.field(), Some("declaration"));

        let raw = json!({
            "kind": "custom-element-definition",
            "name": "light-pen",
            "declaration": { "name": "LightPen", "module": "src/light-pen.js" }
        });
        let export = CustomElementExport::from_raw(raw.as_object().unwrap(), &Engine::default())
            .unwrap();
        assert_eq!(export.declaration.module.as_deref(), Some("src/light-pen.js"));
    }
}

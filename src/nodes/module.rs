use crate::{
    engine::Engine,
    error::ManifestError,
    nodes::{Node, NodeKind},
    registry::Slot,
    schema::{check_kind, Field, RawMap, Schema, Shape},
    values::Deprecation,
};
use once_cell::sync::Lazy;
use std::sync::Arc;

static SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(JavaScriptModule::KIND).with(&[
        Field::required("kind", Shape::Literal(JavaScriptModule::KIND)),
        Field::required("path", Shape::String),
        Field::optional("summary", Shape::String),
        Field::optional("declarations", Shape::Array),
        Field::optional("exports", Shape::Array),
        Field::optional("deprecated", Shape::StringOrBool),
    ])
});

/// One JavaScript module of the package.
///
/// Owns its declarations and exports. Every child receives a weak back-reference to this module
/// once the module itself has been built, which is why modules are handed out behind an [`Arc`].
#[derive(Debug, PartialEq, Eq)]
pub struct JavaScriptModule {
    /// Path relative to the package root.
    pub path: String,
    pub summary: Option<String>,
    /// Everything declared in the module, exported or not.
    pub declarations: Option<Vec<Node>>,
    /// JavaScript and custom-element-definition exports.
    pub exports: Option<Vec<Node>>,
    pub deprecated: Option<Deprecation>,
}

impl NodeKind for JavaScriptModule {
    const KIND: &'static str = "javascript-module";
}

impl JavaScriptModule {
    pub fn from_raw(raw: &RawMap, engine: &Engine) -> Result<Arc<Self>, ManifestError> {
        check_kind(raw, Self::KIND)?;
        let attrs = SCHEMA.validate(raw, engine.config().strict)?;
        let path = attrs.required_string("path")?;
        tracing::debug!("[JavaScriptModule::from_raw] resolving '{}'", path);

        let declarations = attrs
            .array("declarations")
            .map(|items| engine.dispatch_all(items, Slot::Declarations))
            .transpose()?;
        let exports = attrs
            .array("exports")
            .map(|items| engine.dispatch_all(items, Slot::Exports))
            .transpose()?;

        let module = Arc::new(JavaScriptModule {
            path,
            summary: attrs.string("summary"),
            declarations,
            exports,
            deprecated: attrs.deprecated(),
        });

        let attach_members = engine.config().attach_members;
        for child in module.declarations().chain(module.exports()) {
            child.attach_module(&module, attach_members);
        }
        Ok(module)
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Node> {
        self.declarations.iter().flatten()
    }

    pub fn exports(&self) -> impl Iterator<Item = &Node> {
        self.exports.iter().flatten()
    }

    pub fn declaration(&self, name: &str) -> Option<&Node> {
        self.declarations().find(|node| node.name() == Some(name))
    }

    pub fn export(&self, name: &str) -> Option<&Node> {
        self.exports().find(|node| node.name() == Some(name))
    }

    /// Declarations that are custom elements, in declaration order.
    pub fn custom_elements(&self) -> impl Iterator<Item = &Node> {
        self.declarations().filter(|node| node.is_custom_element())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_log::test;

    fn module(value: serde_json::Value) -> Result<Arc<JavaScriptModule>, ManifestError> {
        let raw = value.as_object().cloned().unwrap();
        JavaScriptModule::from_raw(&raw, &Engine::default())
    }

    #[test]
    fn test_empty_module() {
        let module = module(json!({ "kind": "javascript-module", "path": "src/empty.js" })).unwrap();
        assert_eq!(module.path, "src/empty.js");
        assert!(module.declarations.is_none());
        assert_eq!(module.declarations().count(), 0);
    }

    #[test]
    fn test_children_point_back_to_module() {
        let module = module(json!({
            "kind": "javascript-module",
            "path": "src/a.js",
            "declarations": [
                {
                    "kind": "class",
                    "name": "A",
                    "customElement": true,
                    "members": [{ "kind": "field", "name": "x" }]
                },
                { "kind": "variable", "name": "v" }
            ],
            "exports": [
                { "kind": "js", "name": "A", "declaration": { "name": "A", "module": "src/a.js" } }
            ]
        }))
        .unwrap();

        for child in module.declarations().chain(module.exports()) {
            let parent = child.parent_module().unwrap();
            assert!(Arc::ptr_eq(&parent, &module));
        }
        let class = module.declaration("A").unwrap();
        let field = class.class_like().unwrap().member("x").unwrap();
        assert!(Arc::ptr_eq(&field.parent_module().unwrap(), &module));
        assert_eq!(module.export("A").unwrap().kind(), "js");
    }

    #[test]
    fn test_back_reference_does_not_keep_module_alive() {
        let module = module(json!({
            "kind": "javascript-module",
            "path": "src/a.js",
            "declarations": [{ "kind": "function", "name": "f" }]
        }))
        .unwrap();
        let function = module.declaration("f").cloned().unwrap();
        assert!(function.parent_module().is_some());
        drop(module);
        assert!(function.parent_module().is_none());
        assert!(function.parent().unwrap().is_set());
    }

    #[test]
    fn test_wrong_slot_is_rejected() {
        let err = module(json!({
            "kind": "javascript-module",
            "path": "src/a.js",
            "declarations": [{ "kind": "js", "name": "A" }]
        }))
        .unwrap_err();
        assert!(err.is_mismatched_kind());
    }

    #[test]
    fn test_missing_path() {
        let err = module(json!({ "kind": "javascript-module" })).unwrap_err();
        assert_eq!(err.field(), Some("path"));
    }

    #[test]
    fn test_module_has_no_description() {
        let err = module(json!({
            "kind": "javascript-module",
            "path": "src/a.js",
            "summary": "Helpers",
            "description": "Long form helpers"
        }))
        .unwrap_err();
        assert_eq!(err.field(), Some("description"));
    }
}

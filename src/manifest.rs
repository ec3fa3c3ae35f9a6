//! The manifest root and the query helpers built on the resolved tree.
//!
//! [`ManifestRoot`] is the validated but unresolved document: its `modules` are still raw.
//! Nothing below the root is built until it is handed to [`Resolve::resolve`], which consumes it
//! and produces the [`Manifest`]. Callers that want a custom root implement [`Resolve`] for their
//! own type and hand it to [`Engine::resolve`](crate::engine::Engine::resolve).

use crate::{
    engine::Engine,
    error::ManifestError,
    nodes::{JavaScriptModule, Node},
    schema::{Field, Schema, Shape},
    values::Deprecation,
};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};

static SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new("manifest").with(&[
        Field::required("schemaVersion", Shape::String),
        Field::required("modules", Shape::Array),
        Field::optional("readme", Shape::String),
        Field::optional("deprecated", Shape::StringOrBool),
    ])
});

/// An entity that turns into its resolved form against an engine.
///
/// Resolution takes `self` by value, so a resolved tree can not be resolved a second time.
pub trait Resolve {
    type Output;

    fn resolve(self, engine: &Engine) -> Result<Self::Output, ManifestError>;
}

/// The top-level document after validation and before resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestRoot {
    pub schema_version: String,
    pub readme: Option<String>,
    pub deprecated: Option<Deprecation>,
    /// Raw module entries, dispatched on resolution.
    pub modules: Vec<Value>,
}

impl ManifestRoot {
    pub fn from_raw(raw: &Value, engine: &Engine) -> Result<Self, ManifestError> {
        let Some(map) = raw.as_object() else {
            return Err(ManifestError::InvalidDocument(format!(
                "expected a key/value document, found {}",
                json_type(raw)
            )));
        };
        let attrs = SCHEMA.validate(map, engine.config().strict)?;
        Ok(ManifestRoot {
            schema_version: attrs.required_string("schemaVersion")?,
            readme: attrs.string("readme"),
            deprecated: attrs.deprecated(),
            modules: attrs.array("modules").cloned().unwrap_or_default(),
        })
    }
}

impl Resolve for ManifestRoot {
    type Output = Manifest;

    fn resolve(self, engine: &Engine) -> Result<Manifest, ManifestError> {
        tracing::debug!(
            "[ManifestRoot::resolve] resolving {} modules (schema {})",
            self.modules.len(),
            self.schema_version
        );
        let modules = self
            .modules
            .iter()
            .map(|raw| engine.dispatch_module(raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Manifest {
            schema_version: self.schema_version,
            readme: self.readme,
            deprecated: self.deprecated,
            modules,
        })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A fully resolved manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub schema_version: String,
    /// Path to the package readme.
    pub readme: Option<String>,
    pub deprecated: Option<Deprecation>,
    pub modules: Vec<Arc<JavaScriptModule>>,
}

impl Manifest {
    pub fn module(&self, path: &str) -> Option<&Arc<JavaScriptModule>> {
        self.modules.iter().find(|module| module.path == path)
    }

    /// Every declaration that is a custom element, in module-then-declaration order.
    pub fn find_custom_elements(&self) -> Vec<&Node> {
        self.modules
            .iter()
            .flat_map(|module| module.custom_elements())
            .collect()
    }

    /// Custom elements whose tag name is one of `names`. Names with no matching element are
    /// left out.
    pub fn find_by_tag_names<S: AsRef<str>>(&self, names: &[S]) -> BTreeMap<String, &Node> {
        self.collect_tag_names(|tag| names.iter().any(|name| name.as_ref() == tag))
    }

    /// Every custom element that has a tag name, keyed by it.
    pub fn find_all_tag_names(&self) -> BTreeMap<String, &Node> {
        self.collect_tag_names(|_| true)
    }

    // Last one encountered wins on a repeated tag name.
    fn collect_tag_names(&self, keep: impl Fn(&str) -> bool) -> BTreeMap<String, &Node> {
        let mut found = BTreeMap::new();
        for element in self.find_custom_elements() {
            let Some(tag) = element.tag_name() else {
                continue;
            };
            if !keep(tag) {
                continue;
            }
            if let Some(previous) = found.insert(tag.to_string(), element) {
                tracing::debug!(
                    "[Manifest::find_by_tag_names] '{}' declared by both {:?} and {:?}, keeping the latter",
                    tag,
                    previous.name(),
                    element.name()
                );
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use serde_json::json;
    use test_log::test;

    fn element(name: &str, tag: &str) -> Value {
        json!({ "kind": "class", "name": name, "customElement": true, "tagName": tag })
    }

    fn document() -> Value {
        json!({
            "schemaVersion": "1.0.0",
            "readme": "README.md",
            "modules": [
                {
                    "kind": "javascript-module",
                    "path": "src/a.js",
                    "declarations": [
                        element("First", "x-dup"),
                        { "kind": "class", "name": "Plain" },
                        element("Other", "x-other")
                    ]
                },
                {
                    "kind": "javascript-module",
                    "path": "src/b.js",
                    "declarations": [element("Second", "x-dup")]
                }
            ]
        })
    }

    fn resolve(raw: &Value) -> Result<Manifest, ManifestError> {
        let engine = Engine::with_config(ParserConfig {
            plain_classes: true,
            ..Default::default()
        });
        ManifestRoot::from_raw(raw, &engine)?.resolve(&engine)
    }

    #[test]
    fn test_plain_class_is_rejected_by_default() {
        let engine = Engine::default();
        let root = ManifestRoot::from_raw(&document(), &engine).unwrap();
        let err = root.resolve(&engine).unwrap_err();
        assert_eq!(
            err,
            ManifestError::schema("class", "customElement", "to be present and `true`")
        );
    }

    #[test]
    fn test_root_requires_schema_version_and_modules() {
        let err = resolve(&json!({ "modules": [] })).unwrap_err();
        assert_eq!(err.field(), Some("schemaVersion"));
        let err = resolve(&json!({ "schemaVersion": "1.0.0" })).unwrap_err();
        assert_eq!(err.field(), Some("modules"));
    }

    #[test]
    fn test_non_object_document() {
        let err = resolve(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidDocument(_)));
    }

    #[test]
    fn test_nothing_resolves_before_resolve() {
        let engine = Engine::default();
        let raw = json!({
            "schemaVersion": "1.0.0",
            "modules": [{ "kind": "javascript-module", "path": "a.js",
                          "declarations": [{ "kind": "enum", "name": "E" }] }]
        });
        let root = ManifestRoot::from_raw(&raw, &engine).unwrap();
        assert_eq!(root.modules.len(), 1);
        let err = root.resolve(&engine).unwrap_err();
        assert_eq!(err, ManifestError::UnknownKind("enum".to_string()));
    }

    #[test]
    fn test_queries() {
        let manifest = resolve(&document()).unwrap();
        assert_eq!(manifest.readme.as_deref(), Some("README.md"));
        assert!(manifest.module("src/b.js").is_some());
        assert!(manifest.module("src/c.js").is_none());

        let names = manifest
            .find_custom_elements()
            .into_iter()
            .filter_map(Node::name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["First", "Other", "Second"]);

        let found = manifest.find_by_tag_names(&["x-dup", "x-missing"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found["x-dup"].name(), Some("Second"));

        let all = manifest.find_all_tag_names();
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["x-dup", "x-other"]);
        assert!(manifest.find_by_tag_names::<&str>(&[]).is_empty());
    }
}

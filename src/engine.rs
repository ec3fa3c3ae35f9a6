//! The parser engine.
//!
//! An [`Engine`] owns one [`NodeRegistry`], one [`ValueTypeTable`] and one [`ParserConfig`].
//! Everything it builds is constructed through those tables, so overriding a kind or a role on
//! one engine never affects another. Tables should be set up before parsing; the engine borrows
//! them immutably for the whole resolution.
//!
//! ```rust
//! use cem_parser::engine::Engine;
//! use serde_json::json;
//!
//! let mut engine = Engine::new();
//! engine
//!     .parse(&json!({
//!         "schemaVersion": "1.0.0",
//!         "modules": [{
//!             "kind": "javascript-module",
//!             "path": "src/my-element.js",
//!             "declarations": [{
//!                 "kind": "class",
//!                 "name": "MyElement",
//!                 "customElement": true,
//!                 "tagName": "my-element"
//!             }]
//!         }]
//!     }))
//!     .unwrap();
//! assert!(engine.find_by_tag_names(&["my-element"]).contains_key("my-element"));
//! ```

use crate::{
    config::ParserConfig,
    error::ManifestError,
    manifest::{Manifest, ManifestRoot, Resolve},
    nodes::{JavaScriptModule, Node, NodeKind},
    registry::{NodeRegistry, Slot},
    roles::{Role, ValueType, ValueTypeTable},
    schema::{as_object, check_kind, RawMap},
};
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};

#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: ParserConfig,
    registry: NodeRegistry,
    values: ValueTypeTable,
    manifest: Option<Manifest>,
}

impl Engine {
    pub fn new() -> Self {
        Engine::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Engine {
            config,
            ..Default::default()
        }
    }

    /// Build an engine around caller-supplied tables, e.g. a registry with some kinds replaced.
    pub fn with_tables(
        config: ParserConfig,
        registry: NodeRegistry,
        values: ValueTypeTable,
    ) -> Self {
        Engine {
            config,
            registry,
            values,
            manifest: None,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut NodeRegistry {
        &mut self.registry
    }

    pub fn values(&self) -> &ValueTypeTable {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut ValueTypeTable {
        &mut self.values
    }

    /// Replace the constructor for one kind.
    pub fn register_kind<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&RawMap, &Engine) -> Result<Node, ManifestError> + Send + Sync + 'static,
    {
        self.registry.register(kind, factory);
    }

    /// Replace the constructor for one auxiliary value role.
    pub fn register_value<T, F>(&mut self, role: Role, factory: F) -> Result<(), ManifestError>
    where
        T: ValueType,
        F: Fn(&Value, &Engine) -> Result<T, ManifestError> + Send + Sync + 'static,
    {
        self.values.register(role, factory)
    }

    /// Build one nested node from the `slot` it was found in, dispatching on its raw `kind`.
    pub fn dispatch(&self, raw: &Value, slot: Slot) -> Result<Node, ManifestError> {
        let map = as_object(slot.as_str(), raw)?;
        let kind = match map.get("kind") {
            Some(Value::String(kind)) => kind.as_str(),
            Some(_) => return Err(ManifestError::schema(slot.as_str(), "kind", "a string")),
            None => {
                return Err(ManifestError::schema(
                    slot.as_str(),
                    "kind",
                    "a string (field is required)",
                ))
            }
        };
        self.construct(kind, map, slot)
    }

    /// Build every element of a node list, in order. The first failure aborts the list.
    pub fn dispatch_all(&self, items: &[Value], slot: Slot) -> Result<Vec<Node>, ManifestError> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                self.dispatch(item, slot).inspect_err(|err| {
                    tracing::debug!(
                        "[Engine::dispatch_all] {}[{}] failed: {}",
                        slot,
                        index,
                        err
                    )
                })
            })
            .collect()
    }

    /// Build a manifest module. Always goes through the `javascript-module` constructor.
    pub fn dispatch_module(&self, raw: &Value) -> Result<Arc<JavaScriptModule>, ManifestError> {
        let map = as_object(Slot::Modules.as_str(), raw)?;
        check_kind(map, JavaScriptModule::KIND)?;
        match self.construct(JavaScriptModule::KIND, map, Slot::Modules)? {
            Node::Module(module) => Ok(module),
            other => Err(ManifestError::mismatched(
                JavaScriptModule::KIND,
                other.kind(),
            )),
        }
    }

    fn construct(&self, kind: &str, raw: &RawMap, slot: Slot) -> Result<Node, ManifestError> {
        tracing::debug!("[Engine::dispatch] {} -> {}", slot, kind);
        let factory = self.registry.resolve(kind)?;
        if self.config.check_slots && !slot.accepts(kind) {
            return Err(ManifestError::mismatched(slot.describe(), kind));
        }
        let node = factory(raw, self)?;
        if node.kind() != kind {
            return Err(ManifestError::mismatched(kind, node.kind()));
        }
        Ok(node)
    }

    /// Validate the top level of a raw document without resolving anything below it.
    pub fn build_manifest(&self, raw: &Value) -> Result<ManifestRoot, ManifestError> {
        ManifestRoot::from_raw(raw, self)
    }

    /// Resolve an unresolved entity, usually a [`ManifestRoot`] or a caller's own root type.
    pub fn resolve<R: Resolve>(&self, entity: R) -> Result<R::Output, ManifestError> {
        entity.resolve(self)
    }

    /// Build and resolve `raw`, keeping the result for the query helpers.
    pub fn parse(&mut self, raw: &Value) -> Result<&Manifest, ManifestError> {
        let root = self.build_manifest(raw)?;
        let manifest = self.resolve(root)?;
        tracing::info!(
            "[Engine::parse] resolved {} modules",
            manifest.modules.len()
        );
        Ok(self.manifest.insert(manifest))
    }

    /// The manifest from the last successful [`Engine::parse`].
    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    pub fn take_manifest(&mut self) -> Option<Manifest> {
        self.manifest.take()
    }

    pub fn find_custom_elements(&self) -> Vec<&Node> {
        self.manifest
            .as_ref()
            .map(Manifest::find_custom_elements)
            .unwrap_or_default()
    }

    pub fn find_by_tag_names<S: AsRef<str>>(&self, names: &[S]) -> BTreeMap<String, &Node> {
        self.manifest
            .as_ref()
            .map(|manifest| manifest.find_by_tag_names(names))
            .unwrap_or_default()
    }

    pub fn find_all_tag_names(&self) -> BTreeMap<String, &Node> {
        self.manifest
            .as_ref()
            .map(Manifest::find_all_tag_names)
            .unwrap_or_default()
    }
}

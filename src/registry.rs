//! Registry of node constructors keyed by the `kind` discriminant.
//!
//! Each [`Engine`] owns its own [`NodeRegistry`], so two engines can override the same kind
//! differently. Overriding a kind replaces the constructor for every slot that kind can appear
//! in; the replacement must still produce a [`Node`] whose [`Node::kind`] matches the key it was
//! registered under, or dispatch fails with a kind mismatch.

use crate::{
    engine::Engine,
    error::ManifestError,
    nodes::{
        ClassDeclaration, ClassMethod, CustomElementExport, CustomElementField,
        FunctionDeclaration, JavaScriptExport, JavaScriptModule, MixinDeclaration, Node, NodeKind,
        VariableDeclaration,
    },
    schema::RawMap,
};
use std::{
    collections::HashMap,
    fmt::{Debug, Display, Formatter},
    sync::Arc,
};

pub type NodeFactory =
    Arc<dyn Fn(&RawMap, &Engine) -> Result<Node, ManifestError> + Send + Sync + 'static>;

/// The stock constructors, one per kind.
pub mod factories {
    use super::*;
    use crate::nodes::ClassField;

    pub fn module(raw: &RawMap, engine: &Engine) -> Result<Node, ManifestError> {
        JavaScriptModule::from_raw(raw, engine).map(Node::Module)
    }

    pub fn class(raw: &RawMap, engine: &Engine) -> Result<Node, ManifestError> {
        ClassDeclaration::from_raw(raw, engine).map(Node::Class)
    }

    pub fn mixin(raw: &RawMap, engine: &Engine) -> Result<Node, ManifestError> {
        MixinDeclaration::from_raw(raw, engine).map(Node::Mixin)
    }

    pub fn function(raw: &RawMap, engine: &Engine) -> Result<Node, ManifestError> {
        FunctionDeclaration::from_raw(raw, engine).map(Node::Function)
    }

    pub fn variable(raw: &RawMap, engine: &Engine) -> Result<Node, ManifestError> {
        VariableDeclaration::from_raw(raw, engine).map(Node::Variable)
    }

    /// A plain class field. Register under `field` to reject `attribute`/`reflects`.
    pub fn class_field(raw: &RawMap, engine: &Engine) -> Result<Node, ManifestError> {
        ClassField::from_raw(raw, engine).map(Node::Field)
    }

    pub fn custom_element_field(raw: &RawMap, engine: &Engine) -> Result<Node, ManifestError> {
        CustomElementField::from_raw(raw, engine).map(Node::CustomElementField)
    }

    pub fn method(raw: &RawMap, engine: &Engine) -> Result<Node, ManifestError> {
        ClassMethod::from_raw(raw, engine).map(Node::Method)
    }

    pub fn js_export(raw: &RawMap, engine: &Engine) -> Result<Node, ManifestError> {
        JavaScriptExport::from_raw(raw, engine).map(Node::JsExport)
    }

    pub fn custom_element_export(raw: &RawMap, engine: &Engine) -> Result<Node, ManifestError> {
        CustomElementExport::from_raw(raw, engine).map(Node::CustomElementExport)
    }
}

/// The array field a nested node is dispatched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The manifest's `modules`.
    Modules,
    /// A module's `declarations`.
    Declarations,
    /// A module's `exports`.
    Exports,
    /// A class or mixin's `members`.
    Members,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Modules => "modules",
            Slot::Declarations => "declarations",
            Slot::Exports => "exports",
            Slot::Members => "members",
        }
    }

    /// The kinds this slot may hold.
    pub fn kinds(&self) -> &'static [&'static str] {
        match self {
            Slot::Modules => &["javascript-module"],
            Slot::Declarations => &["class", "mixin", "function", "variable"],
            Slot::Exports => &["js", "custom-element-definition"],
            Slot::Members => &["field", "method"],
        }
    }

    pub fn accepts(&self, kind: &str) -> bool {
        self.kinds().contains(&kind)
    }

    /// The `expected` text of a kind mismatch raised for this slot.
    pub fn describe(&self) -> String {
        format!("{} entry ({})", self.as_str(), self.kinds().join(" | "))
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind to constructor mapping, owned by one [`Engine`].
#[derive(Clone)]
pub struct NodeRegistry(HashMap<String, NodeFactory>);

impl Debug for NodeRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NodeRegistry").field(&self.kinds()).finish()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        NodeRegistry::create()
    }
}

impl NodeRegistry {
    /// Create a registry with the stock constructor for every kind.
    pub fn create() -> Self {
        let mut registry = NodeRegistry(HashMap::new());
        registry.register(JavaScriptModule::KIND, factories::module);
        registry.register(ClassDeclaration::KIND, factories::class);
        registry.register(MixinDeclaration::KIND, factories::mixin);
        registry.register(FunctionDeclaration::KIND, factories::function);
        registry.register(VariableDeclaration::KIND, factories::variable);
        registry.register(CustomElementField::KIND, factories::custom_element_field);
        registry.register(ClassMethod::KIND, factories::method);
        registry.register(JavaScriptExport::KIND, factories::js_export);
        registry.register(CustomElementExport::KIND, factories::custom_element_export);
        registry
    }

    /// An empty registry; every dispatch fails until kinds are registered.
    pub fn empty() -> Self {
        NodeRegistry(HashMap::new())
    }

    /// Register a node constructor
    ///
    /// If a constructor for this kind already exists, it will be overwritten and a log message
    /// emitted.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&RawMap, &Engine) -> Result<Node, ManifestError> + Send + Sync + 'static,
    {
        let kind = kind.into();
        if self.0.contains_key(&kind) {
            tracing::info!(
                "[NodeRegistry::register] Overwriting existing constructor for kind: {}",
                kind
            );
        }
        self.0.insert(kind, Arc::new(factory));
    }

    /// The constructor registered for `kind`.
    pub fn resolve(&self, kind: &str) -> Result<NodeFactory, ManifestError> {
        self.0
            .get(kind)
            .cloned()
            .ok_or_else(|| ManifestError::UnknownKind(kind.to_string()))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.0.contains_key(kind)
    }

    /// All registered kinds, sorted.
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds = self.0.keys().cloned().collect::<Vec<_>>();
        kinds.sort();
        kinds
    }
}

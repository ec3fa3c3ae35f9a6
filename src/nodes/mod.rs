//! The `kind`-discriminated entities of a manifest.
//!
//! Each concrete kind lives in its own module and is built by a constructor that first checks the
//! raw `kind` against [`NodeKind::KIND`], then validates its attribute contract, then resolves its
//! auxiliary-value fields and nested nodes. [`Node`] is the closed set of kinds the
//! [`NodeRegistry`](crate::registry::NodeRegistry) can hand back.

use crate::traits::{ClassLike, CustomElementLike, Declarable, FunctionLike, ParentModule, PropertyLike};
use std::sync::Arc;

pub mod class;
pub mod export;
pub mod field;
pub mod function;
pub mod method;
pub mod module;
pub mod variable;

pub use class::{ClassDeclaration, MixinDeclaration};
pub use export::{CustomElementExport, JavaScriptExport};
pub use field::{ClassField, CustomElementField};
pub use function::FunctionDeclaration;
pub use method::ClassMethod;
pub use module::JavaScriptModule;
pub use variable::VariableDeclaration;

/// The discriminant constant of a node type.
pub trait NodeKind {
    const KIND: &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Module(Arc<JavaScriptModule>),
    Class(ClassDeclaration),
    Mixin(MixinDeclaration),
    Function(FunctionDeclaration),
    Variable(VariableDeclaration),
    Field(ClassField),
    CustomElementField(CustomElementField),
    Method(ClassMethod),
    JsExport(JavaScriptExport),
    CustomElementExport(CustomElementExport),
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Module(_) => JavaScriptModule::KIND,
            Node::Class(_) => ClassDeclaration::KIND,
            Node::Mixin(_) => MixinDeclaration::KIND,
            Node::Function(_) => FunctionDeclaration::KIND,
            Node::Variable(_) => VariableDeclaration::KIND,
            Node::Field(_) => ClassField::KIND,
            Node::CustomElementField(_) => CustomElementField::KIND,
            Node::Method(_) => ClassMethod::KIND,
            Node::JsExport(_) => JavaScriptExport::KIND,
            Node::CustomElementExport(_) => CustomElementExport::KIND,
        }
    }

    /// The declared name. Modules have none; functions and methods may omit theirs.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Module(_) => None,
            Node::Class(class) => Some(&class.class_like.name),
            Node::Mixin(mixin) => Some(&mixin.class_like.name),
            Node::Function(function) => function.function_like.name.as_deref(),
            Node::Variable(variable) => Some(&variable.property.name),
            Node::Field(field) => Some(&field.property.name),
            Node::CustomElementField(field) => Some(&field.field.property.name),
            Node::Method(method) => method.function_like.name.as_deref(),
            Node::JsExport(export) => Some(&export.name),
            Node::CustomElementExport(export) => Some(&export.name),
        }
    }

    /// The back-reference slot, for every kind except modules.
    pub fn parent(&self) -> Option<&ParentModule> {
        match self {
            Node::Module(_) => None,
            Node::Class(node) => Some(node.parent()),
            Node::Mixin(node) => Some(node.parent()),
            Node::Function(node) => Some(node.parent()),
            Node::Variable(node) => Some(node.parent()),
            Node::Field(node) => Some(node.parent()),
            Node::CustomElementField(node) => Some(node.parent()),
            Node::Method(node) => Some(node.parent()),
            Node::JsExport(node) => Some(node.parent()),
            Node::CustomElementExport(node) => Some(node.parent()),
        }
    }

    pub fn parent_module(&self) -> Option<Arc<JavaScriptModule>> {
        self.parent().and_then(ParentModule::get)
    }

    pub fn class_like(&self) -> Option<&ClassLike> {
        match self {
            Node::Class(class) => Some(&class.class_like),
            Node::Mixin(mixin) => Some(&mixin.class_like),
            _ => None,
        }
    }

    pub fn function_like(&self) -> Option<&FunctionLike> {
        match self {
            Node::Mixin(mixin) => Some(&mixin.function_like),
            Node::Function(function) => Some(&function.function_like),
            Node::Method(method) => Some(&method.function_like),
            _ => None,
        }
    }

    pub fn property_like(&self) -> Option<&PropertyLike> {
        match self {
            Node::Variable(variable) => Some(&variable.property),
            Node::Field(field) => Some(&field.property),
            Node::CustomElementField(field) => Some(&field.field.property),
            _ => None,
        }
    }

    /// The custom-element bundle of a class or mixin declared with `customElement: true`.
    pub fn custom_element(&self) -> Option<&CustomElementLike> {
        match self {
            Node::Class(class) => class.custom_element.as_ref(),
            Node::Mixin(mixin) => mixin.custom_element.as_ref(),
            _ => None,
        }
    }

    pub fn is_custom_element(&self) -> bool {
        self.custom_element().is_some()
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.custom_element()
            .and_then(|element| element.tag_name.as_deref())
    }

    pub fn as_module(&self) -> Option<&Arc<JavaScriptModule>> {
        match self {
            Node::Module(module) => Some(module),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassDeclaration> {
        match self {
            Node::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_mixin(&self) -> Option<&MixinDeclaration> {
        match self {
            Node::Mixin(mixin) => Some(mixin),
            _ => None,
        }
    }

    /// Record `module` as this node's owner. With `members` set, class and mixin members
    /// receive the same module.
    pub(crate) fn attach_module(&self, module: &Arc<JavaScriptModule>, members: bool) {
        if let Some(parent) = self.parent() {
            if !parent.attach(module) {
                tracing::debug!(
                    "[Node::attach_module] {} already attached, keeping the first module",
                    self.kind()
                );
            }
        }
        if members {
            if let Some(class_like) = self.class_like() {
                class_like.attach_members(module);
            }
        }
    }
}

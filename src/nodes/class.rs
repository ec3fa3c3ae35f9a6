use crate::{
    engine::Engine,
    error::ManifestError,
    nodes::NodeKind,
    schema::{check_kind, Field, RawMap, Schema, Shape},
    traits::{
        ClassLike, CustomElementLike, Declarable, FunctionLike, ParentModule, CLASS_LIKE,
        CUSTOM_ELEMENT_LIKE, FUNCTION_LIKE,
    },
};
use once_cell::sync::Lazy;

static CLASS: Lazy<Schema> = Lazy::new(|| {
    Schema::new(ClassDeclaration::KIND)
        .with(&[Field::required(
            "kind",
            Shape::Literal(ClassDeclaration::KIND),
        )])
        .with(CLASS_LIKE)
        .with(CUSTOM_ELEMENT_LIKE)
});

static MIXIN: Lazy<Schema> = Lazy::new(|| {
    Schema::new(MixinDeclaration::KIND)
        .with(&[Field::required(
            "kind",
            Shape::Literal(MixinDeclaration::KIND),
        )])
        .with(CLASS_LIKE)
        .with(CUSTOM_ELEMENT_LIKE)
        .with(FUNCTION_LIKE)
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDeclaration {
    parent: ParentModule,
    pub class_like: ClassLike,
    /// Always present unless the engine accepts plain classes.
    pub custom_element: Option<CustomElementLike>,
}

impl NodeKind for ClassDeclaration {
    const KIND: &'static str = "class";
}

impl Declarable for ClassDeclaration {
    fn parent(&self) -> &ParentModule {
        &self.parent
    }
}

impl ClassDeclaration {
    pub fn from_raw(raw: &RawMap, engine: &Engine) -> Result<Self, ManifestError> {
        check_kind(raw, Self::KIND)?;
        let attrs = CLASS.validate(raw, engine.config().strict)?;
        let mut class_like = ClassLike::from_attrs(&attrs, engine)?;
        let custom_element = CustomElementLike::from_attrs(&attrs, engine)?;
        class_like.resolve_members(&attrs, engine)?;
        Ok(ClassDeclaration {
            parent: ParentModule::unset(),
            class_like,
            custom_element,
        })
    }

    pub fn name(&self) -> &str {
        &self.class_like.name
    }
}

/// A mixin: a function that applies a class to a superclass.
///
/// Carries both the class interface it contributes and the function signature used to apply it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixinDeclaration {
    parent: ParentModule,
    pub class_like: ClassLike,
    pub function_like: FunctionLike,
    pub custom_element: Option<CustomElementLike>,
}

impl NodeKind for MixinDeclaration {
    const KIND: &'static str = "mixin";
}

impl Declarable for MixinDeclaration {
    fn parent(&self) -> &ParentModule {
        &self.parent
    }
}

impl MixinDeclaration {
    pub fn from_raw(raw: &RawMap, engine: &Engine) -> Result<Self, ManifestError> {
        check_kind(raw, Self::KIND)?;
        let attrs = MIXIN.validate(raw, engine.config().strict)?;
        let mut class_like = ClassLike::from_attrs(&attrs, engine)?;
        let custom_element = CustomElementLike::from_attrs(&attrs, engine)?;
        let function_like = FunctionLike::from_attrs(&attrs, engine)?;
        class_like.resolve_members(&attrs, engine)?;
        Ok(MixinDeclaration {
            parent: ParentModule::unset(),
            class_like,
            function_like,
            custom_element,
        })
    }

    pub fn name(&self) -> &str {
        &self.class_like.name
    }
}

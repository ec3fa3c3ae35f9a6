use crate::{
    engine::Engine,
    error::ManifestError,
    nodes::{field::MEMBER, NodeKind},
    roles::Role,
    schema::{check_kind, Field, RawMap, Schema, Shape},
    traits::{Declarable, FunctionLike, ParentModule, FUNCTION_LIKE},
    values::{Privacy, Reference, SourceReference},
};
use once_cell::sync::Lazy;

static SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(ClassMethod::KIND)
        .with(&[Field::required("kind", Shape::Literal(ClassMethod::KIND))])
        .with(MEMBER)
        .with(FUNCTION_LIKE)
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMethod {
    parent: ParentModule,
    pub function_like: FunctionLike,
    pub is_static: Option<bool>,
    pub privacy: Option<Privacy>,
    pub inherited_from: Option<Reference>,
    pub source: Option<SourceReference>,
}

impl NodeKind for ClassMethod {
    const KIND: &'static str = "method";
}

impl Declarable for ClassMethod {
    fn parent(&self) -> &ParentModule {
        &self.parent
    }
}

impl ClassMethod {
    pub fn from_raw(raw: &RawMap, engine: &Engine) -> Result<Self, ManifestError> {
        check_kind(raw, Self::KIND)?;
        let attrs = SCHEMA.validate(raw, engine.config().strict)?;
        let values = engine.values();
        let inherited_from =
            values.construct_optional(Role::InheritedFrom, attrs.raw("inheritedFrom"), engine)?;
        let source = values.construct_optional(Role::Source, attrs.raw("source"), engine)?;
        Ok(ClassMethod {
            parent: ParentModule::unset(),
            function_like: FunctionLike::from_attrs(&attrs, engine)?,
            is_static: attrs.bool("static"),
            privacy: attrs.privacy(),
            inherited_from,
            source,
        })
    }
}

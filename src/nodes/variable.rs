use crate::{
    engine::Engine,
    error::ManifestError,
    nodes::NodeKind,
    roles::Role,
    schema::{check_kind, Field, RawMap, Schema, Shape},
    traits::{Declarable, ParentModule, PropertyLike, PROPERTY_LIKE},
    values::SourceReference,
};
use once_cell::sync::Lazy;

static SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(VariableDeclaration::KIND)
        .with(&[
            Field::required("kind", Shape::Literal(VariableDeclaration::KIND)),
            Field::optional("source", Shape::Object),
        ])
        .with(PROPERTY_LIKE)
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDeclaration {
    parent: ParentModule,
    pub property: PropertyLike,
    pub source: Option<SourceReference>,
}

impl NodeKind for VariableDeclaration {
    const KIND: &'static str = "variable";
}

impl Declarable for VariableDeclaration {
    fn parent(&self) -> &ParentModule {
        &self.parent
    }
}

impl VariableDeclaration {
    pub fn from_raw(raw: &RawMap, engine: &Engine) -> Result<Self, ManifestError> {
        check_kind(raw, Self::KIND)?;
        let attrs = SCHEMA.validate(raw, engine.config().strict)?;
        let source = engine
            .values()
            .construct_optional(Role::Source, attrs.raw("source"), engine)?;
        Ok(VariableDeclaration {
            parent: ParentModule::unset(),
            property: PropertyLike::from_attrs(&attrs, engine)?,
            source,
        })
    }
}

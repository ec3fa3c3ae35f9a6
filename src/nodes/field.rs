use crate::{
    engine::Engine,
    error::ManifestError,
    nodes::NodeKind,
    roles::Role,
    schema::{check_kind, Attrs, Field, RawMap, Schema, Shape},
    traits::{Declarable, ParentModule, PropertyLike, PROPERTY_LIKE},
    values::{Privacy, Reference, SourceReference},
};
use once_cell::sync::Lazy;

/// Member fields shared by class fields and methods.
pub(crate) const MEMBER: &[Field] = &[
    Field::optional("static", Shape::Bool),
    Field::optional("privacy", Shape::OneOf(Privacy::NAMES)),
    Field::optional("inheritedFrom", Shape::Object),
    Field::optional("source", Shape::Object),
];

const CUSTOM_ELEMENT_MEMBER: &[Field] = &[
    Field::optional("attribute", Shape::String),
    Field::optional("reflects", Shape::Bool),
];

static CLASS_FIELD: Lazy<Schema> = Lazy::new(|| {
    Schema::new(ClassField::KIND)
        .with(&[Field::required("kind", Shape::Literal(ClassField::KIND))])
        .with(MEMBER)
        .with(PROPERTY_LIKE)
});

static CUSTOM_ELEMENT_FIELD: Lazy<Schema> = Lazy::new(|| {
    Schema::new(CustomElementField::KIND)
        .with(&[Field::required(
            "kind",
            Shape::Literal(CustomElementField::KIND),
        )])
        .with(MEMBER)
        .with(PROPERTY_LIKE)
        .with(CUSTOM_ELEMENT_MEMBER)
});

/// A class field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassField {
    parent: ParentModule,
    pub property: PropertyLike,
    pub is_static: Option<bool>,
    pub privacy: Option<Privacy>,
    /// The class this member was inherited from, when not declared here.
    pub inherited_from: Option<Reference>,
    pub source: Option<SourceReference>,
}

impl NodeKind for ClassField {
    const KIND: &'static str = "field";
}

impl Declarable for ClassField {
    fn parent(&self) -> &ParentModule {
        &self.parent
    }
}

impl ClassField {
    pub fn from_raw(raw: &RawMap, engine: &Engine) -> Result<Self, ManifestError> {
        check_kind(raw, Self::KIND)?;
        let attrs = CLASS_FIELD.validate(raw, engine.config().strict)?;
        Self::from_attrs(&attrs, engine)
    }

    fn from_attrs(attrs: &Attrs<'_>, engine: &Engine) -> Result<Self, ManifestError> {
        let values = engine.values();
        let inherited_from =
            values.construct_optional(Role::InheritedFrom, attrs.raw("inheritedFrom"), engine)?;
        let source = values.construct_optional(Role::Source, attrs.raw("source"), engine)?;
        Ok(ClassField {
            parent: ParentModule::unset(),
            property: PropertyLike::from_attrs(attrs, engine)?,
            is_static: attrs.bool("static"),
            privacy: attrs.privacy(),
            inherited_from,
            source,
        })
    }

    pub fn name(&self) -> &str {
        &self.property.name
    }
}

/// A class field of a custom element, which may be backed by an HTML attribute.
///
/// This is the constructor registered for `field` by default; a plain [`ClassField`] reads the
/// same input minus `attribute` and `reflects`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomElementField {
    pub field: ClassField,
    /// The corresponding attribute name, if the field is settable from markup.
    pub attribute: Option<String>,
    /// Whether the property writes its value back to the attribute.
    pub reflects: Option<bool>,
}

impl NodeKind for CustomElementField {
    const KIND: &'static str = "field";
}

impl Declarable for CustomElementField {
    fn parent(&self) -> &ParentModule {
        &self.field.parent
    }
}

impl CustomElementField {
    pub fn from_raw(raw: &RawMap, engine: &Engine) -> Result<Self, ManifestError> {
        check_kind(raw, Self::KIND)?;
        let attrs = CUSTOM_ELEMENT_FIELD.validate(raw, engine.config().strict)?;
        Ok(CustomElementField {
            field: ClassField::from_attrs(&attrs, engine)?,
            attribute: attrs.string("attribute"),
            reflects: attrs.bool("reflects"),
        })
    }

    pub fn name(&self) -> &str {
        self.field.name()
    }
}

use crate::{
    engine::Engine,
    error::ManifestError,
    nodes::NodeKind,
    roles::Role,
    schema::{check_kind, Field, RawMap, Schema, Shape},
    traits::{Declarable, FunctionLike, ParentModule, FUNCTION_LIKE},
    values::SourceReference,
};
use once_cell::sync::Lazy;

static SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(FunctionDeclaration::KIND)
        .with(&[
            Field::required("kind", Shape::Literal(FunctionDeclaration::KIND)),
            Field::optional("source", Shape::Object),
        ])
        .with(FUNCTION_LIKE)
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeclaration {
    parent: ParentModule,
    pub function_like: FunctionLike,
    pub source: Option<SourceReference>,
}

impl NodeKind for FunctionDeclaration {
    const KIND: &'static str = "function";
}

impl Declarable for FunctionDeclaration {
    fn parent(&self) -> &ParentModule {
        &self.parent
    }
}

impl FunctionDeclaration {
    pub fn from_raw(raw: &RawMap, engine: &Engine) -> Result<Self, ManifestError> {
        check_kind(raw, Self::KIND)?;
        let attrs = SCHEMA.validate(raw, engine.config().strict)?;
        let source = engine
            .values()
            .construct_optional(Role::Source, attrs.raw("source"), engine)?;
        Ok(FunctionDeclaration {
            parent: ParentModule::unset(),
            function_like: FunctionLike::from_attrs(&attrs, engine)?,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_log::test;

    #[test]
    fn test_function_with_parameters() {
        let raw = json!({
            "kind": "function",
            "name": "highlight",
            "source": { "href": "https://example.com/src/highlight.js" },
            "parameters": [
                { "name": "code", "type": { "text": "string" } },
                { "name": "options", "optional": true },
                { "name": "rest", "rest": true }
            ]
        });
        let function =
            FunctionDeclaration::from_raw(raw.as_object().unwrap(), &Engine::default()).unwrap();

        let parameters = function.function_like.parameters.unwrap();
        assert_eq!(
            parameters.iter().map(|p| p.name()).collect::<Vec<_>>(),
            vec!["code", "options", "rest"]
        );
        assert!(!parameters[0].optional);
        assert!(parameters[1].optional);
        assert!(parameters[2].rest);
        assert_eq!(
            function.source.unwrap().href,
            "https://example.com/src/highlight.js"
        );
    }

    #[test]
    fn test_function_name_is_optional() {
        let raw = json!({ "kind": "function" });
        let function =
            FunctionDeclaration::from_raw(raw.as_object().unwrap(), &Engine::default()).unwrap();
        assert!(function.function_like.name.is_none());
    }
}

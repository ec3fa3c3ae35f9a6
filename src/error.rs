use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    #[error("Schema violation in '{entity}': field '{field}' expected {expected}")]
    SchemaViolation {
        entity: String,
        field: String,
        expected: String,
    },
    #[error("Unknown node kind '{0}': no constructor registered")]
    UnknownKind(String),
    #[error("Expected to find a '{expected}' but got '{found}'")]
    MismatchedKind { expected: String, found: String },
    #[error("Invalid manifest document: {0}")]
    InvalidDocument(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ManifestError {
    pub fn schema(
        entity: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        ManifestError::SchemaViolation {
            entity: entity.into(),
            field: field.into(),
            expected: expected.into(),
        }
    }

    pub fn mismatched(expected: impl Into<String>, found: impl Into<String>) -> Self {
        ManifestError::MismatchedKind {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn is_schema_violation(&self) -> bool {
        matches!(self, ManifestError::SchemaViolation { .. })
    }

    pub fn is_unknown_kind(&self) -> bool {
        matches!(self, ManifestError::UnknownKind(_))
    }

    pub fn is_mismatched_kind(&self) -> bool {
        matches!(self, ManifestError::MismatchedKind { .. })
    }

    /// The offending field name, for schema violations.
    pub fn field(&self) -> Option<&str> {
        match self {
            ManifestError::SchemaViolation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ManifestError {
    fn from(src: toml::de::Error) -> ManifestError {
        ManifestError::Config(format!("Toml deserialization error: {src}"))
    }
}

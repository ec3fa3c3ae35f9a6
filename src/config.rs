use crate::error::ManifestError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Engine-level switches for how strictly raw manifests are checked.
///
/// Can be built in code or read from TOML:
///
/// ```rust
/// use cem_parser::config::ParserConfig;
///
/// let config = ParserConfig::from_toml_str("strict = false").unwrap();
/// assert!(!config.strict);
/// assert!(config.check_slots);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Reject fields an entity's contract does not declare.
    pub strict: bool,
    /// Reject nested nodes whose kind does not belong in the slot holding them (e.g. a `js`
    /// export listed under a module's `declarations`).
    pub check_slots: bool,
    /// Give class and mixin members the enclosing module as their `parent_module`.
    pub attach_members: bool,
    /// Accept a `class` or `mixin` without `customElement: true` as a plain declaration instead
    /// of rejecting it.
    pub plain_classes: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            strict: true,
            check_slots: true,
            attach_members: true,
            plain_classes: false,
        }
    }
}

impl ParserConfig {
    pub fn lenient() -> Self {
        ParserConfig {
            strict: false,
            check_slots: false,
            ..Default::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ManifestError> {
        let config: ParserConfig = toml::from_str(content)?;
        tracing::debug!("[ParserConfig::from_toml_str] loaded {:?}", config);
        Ok(config)
    }
}

impl FromStr for ParserConfig {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParserConfig::from_toml_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_defaults_are_strict() {
        let config = ParserConfig::default();
        assert!(config.strict);
        assert!(config.check_slots);
        assert!(config.attach_members);
        assert!(!config.plain_classes);
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: ParserConfig = "".parse().unwrap();
        assert_eq!(config, ParserConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides_only_named_keys() {
        let config = ParserConfig::from_toml_str("check_slots = false\n").unwrap();
        assert!(config.strict);
        assert!(!config.check_slots);
        assert!(config.attach_members);
        assert!(!config.plain_classes);

        let config = ParserConfig::from_toml_str("plain_classes = true\n").unwrap();
        assert!(config.plain_classes);
    }

    #[test]
    fn test_unknown_toml_key_is_rejected() {
        let err = ParserConfig::from_toml_str("strictness = true").unwrap_err();
        assert!(matches!(err, ManifestError::Config(_)));
    }
}

//! Cart configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    keys::{DEFAULT_KEY_PREFIX, DEFAULT_SOURCES_KEY, compose_key},
    owners::CartOwner,
};

/// Errors raised while loading a [`CartConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML document could not be parsed.
    #[error(transparent)]
    Yaml(#[from] serde_norway::Error),

    /// A field holds a value that cannot be used.
    #[error("invalid cart config: {0} must not be empty")]
    Invalid(&'static str),
}

/// Storage naming used by a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartConfig {
    /// Prefix of every cart identifier
    pub key_prefix: String,

    /// Key of the index of persisted cart identifiers
    pub sources_key: String,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            sources_key: DEFAULT_SOURCES_KEY.to_string(),
        }
    }
}

impl CartConfig {
    /// Parses a config from YAML, defaulting missing fields.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Yaml`]: the document is not valid YAML for this shape.
    /// - [`ConfigError::Invalid`]: a key is empty.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: CartConfig = serde_norway::from_str(yaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Checks every key is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first empty field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("keyPrefix"));
        }

        if self.sources_key.trim().is_empty() {
            return Err(ConfigError::Invalid("sourcesKey"));
        }

        Ok(())
    }

    /// Identifier of the cart for `currency`, `culture` and `owner`.
    pub fn identifier(&self, currency: &str, culture: &str, owner: Option<&CartOwner>) -> String {
        let suffix = owner.map(CartOwner::key_suffix);

        compose_key(&self.key_prefix, currency, culture, suffix.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::keys::create_key;

    use super::*;

    #[test]
    fn default_identifier_matches_create_key() {
        let config = CartConfig::default();

        assert_eq!(config.identifier("USD", "en", None), create_key("USD", "en", None));
        assert_eq!(
            config.identifier("USD", "en", Some(&CartOwner::supplier(5))),
            create_key("USD", "en", Some("S5"))
        );
    }

    #[test]
    fn from_yaml_defaults_missing_fields() -> TestResult {
        let config = CartConfig::from_yaml("keyPrefix: SHOP\n")?;

        assert_eq!(config.key_prefix, "SHOP");
        assert_eq!(config.sources_key, DEFAULT_SOURCES_KEY);
        assert_eq!(config.identifier("USD", "en", None), "SHOP-en-KEY-USD");

        Ok(())
    }

    #[test]
    fn from_yaml_rejects_empty_prefix() {
        let result = CartConfig::from_yaml("keyPrefix: \"\"\n");

        assert!(matches!(result, Err(ConfigError::Invalid("keyPrefix"))));
    }

    #[test]
    fn from_yaml_rejects_malformed_document() {
        assert!(matches!(
            CartConfig::from_yaml("keyPrefix: [unclosed"),
            Err(ConfigError::Yaml(_))
        ));
    }
}

// Environment variable overrides

use crate::registry::ConfigLayer;
use crate::{ConfigError, Result};
use std::env;

/// Default prefix for registry environment variables.
pub const DEFAULT_PREFIX: &str = "SEXTANT_REGISTRY";

/// Reads `<PREFIX>_<FIELD>` variables into a [`ConfigLayer`].
pub struct EnvOverrides {
    prefix: String,
}

impl EnvOverrides {
    /// Create a new environment reader
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Read the process environment
    pub fn load(&self) -> Result<ConfigLayer> {
        self.load_from(env::vars())
    }

    /// Read from explicit key/value pairs
    pub fn load_from<I, K, V>(&self, vars: I) -> Result<ConfigLayer>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut layer = ConfigLayer::default();

        for (key, value) in vars {
            let Some(field) = self.field_name(key.as_ref()) else {
                continue;
            };
            layer.set(field, value.as_ref())?;
        }

        Ok(layer)
    }

    /// Load a single variable, e.g. `var("HOST")` reads `SEXTANT_REGISTRY_HOST`
    pub fn var(&self, field: &str) -> Result<String> {
        let full_key = format!("{}_{}", self.prefix, field.to_uppercase());
        env::var(&full_key).map_err(ConfigError::EnvError)
    }

    fn field_name<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.prefix.as_str())?.strip_prefix('_')
    }
}

impl Default for EnvOverrides {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

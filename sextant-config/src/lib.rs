//! Registry connection configuration for Sextant.
//!
//! A [`RegistryConfig`] starts from the local-agent defaults and is layered
//! with configuration files, an optional `.env` file, and environment
//! variables, in that order.
//!
//! ```rust,ignore
//! use sextant_config::{ConfigBuilder, FileFormat};
//!
//! let config = ConfigBuilder::new()
//!     .add_file("registry.toml", FileFormat::Toml)
//!     .load_env()
//!     .build()?;
//!
//! println!("querying {} at {}", config.service_key, config.base_url());
//! ```

pub mod env;
pub mod error;
pub mod loader;
pub mod registry;
pub mod validation;

pub use env::EnvOverrides;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use registry::{ConfigLayer, RegistryConfig};
pub use validation::{ConfigValidator, Validate};

use std::path::PathBuf;

/// Builder assembling a [`RegistryConfig`] from layered sources
pub struct ConfigBuilder {
    base: RegistryConfig,
    layers: Vec<ConfigLayer>,
    files: Vec<(PathBuf, FileFormat)>,
    load_env: bool,
    load_dotenv: bool,
    dotenv_path: Option<PathBuf>,
    env: EnvOverrides,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            base: RegistryConfig::default(),
            layers: Vec::new(),
            files: Vec::new(),
            load_env: false,
            load_dotenv: false,
            dotenv_path: None,
            env: EnvOverrides::default(),
        }
    }

    /// Start from an explicit configuration instead of the defaults
    pub fn with_base(mut self, base: RegistryConfig) -> Self {
        self.base = base;
        self
    }

    /// Set environment variable prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env = EnvOverrides::new(prefix);
        self
    }

    /// Add an in-memory layer, applied after the base and before files
    pub fn add_layer(mut self, layer: ConfigLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Add configuration file to load
    pub fn add_file(mut self, path: impl Into<PathBuf>, format: FileFormat) -> Self {
        self.files.push((path.into(), format));
        self
    }

    /// Enable loading from environment variables
    pub fn load_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Enable loading a `.env` file into the environment before reading it
    pub fn load_dotenv(mut self, path: Option<PathBuf>) -> Self {
        self.load_dotenv = true;
        self.load_env = true;
        self.dotenv_path = path;
        self
    }

    /// Apply every source and validate the result
    pub fn build(self) -> Result<RegistryConfig> {
        let mut config = self.base;

        for layer in self.layers {
            layer.apply_to(&mut config);
        }

        for (path, format) in &self.files {
            ConfigLoader::new(*format).load_file(path)?.apply_to(&mut config);
        }

        if self.load_dotenv {
            match &self.dotenv_path {
                Some(path) => {
                    dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
                }
                None => {
                    // A missing default .env is not an error
                    dotenvy::dotenv().ok();
                }
            }
        }

        if self.load_env {
            self.env.load()?.apply_to(&mut config);
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_service_key() {
        let result = ConfigBuilder::new().build();
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_layers_apply_in_order() {
        let mut first = ConfigLayer::default();
        first.set("host", "first.internal").unwrap();
        first.set("service_key", "orders").unwrap();

        let mut second = ConfigLayer::default();
        second.set("host", "second.internal").unwrap();

        let config = ConfigBuilder::new()
            .add_layer(first)
            .add_layer(second)
            .build()
            .unwrap();

        assert_eq!(config.host, "second.internal");
        assert_eq!(config.service_key, "orders");
        assert_eq!(config.port, registry::DEFAULT_PORT);
    }

    #[test]
    fn test_with_base() {
        let config = ConfigBuilder::new()
            .with_base(RegistryConfig::new("billing").with_port(9500))
            .build()
            .unwrap();

        assert_eq!(config.base_url(), "http://localhost:9500");
    }

    #[test]
    fn test_missing_file_fails() {
        let result = ConfigBuilder::new()
            .with_base(RegistryConfig::new("billing"))
            .add_file("/nonexistent/registry.toml", FileFormat::Toml)
            .build();

        assert!(result.is_err());
    }
}

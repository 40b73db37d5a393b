//! Registry connection settings and the partial layers they are built from.

use crate::validation::{ConfigValidator, Validate};
use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default registry scheme.
pub const DEFAULT_SCHEME: &str = "http";
/// Default registry host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default Consul HTTP API port.
pub const DEFAULT_PORT: u16 = 8500;

const SCHEMES: [&str; 2] = ["http", "https"];

/// Connection parameters for the service registry and the key to query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// `http` or `https`
    pub scheme: String,
    /// Registry agent host
    pub host: String,
    /// Registry agent port
    pub port: u16,
    /// Name of the service whose instances are looked up
    pub service_key: String,
    /// ACL token sent with every request
    pub token: Option<String>,
    /// Datacenter to query instead of the agent's own
    pub datacenter: Option<String>,
    /// Whole-request timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            service_key: String::new(),
            token: None,
            datacenter: None,
            timeout_ms: None,
        }
    }
}

impl RegistryConfig {
    /// Create a configuration for `service_key` against the default local agent.
    pub fn new(service_key: impl Into<String>) -> Self {
        Self {
            service_key: service_key.into(),
            ..Self::default()
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenter = Some(datacenter.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Base URL of the registry HTTP API, e.g. `http://localhost:8500`.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Request timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Validate for RegistryConfig {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(&self.service_key, "service_key")?;
        ConfigValidator::not_empty(&self.host, "host")?;
        ConfigValidator::one_of(&self.scheme.as_str(), &SCHEMES, "scheme")?;
        ConfigValidator::is_port(self.port, "port")?;
        if self.timeout_ms == Some(0) {
            return Err(ConfigError::ValidationError(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// A partial configuration read from one source.
///
/// Layers are applied in order on top of [`RegistryConfig::default`]; a field
/// left unset keeps whatever the previous layer put there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub service_key: Option<String>,
    pub token: Option<String>,
    pub datacenter: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl ConfigLayer {
    /// Set a field from its textual key, case-insensitively.
    ///
    /// Returns `Ok(false)` when the key is not a registry setting.
    pub fn set(&mut self, key: &str, value: &str) -> Result<bool> {
        match key.to_ascii_lowercase().as_str() {
            "scheme" => self.scheme = Some(value.to_string()),
            "host" => self.host = Some(value.to_string()),
            "port" => self.port = Some(parse_number(key, value)?),
            "service_key" => self.service_key = Some(value.to_string()),
            "token" => self.token = Some(value.to_string()),
            "datacenter" => self.datacenter = Some(value.to_string()),
            "timeout_ms" => self.timeout_ms = Some(parse_number(key, value)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Whether this layer sets nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite the fields of `config` that this layer sets.
    pub fn apply_to(self, config: &mut RegistryConfig) {
        if let Some(scheme) = self.scheme {
            config.scheme = scheme;
        }
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(service_key) = self.service_key {
            config.service_key = service_key;
        }
        if self.token.is_some() {
            config.token = self.token;
        }
        if self.datacenter.is_some() {
            config.datacenter = self.datacenter;
        }
        if self.timeout_ms.is_some() {
            config.timeout_ms = self.timeout_ms;
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ParseError(format!("{} is not a valid number: {}", key, value)))
}

//! Discovery errors

use sextant_config::ConfigError;
use thiserror::Error;

/// Service discovery errors
///
/// Only batch-level failures surface here. A malformed registry entry is
/// never an error: it is dropped from the result and reported through the
/// [`DiscoveryLogger`](crate::logging::DiscoveryLogger).
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Registry returned status {status}: {body}")]
    RegistryStatus { status: u16, body: String },

    #[error("Registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl DiscoveryError {
    /// Whether the error came from talking to the registry rather than from
    /// local setup or resolution.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DiscoveryError::Http(_)
                | DiscoveryError::RegistryStatus { .. }
                | DiscoveryError::RegistryUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        let status = DiscoveryError::RegistryStatus {
            status: 503,
            body: "no leader".to_string(),
        };
        assert!(status.is_transport());
        assert_eq!(status.to_string(), "Registry returned status 503: no leader");

        assert!(DiscoveryError::RegistryUnavailable("down".to_string()).is_transport());
        assert!(!DiscoveryError::ServiceNotFound("api".to_string()).is_transport());
        assert!(!DiscoveryError::InvalidConfiguration("bad".to_string()).is_transport());
    }
}

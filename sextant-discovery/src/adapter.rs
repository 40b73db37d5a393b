//! Registry entries to routable instances
//!
//! [`RegistryAdapter::get`] asks the registry for the passing instances of
//! one service and turns each entry into a [`NormalizedService`]:
//!
//! 1. The node address replaces a service address that is blank or a
//!    loopback name (`localhost`, `127.0.0.1`, any case).
//! 2. Entries with no usable address, a scheme in the raw service address,
//!    or a port outside `1..=65535` are dropped with one warning each.
//! 3. The first tag starting with `version-` supplies the version.
//!
//! Registry order is preserved. Only a failed query fails the call.

use crate::client::RegistryClient;
use crate::consul::{ConsulClient, ConsulClientFactory};
use crate::entry::ServiceEntry;
use crate::error::DiscoveryError;
use crate::logging::{DiscoveryLogger, LOG_TARGET, TracingLogger};
use crate::service::{NormalizedService, ServiceDiscoveryProvider, ServiceEndpoint};
use async_trait::async_trait;
use sextant_config::RegistryConfig;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Tag prefix carrying the instance version, e.g. `version-1.2`.
pub const VERSION_PREFIX: &str = "version-";

const LOOPBACK_ADDRESSES: [&str; 2] = ["localhost", "127.0.0.1"];
const URL_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Queries one service and normalizes what the registry returns
pub struct RegistryAdapter<C: RegistryClient = ConsulClient> {
    client: C,
    service_key: String,
    logger: Arc<dyn DiscoveryLogger>,
}

impl<C: RegistryClient> RegistryAdapter<C> {
    /// Create an adapter that logs rejected entries through `tracing`
    pub fn new(client: C, service_key: impl Into<String>) -> Self {
        Self {
            client,
            service_key: service_key.into(),
            logger: Arc::new(TracingLogger),
        }
    }

    /// Report rejected entries to `logger` instead
    pub fn with_logger(mut self, logger: impl DiscoveryLogger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch the passing instances and normalize them.
    ///
    /// Issues exactly one registry query. Its error is returned as-is; no
    /// partial result is produced.
    pub async fn get(&self) -> Result<Vec<NormalizedService>, DiscoveryError> {
        let entries = self
            .client
            .healthy_instances(&self.service_key, "", true)
            .await?;

        let total = entries.len();
        let services: Vec<NormalizedService> = entries
            .iter()
            .filter_map(|entry| match normalize(entry) {
                Ok(service) => Some(service),
                Err(rejected) => {
                    self.logger.warn(&rejected.to_string());
                    None
                }
            })
            .collect();

        debug!(
            target: LOG_TARGET,
            service = %self.service_key,
            accepted = services.len(),
            rejected = total - services.len(),
            "Normalized registry entries"
        );

        Ok(services)
    }
}

impl RegistryAdapter<ConsulClient> {
    /// Consul-backed adapter for `config.service_key`
    pub fn from_config(config: &RegistryConfig) -> Result<Self, DiscoveryError> {
        let client = ConsulClientFactory.create(config)?;
        Ok(Self::new(client, config.service_key.clone()))
    }
}

#[async_trait]
impl<C: RegistryClient> ServiceDiscoveryProvider for RegistryAdapter<C> {
    fn service_key(&self) -> &str {
        &self.service_key
    }

    async fn get(&self) -> Result<Vec<NormalizedService>, DiscoveryError> {
        RegistryAdapter::get(self).await
    }
}

/// Address the instance should be reached on.
///
/// The service address wins unless it is blank or names the loopback
/// interface, which is only meaningful on the node itself.
pub fn effective_address(entry: &ServiceEntry) -> &str {
    let address = entry.service.address.as_str();

    let is_loopback = LOOPBACK_ADDRESSES
        .iter()
        .any(|loopback| address.eq_ignore_ascii_case(loopback));

    if address.trim().is_empty() || is_loopback {
        &entry.node.address
    } else {
        address
    }
}

/// Whether the entry can be turned into a routable instance.
///
/// The scheme check looks at the raw service address, not the effective one.
pub fn is_valid(entry: &ServiceEntry) -> bool {
    routable_port(entry).is_some()
}

/// Version carried by the first `version-` tag, with that prefix removed.
pub fn version_from_tags(tags: Option<&[String]>) -> Option<String> {
    tags?
        .iter()
        .find_map(|tag| tag.strip_prefix(VERSION_PREFIX))
        .map(str::to_string)
}

/// Convert one registry entry, or explain why it cannot be used.
pub fn normalize(entry: &ServiceEntry) -> Result<NormalizedService, RejectedEntry> {
    let address = effective_address(entry);

    let Some(port) = routable_port(entry) else {
        return Err(RejectedEntry {
            address: address.to_string(),
            port: entry.service.port,
        });
    };

    Ok(NormalizedService::new(
        entry.service.service.clone(),
        ServiceEndpoint::new(address, port),
        entry.service.id.clone(),
        version_from_tags(entry.service.tags.as_deref()),
        entry.service.tags.clone().unwrap_or_default(),
    ))
}

fn routable_port(entry: &ServiceEntry) -> Option<u16> {
    let raw = entry.service.address.as_str();

    if effective_address(entry).is_empty() || URL_SCHEMES.iter().any(|s| raw.contains(s)) {
        return None;
    }

    u16::try_from(entry.service.port).ok().filter(|port| *port > 0)
}

/// A registry entry that was left out of the result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    pub address: String,
    pub port: i32,
}

impl fmt::Display for RejectedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unable to use service address: {} and port: {} as it is invalid. \
             Address must contain host only e.g. localhost and port must be between 1 and 65535",
            self.address, self.port
        )
    }
}

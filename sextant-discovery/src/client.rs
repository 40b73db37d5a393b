//! Registry client capability

use crate::entry::ServiceEntry;
use crate::error::DiscoveryError;
use async_trait::async_trait;
use std::sync::Arc;

/// Health query against a service registry.
///
/// Implementations own the transport, including any timeout. They return
/// the entries in the order the registry produced them.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// List instances of `service_key`.
    ///
    /// An empty `tag` means no tag filter. With `passing_only` set, only
    /// instances whose checks are all passing are returned.
    async fn healthy_instances(
        &self,
        service_key: &str,
        tag: &str,
        passing_only: bool,
    ) -> Result<Vec<ServiceEntry>, DiscoveryError>;
}

#[async_trait]
impl<C: RegistryClient + ?Sized> RegistryClient for Arc<C> {
    async fn healthy_instances(
        &self,
        service_key: &str,
        tag: &str,
        passing_only: bool,
    ) -> Result<Vec<ServiceEntry>, DiscoveryError> {
        (**self).healthy_instances(service_key, tag, passing_only).await
    }
}

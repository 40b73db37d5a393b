//! Normalized service instances and instance selection

use crate::error::DiscoveryError;
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Host and port a request can be routed to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub host: String,
    pub port: u16,
}

impl ServiceEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Full URL for the endpoint with the given scheme
    pub fn url(&self, scheme: &str) -> String {
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A healthy instance in the form the router consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedService {
    /// Service name
    pub name: String,

    /// Where to send requests
    pub endpoint: ServiceEndpoint,

    /// Instance ID as reported by the registry
    pub id: String,

    /// Derived from a `version-` tag
    pub version: Option<String>,

    /// Registry tags, verbatim
    pub tags: Vec<String>,
}

impl NormalizedService {
    pub fn new(
        name: impl Into<String>,
        endpoint: ServiceEndpoint,
        id: impl Into<String>,
        version: Option<String>,
        tags: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint,
            id: id.into(),
            version,
            tags,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Anything that can list the current healthy instances of one service
#[async_trait]
pub trait ServiceDiscoveryProvider: Send + Sync {
    /// Name of the service this provider looks up
    fn service_key(&self) -> &str;

    /// Fetch the current instances
    async fn get(&self) -> Result<Vec<NormalizedService>, DiscoveryError>;
}

/// Load balancing strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadBalancingStrategy {
    /// Round-robin selection
    RoundRobin,

    /// Random selection
    Random,

    /// Always pick first available
    First,
}

/// Picks one instance from a provider on every call
pub struct ServiceResolver<P: ServiceDiscoveryProvider> {
    provider: P,
    strategy: LoadBalancingStrategy,
    round_robin_index: AtomicUsize,
}

impl<P: ServiceDiscoveryProvider> ServiceResolver<P> {
    /// Create new service resolver
    pub fn new(provider: P, strategy: LoadBalancingStrategy) -> Self {
        Self {
            provider,
            strategy,
            round_robin_index: AtomicUsize::new(0),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Resolve an instance using the configured strategy
    pub async fn resolve(&self) -> Result<NormalizedService, DiscoveryError> {
        let instances = self.provider.get().await?;
        self.select(instances)
    }

    /// Resolve an instance whose version tag equals `version`
    pub async fn resolve_version(&self, version: &str) -> Result<NormalizedService, DiscoveryError> {
        let instances = self
            .provider
            .get()
            .await?
            .into_iter()
            .filter(|s| s.version.as_deref() == Some(version))
            .collect();
        self.select(instances)
    }

    fn select(
        &self,
        mut instances: Vec<NormalizedService>,
    ) -> Result<NormalizedService, DiscoveryError> {
        if instances.is_empty() {
            return Err(DiscoveryError::ServiceNotFound(
                self.provider.service_key().to_string(),
            ));
        }

        let index = match self.strategy {
            LoadBalancingStrategy::RoundRobin => {
                self.round_robin_index.fetch_add(1, Ordering::SeqCst) % instances.len()
            }
            LoadBalancingStrategy::Random => rand::rng().random_range(0..instances.len()),
            LoadBalancingStrategy::First => 0,
        };

        Ok(instances.swap_remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider(Vec<NormalizedService>);

    #[async_trait]
    impl ServiceDiscoveryProvider for FixedProvider {
        fn service_key(&self) -> &str {
            "api"
        }

        async fn get(&self) -> Result<Vec<NormalizedService>, DiscoveryError> {
            Ok(self.0.clone())
        }
    }

    fn instance(id: &str, port: u16, version: Option<&str>) -> NormalizedService {
        NormalizedService::new(
            "api",
            ServiceEndpoint::new("10.0.0.1", port),
            id,
            version.map(str::to_string),
            Vec::new(),
        )
    }

    #[test]
    fn test_endpoint_formatting() {
        let endpoint = ServiceEndpoint::new("10.0.0.5", 8080);
        assert_eq!(endpoint.to_string(), "10.0.0.5:8080");
        assert_eq!(endpoint.url("http"), "http://10.0.0.5:8080");
    }

    #[test]
    fn test_has_tag() {
        let mut service = instance("a", 1, None);
        service.tags = vec!["primary".to_string()];
        assert!(service.has_tag("primary"));
        assert!(!service.has_tag("secondary"));
    }

    #[tokio::test]
    async fn test_round_robin() {
        let provider = FixedProvider(vec![instance("a", 1, None), instance("b", 2, None)]);
        let resolver = ServiceResolver::new(provider, LoadBalancingStrategy::RoundRobin);

        assert_eq!(resolver.resolve().await.unwrap().id, "a");
        assert_eq!(resolver.resolve().await.unwrap().id, "b");
        assert_eq!(resolver.resolve().await.unwrap().id, "a");
    }

    #[tokio::test]
    async fn test_first_and_random() {
        let instances = vec![instance("a", 1, None), instance("b", 2, None)];

        let first = ServiceResolver::new(FixedProvider(instances.clone()), LoadBalancingStrategy::First);
        assert_eq!(first.resolve().await.unwrap().id, "a");
        assert_eq!(first.resolve().await.unwrap().id, "a");

        let random = ServiceResolver::new(FixedProvider(instances), LoadBalancingStrategy::Random);
        let picked = random.resolve().await.unwrap();
        assert!(picked.id == "a" || picked.id == "b");
    }

    #[tokio::test]
    async fn test_resolve_version() {
        let provider = FixedProvider(vec![
            instance("old", 1, Some("1.0")),
            instance("new", 2, Some("2.0")),
        ]);
        let resolver = ServiceResolver::new(provider, LoadBalancingStrategy::First);

        assert_eq!(resolver.resolve_version("2.0").await.unwrap().id, "new");
        assert!(matches!(
            resolver.resolve_version("3.0").await,
            Err(DiscoveryError::ServiceNotFound(name)) if name == "api"
        ));
    }

    #[tokio::test]
    async fn test_empty_provider() {
        let resolver = ServiceResolver::new(FixedProvider(Vec::new()), LoadBalancingStrategy::RoundRobin);
        assert!(resolver.resolve().await.is_err());
    }
}

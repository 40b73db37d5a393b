// Sextant - Consul service discovery for request routers
//
// This library resolves the healthy instances of a service into routable
// endpoints, dropping registry entries that cannot be routed to.

// Re-export discovery
pub use sextant_discovery::*;

// Re-export member crates
pub use sextant_config;
pub use sextant_discovery;

pub use sextant_config::{ConfigBuilder, RegistryConfig};

// Re-export commonly used external crates
pub use async_trait::async_trait;
pub use tokio;

/// Commonly used items
pub mod prelude {
    pub use sextant_config::{ConfigBuilder, FileFormat, RegistryConfig, Validate};
    pub use sextant_discovery::{
        CapturingLogger, ConsulClient, DiscoveryError, DiscoveryLogger, InMemoryRegistry,
        LoadBalancingStrategy, NormalizedService, RegistryAdapter, RegistryClient, ServiceDiscoveryProvider,
        ServiceEndpoint, ServiceEntry, ServiceResolver, TracingLogger,
    };
}

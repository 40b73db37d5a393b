//! Service Discovery for Sextant
//!
//! This crate turns registry health lookups into routable instances.
//!
//! ## Features
//!
//! - **Normalization** - Registry entries become [`NormalizedService`]s with a
//!   resolved host, port, version and tags
//! - **Validation** - Malformed entries are dropped and reported, never fatal
//! - **Consul Client** - `/v1/health/service` over HTTP
//! - **In-Memory Registry** - Fixed entries for tests and development
//! - **Load Balancing** - Round-robin, random, or first-instance selection
//!
//! ## Quick Start
//!
//! ### Consul
//!
//! ```rust,ignore
//! use sextant_discovery::*;
//! use sextant_config::RegistryConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     logging::init();
//!
//!     let config = RegistryConfig::new("orders").with_host("consul.internal");
//!     let adapter = RegistryAdapter::from_config(&config)?;
//!
//!     for service in adapter.get().await? {
//!         println!("{} {} {:?}", service.id, service.endpoint, service.version);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ### In-Memory Registry (Testing)
//!
//! ```rust,ignore
//! use sextant_discovery::*;
//!
//! let registry = InMemoryRegistry::new();
//! registry
//!     .insert("orders", ServiceEntry::new("orders", "orders-1").with_node_address("10.0.0.5").with_port(8080))
//!     .await;
//!
//! let logger = CapturingLogger::new();
//! let adapter = RegistryAdapter::new(registry, "orders").with_logger(logger.clone());
//! let services = adapter.get().await?;
//! ```
//!
//! ### Service Resolver with Load Balancing
//!
//! ```rust,ignore
//! use sextant_discovery::*;
//!
//! let resolver = ServiceResolver::new(adapter, LoadBalancingStrategy::RoundRobin);
//! let instance = resolver.resolve().await?;
//! ```

pub mod adapter;
pub mod client;
pub mod consul;
pub mod entry;
pub mod error;
pub mod logging;
pub mod memory;
pub mod service;

pub use adapter::{
    RegistryAdapter, RejectedEntry, VERSION_PREFIX, effective_address, is_valid, normalize,
    version_from_tags,
};
pub use client::RegistryClient;
pub use consul::{ConsulClient, ConsulClientFactory};
pub use entry::{AgentService, Node, ServiceEntry};
pub use error::DiscoveryError;
pub use logging::{CapturingLogger, DiscoveryLogger, TracingLogger};
pub use memory::InMemoryRegistry;
pub use service::{
    LoadBalancingStrategy, NormalizedService, ServiceDiscoveryProvider, ServiceEndpoint,
    ServiceResolver,
};

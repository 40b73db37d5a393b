//! In-memory registry (for testing)

use crate::client::RegistryClient;
use crate::entry::ServiceEntry;
use crate::error::DiscoveryError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    entries: HashMap<String, Vec<ServiceEntry>>,
    unavailable: Option<String>,
    queries: usize,
}

/// Registry stand-in that serves fixed entries, malformed ones included.
///
/// Every entry it holds counts as passing; `passing_only` is accepted and
/// ignored.
#[derive(Clone, Default)]
pub struct InMemoryRegistry {
    state: Arc<RwLock<State>>,
}

impl InMemoryRegistry {
    /// Create new in-memory registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry under `service_key`
    pub async fn insert(&self, service_key: impl Into<String>, entry: ServiceEntry) {
        self.state
            .write()
            .await
            .entries
            .entry(service_key.into())
            .or_default()
            .push(entry);
    }

    /// Make every query fail with `reason`, or succeed again with `None`
    pub async fn set_unavailable(&self, reason: Option<String>) {
        self.state.write().await.unavailable = reason;
    }

    /// Clear all entries
    pub async fn clear(&self) {
        self.state.write().await.entries.clear();
    }

    /// Get count of entries across all services
    pub async fn count(&self) -> usize {
        self.state.read().await.entries.values().map(Vec::len).sum()
    }

    /// Number of queries served or refused so far
    pub async fn query_count(&self) -> usize {
        self.state.read().await.queries
    }
}

#[async_trait]
impl RegistryClient for InMemoryRegistry {
    async fn healthy_instances(
        &self,
        service_key: &str,
        tag: &str,
        _passing_only: bool,
    ) -> Result<Vec<ServiceEntry>, DiscoveryError> {
        let mut state = self.state.write().await;
        state.queries += 1;

        if let Some(reason) = &state.unavailable {
            return Err(DiscoveryError::RegistryUnavailable(reason.clone()));
        }

        let entries = state
            .entries
            .get(service_key)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| {
                        tag.is_empty()
                            || e.service
                                .tags
                                .as_ref()
                                .is_some_and(|tags| tags.iter().any(|t| t == tag))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(entries)
    }
}

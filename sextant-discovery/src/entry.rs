//! Raw health entries as returned by the registry

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One record from `/v1/health/service/{name}`.
///
/// Only the fields the adapter reads are modelled; anything else in the
/// payload (checks, datacenter, raft indexes) is ignored on decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    #[serde(rename = "Node", default)]
    pub node: Node,

    #[serde(rename = "Service", default)]
    pub service: AgentService,
}

/// The node an instance runs on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "Node", default)]
    pub name: String,

    #[serde(rename = "Address", default)]
    pub address: String,
}

/// The registered service instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentService {
    #[serde(rename = "ID", default)]
    pub id: String,

    #[serde(rename = "Service", default)]
    pub service: String,

    /// May be empty, in which case the node address applies
    #[serde(rename = "Address", default)]
    pub address: String,

    /// Signed so that bogus registrations (0, negative) survive decoding and
    /// can be rejected with a warning instead of failing the whole payload.
    #[serde(rename = "Port", default)]
    pub port: i32,

    /// `null` in the payload when the instance was registered without tags
    #[serde(rename = "Tags", default)]
    pub tags: Option<Vec<String>>,

    #[serde(rename = "Meta", default)]
    pub meta: Option<HashMap<String, String>>,
}

impl ServiceEntry {
    /// Build an entry for `service` with the given instance id.
    pub fn new(service: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            node: Node::default(),
            service: AgentService {
                id: id.into(),
                service: service.into(),
                ..AgentService::default()
            },
        }
    }

    pub fn with_node_address(mut self, address: impl Into<String>) -> Self {
        self.node.address = address.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.service.address = address.into();
        self
    }

    pub fn with_port(mut self, port: i32) -> Self {
        self.service.port = port;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.service.tags.get_or_insert_with(Vec::new).push(tag.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.service.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}

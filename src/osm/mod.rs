//! OpenStreetMap collaborator: the node model, the fetcher port, and the
//! live API client.

pub mod client;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::OsmApiClient;

/// A single OSM node reduced to its identifier and tag set.
///
/// Built once per fetch and read-only afterwards: the tag map is owned by
/// the node and only exposed through lookup accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsmNode {
    node_id: i64,
    tags: HashMap<String, String>,
}

impl OsmNode {
    pub fn new(node_id: i64, tags: HashMap<String, String>) -> Self {
        Self { node_id, tags }
    }

    pub fn node_id(&self) -> i64 {
        self.node_id
    }

    /// Tag value lookup; an absent key is `None`, never a placeholder.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }
}

/// Raised when a node cannot be retrieved or its payload cannot be read.
///
/// This is the single failure mode for the whole fetch stage: network
/// errors, empty or malformed responses, and identifier mismatches all
/// collapse into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("OSM node {0} could not be retrieved")]
pub struct OsmNodeNotFound(pub i64);

/// Port for fetching a single node from the external geodata source.
#[async_trait]
pub trait OsmNodeFetcher: Send + Sync {
    async fn fetch_node(&self, node_id: i64) -> Result<OsmNode, OsmNodeNotFound>;
}

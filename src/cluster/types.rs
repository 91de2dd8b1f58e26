use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Identity of a cluster member: the base URL other nodes use to reach it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    /// Normalizes the URL so `http://host:1/` and `http://host:1` compare equal.
    pub fn new(url: impl AsRef<str>) -> Self {
        Self(url.as_ref().trim().trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only cluster membership as seen by one node.
///
/// `nodes` keeps the order the operator listed them in; placement never relies
/// on that order (see `ReplicaSetResolver`).
#[derive(Debug, Clone)]
pub struct ClusterTopology {
    local: NodeId,
    nodes: Vec<NodeId>,
}

impl ClusterTopology {
    pub fn new(local: NodeId, nodes: Vec<NodeId>) -> Result<Self> {
        ensure!(!nodes.is_empty(), "cluster requires at least one node");

        let mut seen = HashSet::new();
        for node in &nodes {
            ensure!(!node.0.is_empty(), "node url must not be empty");
            ensure!(seen.insert(node), "duplicate node in cluster: {}", node);
        }
        ensure!(
            seen.contains(&local),
            "local node {} is not a member of the cluster",
            local
        );

        Ok(Self { local, nodes })
    }

    /// A cluster of one, handy for tests and local runs.
    pub fn single(local: NodeId) -> Self {
        Self {
            nodes: vec![local.clone()],
            local,
        }
    }

    pub fn local(&self) -> &NodeId {
        &self.local
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }
}

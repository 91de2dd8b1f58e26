use super::types::{QuorumError, QuorumSpec, ReplicaSet};
use crate::cluster::types::{ClusterTopology, NodeId};
use crate::storage::types::Key;

use std::cmp::Ordering;
use std::sync::Arc;

/// Maps keys to replica sets using rendezvous (highest-random-weight) hashing.
///
/// Every node scores every `(key, node)` pair with the same hash function, so all
/// nodes agree on the placement of a key without talking to each other.
pub struct ReplicaSetResolver {
    topology: Arc<ClusterTopology>,
}

impl ReplicaSetResolver {
    pub fn new(topology: Arc<ClusterTopology>) -> Self {
        Self { topology }
    }

    /// Resolves the replica set and quorum for `key`.
    ///
    /// Without an override the key lives on every node and needs a strict majority.
    /// An override (`ack/from`) outside `1 <= ack <= from <= cluster size` is an error,
    /// never clamped.
    pub fn resolve(
        &self,
        key: &Key,
        quorum_override: Option<&str>,
    ) -> Result<(ReplicaSet, QuorumSpec), QuorumError> {
        let cluster_size = self.topology.size();
        let quorum = match quorum_override {
            Some(raw) => QuorumSpec::parse(raw, cluster_size)?,
            None => QuorumSpec::majority(cluster_size)?,
        };

        let mut replicas = self.rank(key);
        replicas.truncate(quorum.from);

        Ok((
            ReplicaSet {
                coordinator: self.topology.local().clone(),
                replicas,
            },
            quorum,
        ))
    }

    /// Every cluster node ordered by preference for `key`.
    ///
    /// Highest score first; equal scores fall back to lexical node order.
    pub fn rank(&self, key: &Key) -> Vec<NodeId> {
        let mut scored: Vec<(u64, &NodeId)> = self
            .topology
            .nodes()
            .iter()
            .map(|node| (score(key, node), node))
            .collect();

        scored.sort_by(|(score_a, node_a), (score_b, node_b)| {
            match score_b.cmp(score_a) {
                Ordering::Equal => node_a.cmp(node_b),
                other => other,
            }
        });

        scored.into_iter().map(|(_, node)| node.clone()).collect()
    }
}

/// Rendezvous score of `node` for `key`.
///
/// FNV-1a over `key ‖ 0xff ‖ node`, finished with the murmur3 64-bit mixer. Both
/// are fixed algorithms, so every node computes the same placement regardless of
/// how it was built. `0xff` never occurs in UTF-8, which keeps the split unambiguous.
pub(crate) fn score(key: &Key, node: &NodeId) -> u64 {
    let mut hash = fnv1a(FNV_OFFSET, key.as_bytes());
    hash = fnv1a(hash, &[0xff]);
    hash = fnv1a(hash, node.as_str().as_bytes());
    fmix64(hash)
}

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a(mut hash: u64, bytes: &[u8]) -> u64 {
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51afd7ed558ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ceb9fe1a85ec53);
    k ^ (k >> 33)
}

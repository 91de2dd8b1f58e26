use crate::cluster::types::NodeId;
use crate::storage::types::Record;

use thiserror::Error;

/// The closed set of operations a client or a peer can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Get,
    Put { value: Vec<u8> },
    Delete,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Get => "GET",
            Operation::Put { .. } => "PUT",
            Operation::Delete => "DELETE",
        }
    }
}

/// Result of executing an operation on one replica, local or remote.
///
/// Aggregation only looks at the shape of the outcome, so local and remote
/// executions are counted the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// GET hit carries the record; PUT/DELETE carry nothing.
    Success(Option<Record>),
    /// Key is absent. `tombstone` holds the deletion timestamp when the key was deleted.
    NotFound { tombstone: Option<u64> },
    TransportFailure(String),
    Timeout,
    LocalFailure(String),
}

impl OperationOutcome {
    /// Whether this outcome acknowledges `op`.
    ///
    /// A replica that answers "absent" acknowledges a GET; failures and timeouts
    /// never acknowledge anything.
    pub fn acknowledges(&self, op: &Operation) -> bool {
        match (op, self) {
            (Operation::Get, OperationOutcome::Success(Some(_))) => true,
            (Operation::Get, OperationOutcome::NotFound { .. }) => true,
            (Operation::Put { .. } | Operation::Delete, OperationOutcome::Success(None)) => true,
            _ => false,
        }
    }

    /// The record this outcome reports for last-writer-wins comparison.
    pub fn record(&self) -> Option<Record> {
        match self {
            OperationOutcome::Success(Some(record)) => Some(record.clone()),
            OperationOutcome::NotFound {
                tombstone: Some(timestamp),
            } => Some(Record::tombstone(*timestamp)),
            _ => None,
        }
    }

    /// Inverse of `record` for GET answers.
    pub fn from_record(record: Option<Record>) -> Self {
        match record {
            Some(record) if record.is_tombstone() => OperationOutcome::NotFound {
                tombstone: Some(record.timestamp),
            },
            Some(record) => OperationOutcome::Success(Some(record)),
            None => OperationOutcome::NotFound { tombstone: None },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuorumError {
    #[error("malformed replicas parameter '{0}', expected <ack>/<from>")]
    Malformed(String),
    #[error("invalid quorum {ack}/{from}: require 1 <= ack <= from <= {cluster_size}")]
    OutOfRange {
        ack: usize,
        from: usize,
        cluster_size: usize,
    },
    #[error("cluster has no nodes")]
    EmptyCluster,
}

/// Required acknowledgments (`ack`) out of a replica set of size `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuorumSpec {
    pub ack: usize,
    pub from: usize,
}

impl QuorumSpec {
    /// Validates `1 <= ack <= from <= cluster_size`.
    pub fn new(ack: usize, from: usize, cluster_size: usize) -> Result<Self, QuorumError> {
        if cluster_size == 0 {
            return Err(QuorumError::EmptyCluster);
        }
        if ack == 0 || ack > from || from > cluster_size {
            return Err(QuorumError::OutOfRange {
                ack,
                from,
                cluster_size,
            });
        }
        Ok(Self { ack, from })
    }

    /// Every node is a replica and a strict majority must acknowledge.
    pub fn majority(cluster_size: usize) -> Result<Self, QuorumError> {
        Self::new(cluster_size / 2 + 1, cluster_size, cluster_size)
    }

    /// Parses a client override of the form `ack/from`.
    pub fn parse(raw: &str, cluster_size: usize) -> Result<Self, QuorumError> {
        let malformed = || QuorumError::Malformed(raw.to_string());

        let (ack, from) = raw.trim().split_once('/').ok_or_else(malformed)?;
        let ack: usize = ack.trim().parse().map_err(|_| malformed())?;
        let from: usize = from.trim().parse().map_err(|_| malformed())?;

        Self::new(ack, from, cluster_size)
    }
}

/// Replicas responsible for a key, in placement order, plus the node coordinating
/// the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaSet {
    pub coordinator: NodeId,
    pub replicas: Vec<NodeId>,
}

impl ReplicaSet {
    pub fn len(&self) -> usize {
        self.replicas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }

    /// Whether the coordinator holds a copy and must execute locally first.
    pub fn includes_coordinator(&self) -> bool {
        self.replicas.contains(&self.coordinator)
    }

    /// Replicas that must be reached over the network, in placement order.
    pub fn remote(&self) -> impl Iterator<Item = &NodeId> {
        self.replicas
            .iter()
            .filter(move |node| **node != self.coordinator)
    }
}

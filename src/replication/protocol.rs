//! Entity Protocol
//!
//! Endpoint, headers and Data Transfer Objects of the `/v0/entity` API shared by
//! clients and by replicas talking to each other.
//!
//! Client requests and replica requests use the same endpoint. A replica request
//! carries `HEADER_INTERNAL_REPLICA` and the coordinator-assigned timestamp, and is
//! executed only on the node it is addressed to.

use super::coordinator::{QuorumOutcome, RejectReason};
use super::types::{Operation, OperationOutcome};
use crate::storage::types::Key;

use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Single endpoint for GET/PUT/DELETE of one key.
pub const ENDPOINT_ENTITY: &str = "/v0/entity";

// --- Headers ---

/// Marks a peer-originated, single-replica request.
pub const HEADER_INTERNAL_REPLICA: &str = "x-internal-replica";
/// Record version: assigned by the coordinator on writes, reported by replicas on reads.
pub const HEADER_RECORD_TIMESTAMP: &str = "x-record-timestamp";
/// Set on a replica GET miss when the key is a tombstone rather than never written.
pub const HEADER_RECORD_TOMBSTONE: &str = "x-record-tombstone";

/// Body of a 504 response when the quorum could not be reached.
pub const NOT_ENOUGH_REPLICAS: &str = "Not Enough Replicas";

// --- Data Transfer Objects ---

/// Query string of `/v0/entity`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EntityParams {
    /// The record key.
    pub id: Option<String>,
    /// Optional quorum override, `<ack>/<from>`.
    pub replicas: Option<String>,
}

/// Who sent the request, and what that implies for its handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A fresh client request, to be driven through the quorum protocol.
    Client { quorum: Option<String> },
    /// A peer asking this node to apply the operation to its own replica only.
    Replica { timestamp: Option<u64> },
}

/// A parsed `/v0/entity` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRequest {
    pub operation: Operation,
    pub key: Key,
    pub origin: Origin,
}

/// Client-visible result of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityResponse {
    /// 200 with the value.
    Found { value: Vec<u8>, timestamp: u64 },
    /// 404; `tombstone` is the deletion timestamp when the key was deleted. Only
    /// replica responses carry it.
    NotFound { tombstone: Option<u64> },
    /// 201, PUT applied.
    Created,
    /// 202, DELETE applied.
    Accepted,
    /// 504, quorum not reached.
    NotEnoughReplicas { acks: usize, required: usize },
    /// 400, invalid quorum or malformed input.
    BadRequest(String),
    /// 500, the coordinating replica could not apply the operation.
    Rejected(String),
}

impl EntityResponse {
    /// Maps a successful or failed single-replica execution.
    pub fn from_outcome(op: &Operation, outcome: OperationOutcome) -> Self {
        match (op, outcome) {
            (Operation::Get, OperationOutcome::Success(Some(record))) => match record.value {
                Some(value) => EntityResponse::Found {
                    value,
                    timestamp: record.timestamp,
                },
                None => EntityResponse::NotFound {
                    tombstone: Some(record.timestamp),
                },
            },
            (_, OperationOutcome::NotFound { tombstone }) => EntityResponse::NotFound { tombstone },
            (Operation::Put { .. }, OperationOutcome::Success(_)) => EntityResponse::Created,
            (Operation::Delete, OperationOutcome::Success(_)) => EntityResponse::Accepted,
            (_, OperationOutcome::Timeout) => {
                EntityResponse::Rejected(format!("{} timed out", op.name()))
            }
            (_, OperationOutcome::Success(None)) => {
                EntityResponse::Rejected(format!("{} returned no record", op.name()))
            }
            (_, OperationOutcome::TransportFailure(reason))
            | (_, OperationOutcome::LocalFailure(reason)) => EntityResponse::Rejected(reason),
        }
    }

    /// Maps a coordinated request to what the client sees. Tombstones stay internal:
    /// a deleted key reads as a plain miss.
    pub fn from_quorum(op: &Operation, outcome: QuorumOutcome) -> Self {
        match outcome {
            QuorumOutcome::Acked { result, .. } => match Self::from_outcome(op, result) {
                EntityResponse::NotFound { .. } => EntityResponse::NotFound { tombstone: None },
                response => response,
            },
            QuorumOutcome::Insufficient { acks, required } => {
                EntityResponse::NotEnoughReplicas { acks, required }
            }
            QuorumOutcome::Rejected(reason) => match reason {
                RejectReason::InvalidQuorum(e) => {
                    EntityResponse::BadRequest(e.to_string())
                }
                local @ RejectReason::LocalFailure { .. } => {
                    EntityResponse::Rejected(local.to_string())
                }
            },
        }
    }
}

/// JSON body of 400/500 responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

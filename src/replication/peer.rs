use super::protocol::{
    ENDPOINT_ENTITY, HEADER_INTERNAL_REPLICA, HEADER_RECORD_TIMESTAMP, HEADER_RECORD_TOMBSTONE,
};
use super::types::{Operation, OperationOutcome};
use crate::cluster::types::NodeId;
use crate::storage::types::{Key, Record};

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use tokio::time::Instant;

/// Sends a single-replica operation to another node.
///
/// Calls are always tagged as internal so the receiver executes them locally
/// instead of coordinating them again. Implementations must give up at `deadline`
/// and report `Timeout`; they never retry.
#[async_trait]
pub trait PeerClient: Send + Sync {
    async fn call(
        &self,
        node: &NodeId,
        op: &Operation,
        key: &Key,
        timestamp: u64,
        deadline: Instant,
    ) -> OperationOutcome;
}

/// `PeerClient` speaking the `/v0/entity` protocol over HTTP.
pub struct HttpPeerClient {
    http_client: reqwest::Client,
}

impl HttpPeerClient {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
        }
    }

    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    async fn send(
        &self,
        node: &NodeId,
        op: &Operation,
        key: &Key,
        timestamp: u64,
        deadline: Instant,
    ) -> OperationOutcome {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return OperationOutcome::Timeout;
        }

        let url = format!("{}{}", node, ENDPOINT_ENTITY);
        let request = match op {
            Operation::Get => self.http_client.get(&url),
            Operation::Put { value } => self.http_client.put(&url).body(value.clone()),
            Operation::Delete => self.http_client.delete(&url),
        };

        let response = request
            .query(&[("id", key.as_str())])
            .header(HEADER_INTERNAL_REPLICA, "true")
            .header(HEADER_RECORD_TIMESTAMP, timestamp.to_string())
            .timeout(remaining)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return OperationOutcome::Timeout,
            Err(e) => return OperationOutcome::TransportFailure(e.to_string()),
        };

        let status = response.status();
        let headers = response.headers().clone();

        match (op, status) {
            (Operation::Get, StatusCode::OK) => {
                let Some(timestamp) = header_u64(&headers, HEADER_RECORD_TIMESTAMP) else {
                    return OperationOutcome::TransportFailure(
                        "GET response without record timestamp".to_string(),
                    );
                };
                match response.bytes().await {
                    Ok(body) => OperationOutcome::Success(Some(Record::value(body.to_vec(), timestamp))),
                    Err(e) if e.is_timeout() => OperationOutcome::Timeout,
                    Err(e) => OperationOutcome::TransportFailure(e.to_string()),
                }
            }
            (Operation::Get, StatusCode::NOT_FOUND) => {
                let tombstone = if header_flag(&headers, HEADER_RECORD_TOMBSTONE) {
                    header_u64(&headers, HEADER_RECORD_TIMESTAMP)
                } else {
                    None
                };
                OperationOutcome::NotFound { tombstone }
            }
            (Operation::Put { .. }, StatusCode::CREATED)
            | (Operation::Delete, StatusCode::ACCEPTED) => OperationOutcome::Success(None),
            (_, status) => OperationOutcome::TransportFailure(format!(
                "{} on {} answered {}",
                op.name(),
                node,
                status
            )),
        }
    }
}

impl Default for HttpPeerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PeerClient for HttpPeerClient {
    async fn call(
        &self,
        node: &NodeId,
        op: &Operation,
        key: &Key,
        timestamp: u64,
        deadline: Instant,
    ) -> OperationOutcome {
        match tokio::time::timeout_at(deadline, self.send(node, op, key, timestamp, deadline)).await {
            Ok(outcome) => outcome,
            Err(_) => OperationOutcome::Timeout,
        }
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

fn header_flag(headers: &HeaderMap, name: &str) -> bool {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

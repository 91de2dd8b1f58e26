use super::clock::MonotonicClock;
use super::executor::LocalOperationExecutor;
use super::peer::PeerClient;
use super::resolver::ReplicaSetResolver;
use super::types::{Operation, OperationOutcome, QuorumError, QuorumSpec};
use crate::cluster::types::NodeId;
use crate::storage::types::{Key, Record};

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

type PeerCall = BoxFuture<'static, (NodeId, OperationOutcome)>;

/// Why a request was refused before reaching a quorum decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error(transparent)]
    InvalidQuorum(#[from] QuorumError),
    #[error("local replica failed to apply {operation}: {reason}")]
    LocalFailure {
        operation: &'static str,
        reason: String,
    },
}

/// Terminal state of a coordinated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuorumOutcome {
    /// `ack` replicas agreed. `result` is the outcome reported to the client: for a
    /// GET the freshest record among the acknowledgments, otherwise `Success(None)`.
    Acked {
        acks: usize,
        result: OperationOutcome,
    },
    /// The quorum was not met before the deadline or became unreachable.
    Insufficient { acks: usize, required: usize },
    Rejected(RejectReason),
}

/// Acknowledgments collected so far for one request.
///
/// The count only grows, and only the first `required` acknowledgments (in
/// completion order) contribute to the result.
struct Tally<'a> {
    op: &'a Operation,
    required: usize,
    acks: usize,
    freshest: Option<Record>,
}

impl<'a> Tally<'a> {
    fn new(op: &'a Operation, quorum: QuorumSpec) -> Self {
        Self {
            op,
            required: quorum.ack,
            acks: 0,
            freshest: None,
        }
    }

    /// Returns whether `outcome` was counted.
    fn record(&mut self, outcome: &OperationOutcome) -> bool {
        if self.is_met() || !outcome.acknowledges(self.op) {
            return false;
        }
        self.acks += 1;

        if let Some(candidate) = outcome.record() {
            let newer = match &self.freshest {
                Some(current) => candidate.supersedes(current),
                None => true,
            };
            if newer {
                self.freshest = Some(candidate);
            }
        }
        true
    }

    fn is_met(&self) -> bool {
        self.acks >= self.required
    }

    fn can_still_meet(&self, pending: usize) -> bool {
        self.acks + pending >= self.required
    }

    fn finish(self) -> QuorumOutcome {
        if !self.is_met() {
            return QuorumOutcome::Insufficient {
                acks: self.acks,
                required: self.required,
            };
        }
        let result = match self.op {
            Operation::Get => OperationOutcome::from_record(self.freshest),
            Operation::Put { .. } | Operation::Delete => OperationOutcome::Success(None),
        };
        QuorumOutcome::Acked {
            acks: self.acks,
            result,
        }
    }
}

/// Drives a client request through the quorum protocol.
///
/// `ROUTING` (resolve replicas) -> `LOCAL_EXEC` (if this node is a replica) ->
/// `FANOUT` + `AGGREGATING` (remote replicas, concurrently) -> `Acked`,
/// `Insufficient` or `Rejected`.
pub struct QuorumCoordinator {
    resolver: ReplicaSetResolver,
    executor: Arc<LocalOperationExecutor>,
    peers: Arc<dyn PeerClient>,
    clock: MonotonicClock,
    request_timeout: Duration,
}

impl QuorumCoordinator {
    pub fn new(
        resolver: ReplicaSetResolver,
        executor: Arc<LocalOperationExecutor>,
        peers: Arc<dyn PeerClient>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            executor,
            peers,
            clock: MonotonicClock::new(),
            request_timeout,
        }
    }

    pub async fn coordinate(
        &self,
        op: Operation,
        key: Key,
        quorum_override: Option<&str>,
    ) -> QuorumOutcome {
        let deadline = Instant::now() + self.request_timeout;

        let (replicas, quorum) = match self.resolver.resolve(&key, quorum_override) {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!("Rejecting {} for {}: {}", op.name(), key, e);
                return QuorumOutcome::Rejected(e.into());
            }
        };

        // Assigned once here so every replica stores the write under the same version.
        let timestamp = self.clock.next();
        let op = Arc::new(op);
        let key = Arc::new(key);

        tracing::debug!(
            "{} {} ts={} quorum={}/{} replicas={:?}",
            op.name(),
            key,
            timestamp,
            quorum.ack,
            quorum.from,
            replicas.replicas
        );

        let mut tally = Tally::new(&op, quorum);

        if replicas.includes_coordinator() {
            let local = self.executor.execute(&op, &key, timestamp);
            if !tally.record(&local) {
                let reason = match local {
                    OperationOutcome::LocalFailure(reason)
                    | OperationOutcome::TransportFailure(reason) => reason,
                    other => format!("unexpected local outcome {:?}", other),
                };
                tracing::warn!(
                    "Local {} for {} failed, not contacting replicas: {}",
                    op.name(),
                    key,
                    reason
                );
                return QuorumOutcome::Rejected(RejectReason::LocalFailure {
                    operation: op.name(),
                    reason,
                });
            }
        }

        let mut in_flight: FuturesUnordered<PeerCall> = replicas
            .remote()
            .map(|node| self.dispatch(node.clone(), op.clone(), key.clone(), timestamp, deadline))
            .collect();
        let mut pending = in_flight.len();

        while !tally.is_met() && tally.can_still_meet(pending) {
            let Some((node, outcome)) = in_flight.next().await else {
                break;
            };
            pending -= 1;

            if tally.record(&outcome) {
                tracing::debug!("{} for {} acknowledged by {}", op.name(), key, node);
            } else {
                tracing::warn!(
                    "{} for {} not acknowledged by {}: {:?}",
                    op.name(),
                    key,
                    node,
                    outcome
                );
            }
        }

        if !in_flight.is_empty() {
            self.abandon(&op, &key, in_flight);
        }

        let outcome = tally.finish();
        match &outcome {
            QuorumOutcome::Insufficient { acks, required } => tracing::warn!(
                "{} for {} got {}/{} acknowledgments",
                op.name(),
                key,
                acks,
                required
            ),
            _ => tracing::info!("{} for {} acknowledged by quorum", op.name(), key),
        }
        outcome
    }

    fn dispatch(
        &self,
        node: NodeId,
        op: Arc<Operation>,
        key: Arc<Key>,
        timestamp: u64,
        deadline: Instant,
    ) -> PeerCall {
        let peers = self.peers.clone();
        async move {
            let call = peers.call(&node, &op, &key, timestamp, deadline);
            let outcome = tokio::time::timeout_at(deadline, call)
                .await
                .unwrap_or(OperationOutcome::Timeout);
            (node, outcome)
        }
        .boxed()
    }

    /// Stops waiting on peer calls whose answers can no longer change the result.
    ///
    /// Reads are cancelled outright. Writes are left to finish in the background,
    /// still bounded by the request deadline, so lagging replicas converge.
    fn abandon(&self, op: &Operation, key: &Key, mut in_flight: FuturesUnordered<PeerCall>) {
        if matches!(op, Operation::Get) {
            return;
        }

        let op_name = op.name();
        let key = key.clone();
        tokio::spawn(async move {
            while let Some((node, outcome)) = in_flight.next().await {
                tracing::debug!("Late {} for {} from {}: {:?}", op_name, key, node, outcome);
            }
        });
    }
}

use super::coordinator::QuorumCoordinator;
use super::executor::LocalOperationExecutor;
use super::protocol::{EntityRequest, EntityResponse, Origin};
use super::types::Operation;

use std::sync::Arc;

/// Entry point for every `/v0/entity` request.
///
/// Replica requests are answered from local storage and never fanned out again,
/// which is what keeps replicas from forwarding to each other in a loop. Everything
/// else is a client request and goes through the `QuorumCoordinator`; any node can
/// coordinate any key.
pub struct RequestRouter {
    executor: Arc<LocalOperationExecutor>,
    coordinator: Arc<QuorumCoordinator>,
}

impl RequestRouter {
    pub fn new(executor: Arc<LocalOperationExecutor>, coordinator: Arc<QuorumCoordinator>) -> Self {
        Self {
            executor,
            coordinator,
        }
    }

    pub async fn route(&self, request: EntityRequest) -> EntityResponse {
        let EntityRequest {
            operation,
            key,
            origin,
        } = request;

        match origin {
            Origin::Replica { timestamp } => {
                let timestamp = match (&operation, timestamp) {
                    (_, Some(timestamp)) => timestamp,
                    // Reads do not need a version from the caller.
                    (Operation::Get, None) => 0,
                    (_, None) => {
                        tracing::warn!("Replica {} for {} without timestamp", operation.name(), key);
                        return EntityResponse::BadRequest(
                            "replica write requires a record timestamp".to_string(),
                        );
                    }
                };
                tracing::debug!("Replica {} for {} ts={}", operation.name(), key, timestamp);
                let outcome = self.executor.execute(&operation, &key, timestamp);
                EntityResponse::from_outcome(&operation, outcome)
            }
            Origin::Client { quorum } => {
                let outcome = self
                    .coordinator
                    .coordinate(operation.clone(), key, quorum.as_deref())
                    .await;
                EntityResponse::from_quorum(&operation, outcome)
            }
        }
    }
}

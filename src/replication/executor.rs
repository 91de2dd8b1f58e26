use super::types::{Operation, OperationOutcome};
use crate::storage::engine::Storage;
use crate::storage::types::Key;

use std::sync::Arc;

/// Applies operations to this node's storage engine.
///
/// The only component that writes to local storage. Storage errors come back as
/// `LocalFailure` so the coordinator can treat them like any other failed replica.
pub struct LocalOperationExecutor {
    storage: Arc<dyn Storage>,
}

impl LocalOperationExecutor {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn execute(&self, op: &Operation, key: &Key, timestamp: u64) -> OperationOutcome {
        let result = match op {
            Operation::Get => self.storage.get(key).map(OperationOutcome::from_record),
            Operation::Put { value } => self
                .storage
                .upsert(key, value.clone(), timestamp)
                .map(|_| OperationOutcome::Success(None)),
            Operation::Delete => self
                .storage
                .delete(key, timestamp)
                .map(|_| OperationOutcome::Success(None)),
        };

        result.unwrap_or_else(|e| {
            tracing::error!("Local {} for {} failed: {}", op.name(), key, e);
            OperationOutcome::LocalFailure(e.to_string())
        })
    }
}

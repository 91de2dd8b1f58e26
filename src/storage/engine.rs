use super::types::{Key, Record, StorageError};

/// Point operations the replication layer needs from a storage engine.
///
/// Durability, compaction and on-disk layout belong to the implementation.
/// Implementations must be safe to call concurrently for the same key; ordering
/// between concurrent writes is decided by record timestamps, not by the caller.
pub trait Storage: Send + Sync {
    /// Returns the stored record, tombstones included.
    fn get(&self, key: &Key) -> Result<Option<Record>, StorageError>;

    fn upsert(&self, key: &Key, value: Vec<u8>, timestamp: u64) -> Result<(), StorageError>;

    fn delete(&self, key: &Key, timestamp: u64) -> Result<(), StorageError>;
}

use super::engine::Storage;
use super::types::{Key, Record, StorageError};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// In-memory last-writer-wins store.
///
/// Each key holds its newest `Record`. The `DashMap` entry lock serializes
/// concurrent writers of the same key, and `Record::supersedes` decides which
/// one survives.
#[derive(Default)]
pub struct MemoryStorage {
    data: DashMap<Key, Record>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    fn apply(&self, key: &Key, record: Record) {
        match self.data.entry(key.clone()) {
            Entry::Occupied(mut existing) => {
                if record.supersedes(existing.get()) {
                    existing.insert(record);
                } else {
                    tracing::debug!(
                        "Ignoring stale write for {} (ts={} <= {})",
                        key,
                        record.timestamp,
                        existing.get().timestamp
                    );
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
        }
    }

    /// Number of stored records, tombstones included.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &Key) -> Result<Option<Record>, StorageError> {
        Ok(self.data.get(key).map(|entry| entry.value().clone()))
    }

    fn upsert(&self, key: &Key, value: Vec<u8>, timestamp: u64) -> Result<(), StorageError> {
        self.apply(key, Record::value(value, timestamp));
        Ok(())
    }

    fn delete(&self, key: &Key, timestamp: u64) -> Result<(), StorageError> {
        self.apply(key, Record::tombstone(timestamp));
        Ok(())
    }
}

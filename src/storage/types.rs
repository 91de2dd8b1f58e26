use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier of a record, taken verbatim from the request's `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Key(pub String);

impl Key {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored version of a key.
///
/// `value == None` is a tombstone: the key was deleted at `timestamp`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    pub value: Option<Vec<u8>>,
    pub timestamp: u64,
}

impl Record {
    pub fn value(value: Vec<u8>, timestamp: u64) -> Self {
        Self {
            value: Some(value),
            timestamp,
        }
    }

    pub fn tombstone(timestamp: u64) -> Self {
        Self {
            value: None,
            timestamp,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.value.is_none()
    }

    /// Last-writer-wins ordering shared by storage and quorum reads.
    ///
    /// Greater timestamp wins. On a tie a tombstone beats a value, and between two
    /// values the greater byte string wins, so every replica picks the same record.
    pub fn supersedes(&self, other: &Record) -> bool {
        if self.timestamp != other.timestamp {
            return self.timestamp > other.timestamp;
        }
        match (&self.value, &other.value) {
            (None, Some(_)) => true,
            (Some(_), None) | (None, None) => false,
            (Some(mine), Some(theirs)) => mine > theirs,
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

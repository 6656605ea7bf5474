//! Key Index
//!
//! In-memory map from key to the offset of its newest live record.
//!
//! ## Invariant
//! A key present here always points at a Put record. Deleted keys are
//! removed outright, never mapped to their tombstone.
//!
//! The index is never written to disk; it is rebuilt from the log on open.

use std::collections::HashMap;

use crate::log::{Mark, Record};

/// Key → log offset of the key's latest Put
#[derive(Debug, Default)]
pub struct KeyIndex {
    offsets: HashMap<Vec<u8>, u64>,
}

impl KeyIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of the live record for `key`
    pub fn get(&self, key: &[u8]) -> Option<u64> {
        self.offsets.get(key).copied()
    }

    /// Point `key` at `offset`, replacing any previous mapping
    pub fn insert(&mut self, key: Vec<u8>, offset: u64) {
        self.offsets.insert(key, offset);
    }

    /// Drop `key`. Returns the offset it pointed at, if any.
    pub fn remove(&mut self, key: &[u8]) -> Option<u64> {
        self.offsets.remove(key)
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.offsets.contains_key(key)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Replay one record found at `offset`
    ///
    /// A Put maps its key to `offset`; a tombstone removes its key (a no-op
    /// if the key is absent). Applying records in log order leaves each key
    /// mapped according to its last record.
    pub fn apply(&mut self, record: Record, offset: u64) {
        match record.mark() {
            Mark::Put => self.insert(record.into_key(), offset),
            Mark::Delete => {
                self.remove(record.key());
            }
        }
    }
}

//! In-memory store
//!
//! BTreeMap-based store with RwLock for concurrency.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::error::{CmdLogError, Result};
use super::KvStore;

/// Volatile key-value store
///
/// Many concurrent readers, one writer at a time.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Check for a key without copying its value
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.data.read().contains_key(key)
    }

    /// Snapshot of every key in sorted order
    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.data.read().keys().cloned().collect()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.data
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| CmdLogError::key_not_found(key))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}

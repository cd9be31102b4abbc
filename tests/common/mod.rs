//! Shared helpers for integration tests

#![allow(dead_code)]

use std::collections::HashSet;

use cmdlog::error::{CmdLogError, Result};
use cmdlog::store::MemoryStore;
use cmdlog::KvStore;
use parking_lot::Mutex;

// =============================================================================
// Fault-injecting store
// =============================================================================

/// MemoryStore that fails puts/gets for chosen keys
#[derive(Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    failing_puts: Mutex<HashSet<Vec<u8>>>,
    failing_gets: Mutex<HashSet<Vec<u8>>>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_put(&self, key: &str) {
        self.failing_puts.lock().insert(key.as_bytes().to_vec());
    }

    pub fn fail_get(&self, key: &str) {
        self.failing_gets.lock().insert(key.as_bytes().to_vec());
    }

    pub fn heal(&self) {
        self.failing_puts.lock().clear();
        self.failing_gets.lock().clear();
    }
}

impl KvStore for FaultyStore {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        if self.failing_gets.lock().contains(key) {
            return Err(CmdLogError::Store(format!(
                "injected get failure for {}",
                String::from_utf8_lossy(key)
            )));
        }
        self.inner.get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if self.failing_puts.lock().contains(key) {
            return Err(CmdLogError::Store(format!(
                "injected put failure for {}",
                String::from_utf8_lossy(key)
            )));
        }
        self.inner.put(key, value)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Turn string literals into owned args
pub fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Read a key as text, panicking when absent
pub fn value_of<S: KvStore>(store: &S, key: &str) -> String {
    String::from_utf8(store.get(key.as_bytes()).unwrap()).unwrap()
}

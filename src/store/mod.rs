//! Store Module
//!
//! The key-value store adapter the command log is layered on.
//!
//! ## Responsibilities
//! - `get(key)` returning the stored bytes or `KeyNotFound`
//! - `put(key, value)` overwriting unconditionally
//!
//! The log logic never sees anything but the `KvStore` trait. Two adapters
//! ship with the crate:
//! - `MemoryStore`: BTreeMap behind a RwLock (tests, benches, scratch runs)
//! - `FileStore`: append-only record file replayed into an in-memory index
//!
//! ## Record File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Record 1                                │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ Seq (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Record 2                                │
//! │ ...                                     │
//! └─────────────────────────────────────────┘
//! ```

mod file;
mod memory;
mod record;

use std::sync::Arc;

use crate::error::Result;

pub use file::{FileStore, RecoveryReport};
pub use memory::MemoryStore;
pub use record::{StoreRecord, RECORD_HEADER_SIZE};

/// Adapter over an external key-value store
///
/// Both calls are treated as synchronous and atomic per key.
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`
    ///
    /// Fails with `KeyNotFound` when the key is absent.
    fn get(&self, key: &[u8]) -> Result<Vec<u8>>;

    /// Store `value` under `key`, replacing any previous value
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;
}

impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        (**self).get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        (**self).get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }
}

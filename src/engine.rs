//! Engine Module
//!
//! Runs operations against a `KvStore`.
//!
//! ## Responsibilities
//! - Route parsed operations to their handlers
//! - Coordinate a sync: cursor, batch, append, persist, catch-up
//! - Serialize writers per key so read-modify-writes are not lost
//! - Map outcomes to caller-facing responses

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{CmdLogError, Result};
use crate::log::{Cursor, Diagnostic, LogReader, LogWriter};
use crate::protocol::{
    parse_position, Batch, Operation, OperationKind, Response, SyncRequest, SyncResult,
};
use crate::store::{FileStore, KvStore, MemoryStore};

/// Result of one sync plus whatever best-effort steps were skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub result: SyncResult,

    /// Failed entry writes, then skipped entry reads, in index order
    pub diagnostics: Vec<Diagnostic>,
}

impl SyncOutcome {
    /// Response envelope text
    pub fn encode(&self) -> String {
        self.result.encode()
    }
}

/// Number of writer lock stripes
const WRITER_STRIPES: usize = 64;

/// Fixed set of writer locks; a key always hashes to the same stripe
///
/// Unrelated keys may share a stripe and wait on each other. Memory stays
/// constant however many keys are written.
struct WriterLocks {
    stripes: Vec<Mutex<()>>,
}

impl Default for WriterLocks {
    fn default() -> Self {
        Self {
            stripes: (0..WRITER_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }
}

impl WriterLocks {
    fn stripe(&self, key: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let slot = hasher.finish() % self.stripes.len() as u64;
        &self.stripes[slot as usize]
    }
}

/// The command log engine
///
/// ## Concurrency Model: one writer per log
///
/// - **sync**: holds the writer stripe of its count key from the cursor read
///   until the new cursor is stored; the catch-up read runs outside it since
///   entries below the stored cursor never change
/// - **append**: holds the stripe of its key across the read-modify-write
/// - **read/write/init**: single store calls, no stripe
///
/// No operation holds two stripes at once. With `serialize_writers` off, no
/// stripes are taken and concurrent syncs against one log can lose cursor
/// updates.
pub struct Engine<S: KvStore> {
    /// Engine configuration
    config: Config,

    /// Backing store; every invocation re-reads what it needs
    store: S,

    /// Striped writer locks
    writers: WriterLocks,
}

impl Engine<FileStore> {
    /// Open or create an engine backed by a file store in `config.data_dir`
    pub fn open(config: Config) -> Result<Self> {
        let store = FileStore::open(&config.data_dir, config.store_sync_strategy)?;
        Ok(Self::new(store, config))
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Sync the record file to disk
    pub fn close(self) -> Result<()> {
        tracing::debug!("Closing store at {}", self.store.path().display());
        self.store.sync()
    }
}

impl Engine<MemoryStore> {
    /// Engine over a fresh volatile store
    pub fn in_memory(config: Config) -> Self {
        Self::new(MemoryStore::new(), config)
    }
}

impl<S: KvStore> Engine<S> {
    /// Wrap an existing store
    pub fn new(store: S, config: Config) -> Self {
        Self {
            config,
            store,
            writers: WriterLocks::default(),
        }
    }

    /// Parse, execute and map the outcome to a response
    ///
    /// A failed read carries a JSON body naming the key; every other failure
    /// carries the error text.
    pub fn handle(&self, kind: OperationKind, function: &str, args: &[String]) -> Response {
        tracing::debug!("{} is running {}", kind, function);

        let operation = match Operation::parse(kind, function, args) {
            Ok(operation) => operation,
            Err(e) => {
                tracing::warn!("Rejected {} {}: {}", kind, function, e);
                return Response::error(&e.to_string());
            }
        };

        if let Operation::Read { key } = &operation {
            return match self.read(key) {
                Ok(value) => Response::ok(Some(value)),
                Err(CmdLogError::KeyNotFound(_)) => Response::not_found(key),
                Err(e) => {
                    tracing::warn!("Read of {:?} failed: {}", key, e);
                    Response::read_error(key)
                }
            };
        }

        match self.execute(operation) {
            Ok(payload) => Response::ok(payload),
            Err(e) => {
                tracing::warn!("{} {} failed: {}", kind, function, e);
                Response::error(&e.to_string())
            }
        }
    }

    /// Execute an operation
    ///
    /// Routes operations to the appropriate handlers
    pub fn execute(&self, operation: Operation) -> Result<Option<Vec<u8>>> {
        tracing::trace!("execute {}", operation.name());
        match operation {
            Operation::Init { value } => {
                self.init(&value)?;
                Ok(None)
            }
            Operation::Write { key, value } => {
                self.write(&key, &value)?;
                Ok(None)
            }
            Operation::Read { key } => self.read(&key).map(Some),
            Operation::Append { key, value } => {
                self.append(&key, &value)?;
                Ok(None)
            }
            Operation::Sync(request) => {
                let outcome = self.sync(&request)?;
                Ok(Some(outcome.encode().into_bytes()))
            }
        }
    }

    // =========================================================================
    // Simple Operations
    // =========================================================================

    /// Store `value` under the configured init key
    pub fn init(&self, value: &str) -> Result<()> {
        self.store
            .put(self.config.init_key.as_bytes(), value.as_bytes())
    }

    /// Unconditional put
    pub fn write(&self, key: &str, value: &str) -> Result<()> {
        tracing::debug!("write {:?}", key);
        self.store.put(key.as_bytes(), value.as_bytes())
    }

    /// Get a value by key
    pub fn read(&self, key: &str) -> Result<Vec<u8>> {
        self.store.get(key.as_bytes())
    }

    /// Append `value` to the value under `key` with a `|` separator
    ///
    /// An absent key stores `value` alone. Other read failures propagate
    /// rather than being mistaken for absence.
    pub fn append(&self, key: &str, value: &str) -> Result<()> {
        tracing::debug!("append {:?}", key);

        let _guard = self.writer_lock(key).map(|lock| lock.lock());

        let new_value = match self.store.get(key.as_bytes()) {
            Ok(mut old) => {
                old.push(b'|');
                old.extend_from_slice(value.as_bytes());
                old
            }
            Err(CmdLogError::KeyNotFound(_)) => value.as_bytes().to_vec(),
            Err(e) => return Err(e),
        };

        self.store.put(key.as_bytes(), &new_value)
    }

    // =========================================================================
    // Sync
    // =========================================================================

    /// Append a batch to a log and catch up from the caller's position
    ///
    /// Steps:
    /// 1. Load the cursor (absent reads as 0)
    /// 2. Decode the batch envelope
    /// 3. Append non-empty commands from the cursor on (best-effort per
    ///    entry; a batch that would overflow the cursor aborts untouched)
    /// 4. Store the new cursor; failure aborts with `Persistence`
    /// 5. Read `[position, cursor)` (best-effort)
    pub fn sync(&self, request: &SyncRequest) -> Result<SyncOutcome> {
        let log = &request.log;

        let guard = self.writer_lock(log.count_key()).map(|lock| lock.lock());

        // Step 1: Load the cursor
        let start = Cursor::load(&self.store, log.count_key());

        // Step 2: Decode the batch
        let batch = Batch::decode(&request.batch, self.config.envelope_mode)?;
        if batch.is_empty() {
            tracing::debug!("sync {:?}: nothing to append, catch-up only", log.count_key());
        }

        // Step 3: Append entries; an overflowing batch aborts before any write
        let appended = LogWriter::new(&self.store, log).append(start, batch.non_empty())?;
        tracing::debug!(
            "sync {:?}: cursor {} -> {} ({} written)",
            log.count_key(),
            start,
            appended.cursor,
            appended.written
        );

        // Step 4: Persist the cursor - the one fatal step
        appended
            .cursor
            .store(&self.store, log.count_key())
            .map_err(|e| CmdLogError::Persistence {
                key: log.count_key().to_string(),
                source: Box::new(e),
            })?;

        drop(guard);

        // Step 5: Catch-up read
        let position = parse_position(&request.position);
        let read = LogReader::new(&self.store, log).read_from(position, appended.cursor);

        let mut diagnostics = appended.diagnostics;
        diagnostics.extend(read.diagnostics);

        Ok(SyncOutcome {
            result: SyncResult::new(read.entries, appended.cursor),
            diagnostics,
        })
    }

    /// Writer stripe for `key`, when writers are serialized
    fn writer_lock(&self, key: &str) -> Option<&Mutex<()>> {
        self.config
            .serialize_writers
            .then(|| self.writers.stripe(key))
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_locks_stay_fixed_for_many_keys() {
        let locks = WriterLocks::default();

        for i in 0..10_000 {
            let _guard = locks.stripe(&format!("list{}", i)).lock();
        }

        assert_eq!(locks.stripes.len(), WRITER_STRIPES);
    }

    #[test]
    fn test_same_key_same_stripe() {
        let locks = WriterLocks::default();

        let first = locks.stripe("count") as *const Mutex<()>;
        let second = locks.stripe("count") as *const Mutex<()>;

        assert_eq!(first, second);
    }
}

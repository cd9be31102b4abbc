//! Log Reader
//!
//! Catch-up reads from a caller's position up to the cursor.

use crate::error::CmdLogError;
use crate::store::KvStore;
use super::{Cursor, Diagnostic, Log};

/// Entries retrieved by a catch-up read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatchupRead {
    /// Retrieved entries in ascending index order
    pub entries: Vec<String>,

    /// Indices that were skipped because of a missing entry or a failed read
    pub diagnostics: Vec<Diagnostic>,
}

/// Reads entries for one log
pub struct LogReader<'a, S: KvStore + ?Sized> {
    store: &'a S,
    log: &'a Log,
}

impl<'a, S: KvStore + ?Sized> LogReader<'a, S> {
    pub fn new(store: &'a S, log: &'a Log) -> Self {
        Self { store, log }
    }

    /// Read every entry in `[position, cursor)`
    ///
    /// Missing and unreadable entries are skipped, as are empty ones.
    /// A position at or past the cursor yields nothing.
    pub fn read_from(&self, position: u64, cursor: Cursor) -> CatchupRead {
        let mut read = CatchupRead::default();

        for index in position..cursor.value() {
            let key = self.log.entry_key(index);
            match self.store.get(key.as_bytes()) {
                Ok(bytes) if bytes.is_empty() => {}
                Ok(bytes) => {
                    read.entries
                        .push(String::from_utf8_lossy(&bytes).into_owned());
                }
                Err(CmdLogError::KeyNotFound(_)) => {
                    tracing::warn!("Entry {} missing below cursor {}", key, cursor);
                    read.diagnostics.push(Diagnostic::EntryMissing { index, key });
                }
                Err(e) => {
                    tracing::warn!("Entry read {} failed, skipping: {}", key, e);
                    read.diagnostics.push(Diagnostic::EntryReadFailed {
                        index,
                        key,
                        reason: e.to_string(),
                    });
                }
            }
        }

        read
    }
}

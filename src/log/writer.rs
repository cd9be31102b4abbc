//! Log Writer
//!
//! Appends commands to a log under consecutive indices.

use crate::error::{CmdLogError, Result};
use crate::store::KvStore;
use super::{Cursor, Diagnostic, Log};

/// What an append did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Cursor after every non-empty command took an index
    pub cursor: Cursor,

    /// Entries written successfully
    pub written: u64,

    /// Failed entry writes (their indices are still consumed)
    pub diagnostics: Vec<Diagnostic>,
}

/// Writes entries for one log
pub struct LogWriter<'a, S: KvStore + ?Sized> {
    store: &'a S,
    log: &'a Log,
}

impl<'a, S: KvStore + ?Sized> LogWriter<'a, S> {
    pub fn new(store: &'a S, log: &'a Log) -> Self {
        Self { store, log }
    }

    /// Append `commands` in order starting at index `start`
    ///
    /// Empty commands are skipped and take no index. A failed put is
    /// recorded but the index is never rolled back, so indices stay dense
    /// and monotonic. Fails with `CursorOverflow`, writing nothing, when
    /// the batch would move the cursor past `u64::MAX`.
    pub fn append<I, C>(&self, start: Cursor, commands: I) -> Result<AppendOutcome>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let commands: Vec<C> = commands
            .into_iter()
            .filter(|c| !c.as_ref().is_empty())
            .collect();
        let count = commands.len() as u64;

        let end = start
            .checked_advance(count)
            .ok_or_else(|| CmdLogError::CursorOverflow {
                key: self.log.count_key().to_string(),
                cursor: start.value(),
                count,
            })?;

        let mut written = 0;
        let mut diagnostics = Vec::new();

        for (index, command) in (start.value()..end.value()).zip(&commands) {
            let key = self.log.entry_key(index);
            match self.store.put(key.as_bytes(), command.as_ref().as_bytes()) {
                Ok(()) => written += 1,
                Err(e) => {
                    tracing::warn!("Entry write {} failed, index kept: {}", key, e);
                    diagnostics.push(Diagnostic::EntryWriteFailed {
                        index,
                        key,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(AppendOutcome {
            cursor: end,
            written,
            diagnostics,
        })
    }
}

//! Counter cursor
//!
//! The number of entries ever appended to a log, which is also the next
//! free index. Stored as decimal text under the log's count key.

use std::fmt;

use crate::error::{CmdLogError, Result};
use crate::store::KvStore;

/// Value object for a log's count
///
/// Loaded once at the start of a sync and stored once before the catch-up
/// phase; it is never shared between invocations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor(u64);

impl Cursor {
    pub const ZERO: Cursor = Cursor(0);

    pub fn new(value: u64) -> Self {
        Cursor(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Cursor moved forward by `count` entries, `None` past `u64::MAX`
    pub fn checked_advance(self, count: u64) -> Option<Self> {
        self.0.checked_add(count).map(Cursor)
    }

    /// Read the cursor stored under `count_key`
    ///
    /// Never fails: an absent key, a store error or unparsable text all
    /// read as zero.
    pub fn load<S: KvStore + ?Sized>(store: &S, count_key: &str) -> Self {
        match store.get(count_key.as_bytes()) {
            Ok(bytes) => match Self::parse(&bytes) {
                Some(cursor) => cursor,
                None => {
                    tracing::warn!(
                        "Unparsable cursor under {:?} ({:?}), treating as 0",
                        count_key,
                        String::from_utf8_lossy(&bytes)
                    );
                    Cursor::ZERO
                }
            },
            Err(CmdLogError::KeyNotFound(_)) => {
                tracing::debug!("No cursor under {:?}, starting at 0", count_key);
                Cursor::ZERO
            }
            Err(e) => {
                tracing::warn!("Cursor read for {:?} failed, treating as 0: {}", count_key, e);
                Cursor::ZERO
            }
        }
    }

    /// Write the cursor under `count_key`
    pub fn store<S: KvStore + ?Sized>(self, store: &S, count_key: &str) -> Result<()> {
        store.put(count_key.as_bytes(), self.0.to_string().as_bytes())
    }

    fn parse(bytes: &[u8]) -> Option<Self> {
        std::str::from_utf8(bytes).ok()?.parse().ok().map(Cursor)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Cursor {
    fn from(value: u64) -> Self {
        Cursor(value)
    }
}

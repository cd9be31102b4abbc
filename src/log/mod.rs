//! Log Module
//!
//! An append-only command log stored as individual keys in a `KvStore`.
//!
//! ## Key Layout
//! ```text
//! {count_key}              -> "C"        (decimal cursor, next free index)
//! {key_prefix}0            -> command 0
//! {key_prefix}1            -> command 1
//! ...
//! {key_prefix}{C-1}        -> command C-1
//! ```
//!
//! ## Responsibilities
//! - `Cursor`: load/store the count, absent or garbage reads as 0
//! - `LogWriter`: append commands under dense, monotonic indices
//! - `LogReader`: catch-up read from a position up to the cursor
//!
//! Entry writes and reads are best-effort: a failure is reported as a
//! `Diagnostic` and the index still advances.

mod cursor;
mod reader;
mod writer;

use std::fmt;

pub use cursor::Cursor;
pub use reader::{CatchupRead, LogReader};
pub use writer::{AppendOutcome, LogWriter};

/// Names a log inside the store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Log {
    count_key: String,
    key_prefix: String,
}

impl Log {
    pub fn new(count_key: impl Into<String>, key_prefix: impl Into<String>) -> Self {
        Self {
            count_key: count_key.into(),
            key_prefix: key_prefix.into(),
        }
    }

    /// Key holding the cursor
    pub fn count_key(&self) -> &str {
        &self.count_key
    }

    /// Prefix shared by every entry key
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Key of the entry at `index`: prefix followed by the decimal index
    pub fn entry_key(&self, index: u64) -> String {
        format!("{}{}", self.key_prefix, index)
    }
}

/// A best-effort step that did not go through
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Writing an entry failed; its index stays assigned
    EntryWriteFailed { index: u64, key: String, reason: String },

    /// Reading an entry failed with a store error
    EntryReadFailed { index: u64, key: String, reason: String },

    /// No entry exists at an index below the cursor
    EntryMissing { index: u64, key: String },
}

impl Diagnostic {
    /// Index the diagnostic refers to
    pub fn index(&self) -> u64 {
        match self {
            Diagnostic::EntryWriteFailed { index, .. }
            | Diagnostic::EntryReadFailed { index, .. }
            | Diagnostic::EntryMissing { index, .. } => *index,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::EntryWriteFailed { index, key, reason } => {
                write!(f, "write of entry {} ({}) failed: {}", index, key, reason)
            }
            Diagnostic::EntryReadFailed { index, key, reason } => {
                write!(f, "read of entry {} ({}) failed: {}", index, key, reason)
            }
            Diagnostic::EntryMissing { index, key } => {
                write!(f, "entry {} ({}) is missing", index, key)
            }
        }
    }
}

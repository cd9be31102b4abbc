//! Operation definitions
//!
//! Turns a named function plus its string arguments into a typed operation.

use std::fmt;

use crate::error::{CmdLogError, Result};
use crate::log::Log;

/// Which entry point an invocation came through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// State-changing entry point: init, write, append, sync
    Invoke,

    /// Read-only entry point: read
    Query,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Invoke => f.write_str("invoke"),
            OperationKind::Query => f.write_str("query"),
        }
    }
}

/// Arguments of a sync invocation, still in wire form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub log: Log,

    /// Caller's last known read position (decimal text)
    pub position: String,

    /// Batch envelope
    pub batch: String,
}

impl SyncRequest {
    pub fn new(
        count_key: impl Into<String>,
        key_prefix: impl Into<String>,
        position: impl Into<String>,
        batch: impl Into<String>,
    ) -> Self {
        Self {
            log: Log::new(count_key, key_prefix),
            position: position.into(),
            batch: batch.into(),
        }
    }
}

/// A parsed operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Store a value under the configured init key
    Init { value: String },

    /// Unconditional put
    Write { key: String, value: String },

    /// Get a value by key
    Read { key: String },

    /// Pipe-delimited append to a value
    Append { key: String, value: String },

    /// Append a batch to a log and catch up from a position
    Sync(SyncRequest),
}

impl Operation {
    /// Parse `function` with `args` for the given entry point
    pub fn parse(kind: OperationKind, function: &str, args: &[String]) -> Result<Self> {
        match (kind, function) {
            (OperationKind::Invoke, "init") => {
                let [value] = expect_args::<1>(function, args)?;
                Ok(Operation::Init { value })
            }
            (OperationKind::Invoke, "write") => {
                let [key, value] = expect_args::<2>(function, args)?;
                Ok(Operation::Write { key, value })
            }
            (OperationKind::Invoke, "append") => {
                let [key, value] = expect_args::<2>(function, args)?;
                Ok(Operation::Append { key, value })
            }
            (OperationKind::Invoke, "sync") => {
                let [count_key, key_prefix, position, batch] = expect_args::<4>(function, args)?;
                Ok(Operation::Sync(SyncRequest::new(
                    count_key, key_prefix, position, batch,
                )))
            }
            (OperationKind::Query, "read") => {
                let [key] = expect_args::<1>(function, args)?;
                Ok(Operation::Read { key })
            }
            _ => Err(CmdLogError::UnknownFunction {
                kind: kind.to_string(),
                function: function.to_string(),
            }),
        }
    }

    /// Function name on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Init { .. } => "init",
            Operation::Write { .. } => "write",
            Operation::Read { .. } => "read",
            Operation::Append { .. } => "append",
            Operation::Sync(_) => "sync",
        }
    }
}

/// Check arity and take exactly `N` arguments
fn expect_args<const N: usize>(function: &str, args: &[String]) -> Result<[String; N]> {
    let args: &[String; N] = args.try_into().map_err(|_| CmdLogError::Argument {
        operation: function.to_string(),
        expected: N,
        got: args.len(),
    })?;
    Ok(args.clone())
}

//! # cmdlog
//!
//! An append-only command log layered on a key-value store, with:
//! - Dense, monotonic entry indices under a stored cursor
//! - Resumable, offset-based sync (submit a batch, get everything since a position)
//! - One exclusive writer per log
//! - Pluggable store adapters (in-memory, durable record file)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Invocation (kind, function, args)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Engine                                │
//! │        (read / write / append / init / sync coordinator)     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼────────────┐
//!          │            │            │
//!          ▼            ▼            ▼
//!   ┌───────────┐ ┌───────────┐ ┌───────────┐
//!   │  Cursor   │ │ LogWriter │ │ LogReader │
//!   └─────┬─────┘ └─────┬─────┘ └─────┬─────┘
//!         └─────────────┼─────────────┘
//!                       ▼
//!                ┌─────────────┐
//!                │   KvStore   │
//!                └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod log;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CmdLogError, Result};
pub use config::Config;
pub use engine::{Engine, SyncOutcome};
pub use store::KvStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cmdlog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Protocol Module
//!
//! Defines the invocation surface and the sync envelopes.
//!
//! ## Operations
//! | kind   | function | args                                    |
//! |--------|----------|-----------------------------------------|
//! | invoke | init     | value                                   |
//! | invoke | write    | key, value                              |
//! | invoke | append   | key, value                              |
//! | invoke | sync     | count_key, key_prefix, position, batch  |
//! | query  | read     | key                                     |
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: NOT_FOUND
//! - 0x02: ERROR

mod codec;
mod command;
mod response;

pub use codec::{
    parse_position, Batch, SyncResult, BATCH_SUFFIX, COMMANDS_PREFIX, COMMAND_DELIMITER,
    POSITION_MARKER, RESULT_SUFFIX,
};
pub use command::{Operation, OperationKind, SyncRequest};
pub use response::{ErrorPayload, Response, Status};

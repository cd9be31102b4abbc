//! Envelope codec
//!
//! Encoding and decoding of the textual sync envelopes. Nothing outside this
//! file touches the raw wire text.
//!
//! ## Wire Format
//!
//! ### Request (Batch)
//! ```text
//! {commands:[c0,c1,...,cN],end:42}
//! ```
//!
//! ### Response (SyncResult)
//! ```text
//! {commands:[e0,e1,...,eM],position:<cursor>}
//! ```
//!
//! Commands are joined with `,` and never escaped, so a command cannot
//! itself contain a comma.

use crate::config::EnvelopeMode;
use crate::error::{CmdLogError, Result};
use crate::log::Cursor;

/// Opening token shared by both envelopes
pub const COMMANDS_PREFIX: &str = "{commands:[";

/// Closing token of a request envelope
pub const BATCH_SUFFIX: &str = "],end:42}";

/// Separator between the entries and the cursor in a response envelope
pub const POSITION_MARKER: &str = "],position:";

/// Closing token of a response envelope
pub const RESULT_SUFFIX: &str = "}";

/// Delimiter between commands
pub const COMMAND_DELIMITER: char = ',';

// =============================================================================
// Batch (request)
// =============================================================================

/// Commands submitted by one sync request
///
/// Holds every token the envelope split into, empty ones included; empty
/// tokens are delimiters only and are never written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    commands: Vec<String>,
}

impl Batch {
    pub fn new<I, C>(commands: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
        }
    }

    /// Decode a request envelope
    ///
    /// Lenient mode removes the first occurrence of each wrapper token,
    /// wherever it is, and splits the remainder unconditionally. Strict mode
    /// requires the payload to start and end with the tokens.
    pub fn decode(payload: &str, mode: EnvelopeMode) -> Result<Self> {
        let inner = match mode {
            EnvelopeMode::Lenient => payload
                .replacen(COMMANDS_PREFIX, "", 1)
                .replacen(BATCH_SUFFIX, "", 1),
            EnvelopeMode::Strict => {
                let inner = payload
                    .strip_prefix(COMMANDS_PREFIX)
                    .and_then(|rest| rest.strip_suffix(BATCH_SUFFIX))
                    .ok_or_else(|| {
                        CmdLogError::Decode(format!(
                            "batch must be wrapped in {}...{}, got {:?}",
                            COMMANDS_PREFIX, BATCH_SUFFIX, payload
                        ))
                    })?;
                inner.to_string()
            }
        };

        Ok(Self {
            commands: inner.split(COMMAND_DELIMITER).map(str::to_string).collect(),
        })
    }

    /// Encode as a request envelope
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}",
            COMMANDS_PREFIX,
            self.commands.join(","),
            BATCH_SUFFIX
        )
    }

    /// Every decoded token, empty ones included
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Tokens that become entries
    pub fn non_empty(&self) -> impl Iterator<Item = &str> {
        self.commands
            .iter()
            .map(String::as_str)
            .filter(|c| !c.is_empty())
    }

    /// True when no token would be written
    pub fn is_empty(&self) -> bool {
        self.non_empty().next().is_none()
    }
}

// =============================================================================
// SyncResult (response)
// =============================================================================

/// Entries from the requested position onward plus the new cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub commands: Vec<String>,
    pub position: Cursor,
}

impl SyncResult {
    pub fn new(commands: Vec<String>, position: Cursor) -> Self {
        Self { commands, position }
    }

    /// Encode as a response envelope
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}{}{}",
            COMMANDS_PREFIX,
            self.commands.join(","),
            POSITION_MARKER,
            self.position,
            RESULT_SUFFIX
        )
    }

    /// Decode a response envelope (client side)
    pub fn decode(payload: &str) -> Result<Self> {
        let body = payload
            .strip_prefix(COMMANDS_PREFIX)
            .and_then(|rest| rest.strip_suffix(RESULT_SUFFIX))
            .ok_or_else(|| {
                CmdLogError::Decode(format!("not a sync response envelope: {:?}", payload))
            })?;

        let (entries, position) = body.rsplit_once(POSITION_MARKER).ok_or_else(|| {
            CmdLogError::Decode(format!("sync response has no position: {:?}", payload))
        })?;

        let position = position.parse::<u64>().map_err(|e| {
            CmdLogError::Decode(format!("bad position {:?}: {}", position, e))
        })?;

        let commands = if entries.is_empty() {
            Vec::new()
        } else {
            entries.split(COMMAND_DELIMITER).map(str::to_string).collect()
        };

        Ok(Self {
            commands,
            position: Cursor::new(position),
        })
    }
}

// =============================================================================
// Position
// =============================================================================

/// Parse a caller-supplied read position
///
/// Anything that is not an unsigned decimal (negative, empty, garbage,
/// overflow) reads as 0.
pub fn parse_position(text: &str) -> u64 {
    text.parse::<u64>().unwrap_or(0)
}

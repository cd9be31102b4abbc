//! Response definitions
//!
//! What the invocation surface hands back to a caller.

use serde::{Deserialize, Serialize};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Error = 0x02,
}

/// A response to an invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (value for read, envelope for sync, error text otherwise)
    pub payload: Option<Vec<u8>>,
}

/// Structured error body returned by a failed read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(rename = "Error")]
    pub error: String,
}

impl ErrorPayload {
    /// Body for a read that could not get `key`
    pub fn read_failed(key: &str) -> Self {
        Self {
            error: format!("Failed to get state for {}", key),
        }
    }

    pub fn to_json(&self) -> Vec<u8> {
        // A struct of one String field cannot fail to serialize.
        serde_json::to_vec(self).unwrap_or_default()
    }
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create a NOT_FOUND response for a read of `key`
    pub fn not_found(key: &str) -> Self {
        Self {
            status: Status::NotFound,
            payload: Some(ErrorPayload::read_failed(key).to_json()),
        }
    }

    /// Create an ERROR response for a read of `key` that hit a store failure
    pub fn read_error(key: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(ErrorPayload::read_failed(key).to_json()),
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Payload as text (lossy)
    pub fn payload_str(&self) -> Option<String> {
        self.payload
            .as_ref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
    }
}

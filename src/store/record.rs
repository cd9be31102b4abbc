//! Store record definitions
//!
//! Defines the structure of individual records in the store file.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{CmdLogError, Result};

/// Header size: seq (8) + crc (4) + len (4)
pub const RECORD_HEADER_SIZE: usize = 16;

/// Maximum encoded payload size (16 MB)
pub const MAX_RECORD_SIZE: u32 = 16 * 1024 * 1024;

/// A single put in the store file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRecord {
    /// Sequence number - monotonically increasing per file
    pub seq: u64,

    pub key: Vec<u8>,

    pub value: Vec<u8>,

    /// Timestamp (unix millis) when the record was created
    pub timestamp: u64,
}

/// Parsed fixed-size record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RecordHeader {
    pub seq: u64,
    pub crc: u32,
    pub len: u32,
}

impl RecordHeader {
    pub fn parse(bytes: &[u8; RECORD_HEADER_SIZE]) -> Self {
        let mut seq = [0u8; 8];
        seq.copy_from_slice(&bytes[0..8]);
        let mut crc = [0u8; 4];
        crc.copy_from_slice(&bytes[8..12]);
        let mut len = [0u8; 4];
        len.copy_from_slice(&bytes[12..16]);

        Self {
            seq: u64::from_le_bytes(seq),
            crc: u32::from_le_bytes(crc),
            len: u32::from_le_bytes(len),
        }
    }
}

impl StoreRecord {
    pub fn new(seq: u64, key: Vec<u8>, value: Vec<u8>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            seq,
            key,
            value,
            timestamp,
        }
    }

    /// Encode header + bincode payload
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload =
            bincode::serialize(self).map_err(|e| CmdLogError::Serialization(e.to_string()))?;

        if payload.len() > MAX_RECORD_SIZE as usize {
            return Err(CmdLogError::Serialization(format!(
                "Record too large: {} bytes (max {})",
                payload.len(),
                MAX_RECORD_SIZE
            )));
        }

        let crc = crc32fast::hash(&payload);

        let mut bytes = Vec::with_capacity(RECORD_HEADER_SIZE + payload.len());
        bytes.extend_from_slice(&self.seq.to_le_bytes());
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Verify and decode a payload read after `header`
    pub(crate) fn decode(header: &RecordHeader, payload: &[u8]) -> Result<Self> {
        let actual = crc32fast::hash(payload);
        if actual != header.crc {
            return Err(CmdLogError::StoreCorruption(format!(
                "CRC mismatch for record {}: expected {:08x}, got {:08x}",
                header.seq, header.crc, actual
            )));
        }

        let record: StoreRecord = bincode::deserialize(payload)
            .map_err(|e| CmdLogError::Serialization(e.to_string()))?;

        if record.seq != header.seq {
            return Err(CmdLogError::StoreCorruption(format!(
                "Sequence mismatch: header says {}, payload says {}",
                header.seq, record.seq
            )));
        }

        Ok(record)
    }
}

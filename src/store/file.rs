//! Durable file store
//!
//! Every put is appended to a single record file and mirrored in an
//! in-memory index. On open the file is replayed; a torn tail or a corrupted
//! record ends the replay and the file is truncated at the last good record.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

use crate::config::StoreSyncStrategy;
use crate::error::{CmdLogError, Result};
use super::record::{RecordHeader, MAX_RECORD_SIZE};
use super::{KvStore, StoreRecord, RECORD_HEADER_SIZE};

/// Result of replaying the record file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Number of records successfully replayed
    pub records_recovered: u64,

    /// Number of records rejected (bad CRC, bad payload, bad length)
    pub records_corrupted: u64,

    /// Last valid sequence number (0 for an empty file)
    pub last_seq: u64,

    /// Whether trailing bytes were cut off the file
    pub was_truncated: bool,
}

/// File operations the record writer needs beyond `Write + Seek`
pub(crate) trait RecordFile: Write + Seek + Send {
    fn set_len(&mut self, len: u64) -> io::Result<()>;
    fn sync_data(&mut self) -> io::Result<()>;
}

impl RecordFile for File {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }

    fn sync_data(&mut self) -> io::Result<()> {
        File::sync_data(self)
    }
}

/// Appends records and tracks fsync debt
///
/// `end` is the length of the valid record prefix. A failed append cuts the
/// file back to `end`; if that cut fails too the writer is poisoned and
/// refuses further appends, since the file tail is unknown.
struct RecordWriter<F: RecordFile = File> {
    file: F,
    end: u64,
    next_seq: u64,
    sync_strategy: StoreSyncStrategy,
    unsynced: usize,
    poisoned: bool,
}

impl<F: RecordFile> RecordWriter<F> {
    fn new(file: F, end: u64, next_seq: u64, sync_strategy: StoreSyncStrategy) -> Self {
        Self {
            file,
            end,
            next_seq,
            sync_strategy,
            unsynced: 0,
            poisoned: false,
        }
    }

    /// Append one record; on error the file is left as it was before the call
    fn append(&mut self, record: &StoreRecord) -> Result<()> {
        if self.poisoned {
            return Err(CmdLogError::Store(
                "record file is poisoned after a failed rollback".to_string(),
            ));
        }

        let bytes = record.encode()?;
        if let Err(e) = self.write_record(&bytes) {
            self.rollback();
            return Err(e);
        }

        self.end += bytes.len() as u64;
        self.next_seq += 1;
        Ok(())
    }

    fn write_record(&mut self, bytes: &[u8]) -> Result<()> {
        self.file.write_all(bytes)?;
        self.file.flush()?;
        self.unsynced += 1;

        match self.sync_strategy {
            StoreSyncStrategy::EveryWrite => self.sync()?,
            StoreSyncStrategy::EveryNEntries { count } => {
                if self.unsynced >= count {
                    self.sync()?;
                }
            }
        }

        Ok(())
    }

    /// Cut the file back to the last acknowledged record
    fn rollback(&mut self) {
        let end = self.end;
        let result = self
            .file
            .set_len(end)
            .and_then(|()| self.file.seek(SeekFrom::Start(end)))
            .and_then(|_| self.file.sync_data());

        match result {
            Ok(()) => tracing::warn!("Rolled record file back to {} bytes", end),
            Err(e) => {
                tracing::error!("Rollback to {} bytes failed, poisoning writer: {}", end, e);
                self.poisoned = true;
            }
        }
    }

    fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        self.unsynced = 0;
        Ok(())
    }
}

/// Key-value store persisted to `{dir}/store.log`
///
/// ## Concurrency:
/// - `index`: RwLock (many concurrent readers, exclusive writer)
/// - `writer`: Mutex, held across the append AND the index update so the
///   index never runs ahead of the file
pub struct FileStore {
    path: PathBuf,
    index: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
    writer: Mutex<RecordWriter>,
    recovery: RecoveryReport,
}

impl FileStore {
    pub const FILENAME: &'static str = "store.log";

    /// Open or create the store inside `dir`
    ///
    /// On startup:
    /// 1. Create the directory if needed
    /// 2. Replay every valid record into the index
    /// 3. Truncate anything after the last valid record
    /// 4. Position the writer at the end of the file
    pub fn open(dir: &Path, sync_strategy: StoreSyncStrategy) -> Result<Self> {
        if let StoreSyncStrategy::EveryNEntries { count: 0 } = sync_strategy {
            return Err(CmdLogError::Config(
                "EveryNEntries sync strategy needs a count above zero".to_string(),
            ));
        }

        fs::create_dir_all(dir)?;
        let path = dir.join(Self::FILENAME);

        let (index, mut recovery, valid_len) = Self::replay(&path)?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)?;

        let file_len = file.metadata()?.len();
        if file_len > valid_len {
            tracing::warn!(
                "Truncating {} from {} to {} bytes",
                path.display(),
                file_len,
                valid_len
            );
            file.set_len(valid_len)?;
            file.sync_all()?;
            recovery.was_truncated = true;
        }
        file.seek(SeekFrom::Start(valid_len))?;

        if recovery.records_recovered > 0 || recovery.records_corrupted > 0 {
            tracing::info!(
                "Store recovery: {} records recovered, {} corrupted, last_seq={}",
                recovery.records_recovered,
                recovery.records_corrupted,
                recovery.last_seq
            );
        }

        let writer = RecordWriter::new(file, valid_len, recovery.last_seq + 1, sync_strategy);

        Ok(Self {
            path,
            index: RwLock::new(index),
            writer: Mutex::new(writer),
            recovery,
        })
    }

    /// Read records until the first torn or corrupted one
    ///
    /// Returns the index, the report and the byte length of the valid prefix.
    fn replay(path: &Path) -> Result<(HashMap<Vec<u8>, Vec<u8>>, RecoveryReport, u64)> {
        let mut index = HashMap::new();
        let mut report = RecoveryReport::default();
        let mut valid_len = 0u64;

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok((index, report, 0)),
            Err(e) => return Err(e.into()),
        };
        let mut reader = BufReader::new(file);

        loop {
            let mut header_bytes = [0u8; RECORD_HEADER_SIZE];
            match reader.read_exact(&mut header_bytes) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }

            let header = RecordHeader::parse(&header_bytes);
            if header.len > MAX_RECORD_SIZE {
                tracing::warn!(
                    "Record {} claims {} bytes (max {}), stopping replay",
                    header.seq,
                    header.len,
                    MAX_RECORD_SIZE
                );
                report.records_corrupted += 1;
                break;
            }

            let mut payload = vec![0u8; header.len as usize];
            match reader.read_exact(&mut payload) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }

            match StoreRecord::decode(&header, &payload) {
                Ok(record) => {
                    report.last_seq = record.seq;
                    report.records_recovered += 1;
                    index.insert(record.key, record.value);
                    valid_len += (RECORD_HEADER_SIZE + payload.len()) as u64;
                }
                Err(e) => {
                    tracing::warn!("Stopping replay at offset {}: {}", valid_len, e);
                    report.records_corrupted += 1;
                    break;
                }
            }
        }

        Ok((index, report, valid_len))
    }

    /// Force written records to disk
    pub fn sync(&self) -> Result<()> {
        self.writer.lock().sync()
    }

    /// Path of the record file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// What the last open recovered
    pub fn recovery_report(&self) -> &RecoveryReport {
        &self.recovery
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.index
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| CmdLogError::key_not_found(key))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock();
        let record = StoreRecord::new(writer.next_seq, key.to_vec(), value.to_vec());

        writer.append(&record).map_err(|e| match e {
            CmdLogError::Io(io) => CmdLogError::Store(format!(
                "append to {} failed: {}",
                self.path().display(),
                io
            )),
            other => other,
        })?;

        self.index.write().insert(record.key, record.value);
        Ok(())
    }
}

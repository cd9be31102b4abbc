//! Tests for store adapters
//!
//! These tests verify:
//! - MemoryStore get/put semantics
//! - FileStore persistence across reopen
//! - FileStore recovery from torn tails and corrupted records
//! - Sync strategy validation

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;
use std::thread;

use cmdlog::config::StoreSyncStrategy;
use cmdlog::store::{FileStore, MemoryStore, StoreRecord, RECORD_HEADER_SIZE};
use cmdlog::{CmdLogError, KvStore};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn open_store(dir: &TempDir) -> FileStore {
    FileStore::open(dir.path(), StoreSyncStrategy::EveryWrite).unwrap()
}

// =============================================================================
// MemoryStore Tests
// =============================================================================

#[test]
fn test_memory_put_get() {
    let store = MemoryStore::new();
    store.put(b"hello", b"world").unwrap();

    assert_eq!(store.get(b"hello").unwrap(), b"world");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_memory_get_missing_is_not_found() {
    let store = MemoryStore::new();
    let err = store.get(b"nope").unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(err, CmdLogError::KeyNotFound(ref k) if k == "nope"));
}

#[test]
fn test_memory_put_overwrites() {
    let store = MemoryStore::new();
    store.put(b"key", b"v1").unwrap();
    store.put(b"key", b"v2").unwrap();

    assert_eq!(store.get(b"key").unwrap(), b"v2");
    assert_eq!(store.keys(), vec![b"key".to_vec()]);
}

#[test]
fn test_memory_through_arc() {
    let store = Arc::new(MemoryStore::new());
    let shared: Arc<MemoryStore> = Arc::clone(&store);

    shared.put(b"k", b"v").unwrap();
    assert_eq!(KvStore::get(&store, b"k").unwrap(), b"v");
}

#[test]
fn test_memory_concurrent_writes() {
    let store = Arc::new(MemoryStore::new());

    let mut handles = vec![];
    for i in 0..8 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for j in 0..25 {
                let key = format!("key{}_{}", i, j);
                store.put(key.as_bytes(), b"v").unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 200);
}

// =============================================================================
// FileStore Tests
// =============================================================================

#[test]
fn test_file_open_creates_file() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("nested").join("data");

    let store = FileStore::open(&data_dir, StoreSyncStrategy::EveryWrite).unwrap();

    assert!(data_dir.join(FileStore::FILENAME).exists());
    assert!(store.is_empty());
    assert_eq!(store.recovery_report().records_recovered, 0);
}

#[test]
fn test_file_put_get() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    store.put(b"a", b"1").unwrap();
    store.put(b"b", b"2").unwrap();

    assert_eq!(store.get(b"a").unwrap(), b"1");
    assert_eq!(store.get(b"b").unwrap(), b"2");
    assert!(store.get(b"c").unwrap_err().is_not_found());
}

#[test]
fn test_file_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = open_store(&temp_dir);
        store.put(b"key", b"v1").unwrap();
        store.put(b"other", b"x").unwrap();
        store.put(b"key", b"v2").unwrap();
    }

    let store = open_store(&temp_dir);
    assert_eq!(store.get(b"key").unwrap(), b"v2");
    assert_eq!(store.get(b"other").unwrap(), b"x");
    assert_eq!(store.len(), 2);

    let report = store.recovery_report();
    assert_eq!(report.records_recovered, 3);
    assert_eq!(report.records_corrupted, 0);
    assert_eq!(report.last_seq, 3);
    assert!(!report.was_truncated);
}

#[test]
fn test_file_sequence_continues_after_reopen() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = open_store(&temp_dir);
        store.put(b"a", b"1").unwrap();
    }
    {
        let store = open_store(&temp_dir);
        store.put(b"b", b"2").unwrap();
    }

    let store = open_store(&temp_dir);
    assert_eq!(store.recovery_report().last_seq, 2);
    assert_eq!(store.get(b"a").unwrap(), b"1");
    assert_eq!(store.get(b"b").unwrap(), b"2");
}

#[test]
fn test_file_batched_sync_strategy() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = FileStore::open(
            temp_dir.path(),
            StoreSyncStrategy::EveryNEntries { count: 10 },
        )
        .unwrap();
        for i in 0..25 {
            store.put(format!("k{}", i).as_bytes(), b"v").unwrap();
        }
        store.sync().unwrap();
    }

    let store = open_store(&temp_dir);
    assert_eq!(store.len(), 25);
}

#[test]
fn test_file_rejects_zero_batch() {
    let temp_dir = TempDir::new().unwrap();
    let result = FileStore::open(temp_dir.path(), StoreSyncStrategy::EveryNEntries { count: 0 });

    assert!(matches!(result, Err(CmdLogError::Config(_))));
}

#[test]
fn test_file_truncates_torn_tail() {
    let temp_dir = TempDir::new().unwrap();
    let path;

    {
        let store = open_store(&temp_dir);
        store.put(b"a", b"1").unwrap();
        store.put(b"b", b"2").unwrap();
        path = store.path().to_path_buf();
    }
    let good_len = std::fs::metadata(&path).unwrap().len();

    // Half of a third record
    let torn = StoreRecord::new(3, b"c".to_vec(), b"3".to_vec()).encode().unwrap();
    {
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&torn[..torn.len() / 2]).unwrap();
    }

    let store = open_store(&temp_dir);
    let report = store.recovery_report();
    assert_eq!(report.records_recovered, 2);
    assert!(report.was_truncated);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), good_len);
    assert!(store.get(b"c").unwrap_err().is_not_found());

    // Writes after recovery land on a clean boundary
    store.put(b"d", b"4").unwrap();
    drop(store);

    let store = open_store(&temp_dir);
    assert_eq!(store.get(b"d").unwrap(), b"4");
    assert_eq!(store.recovery_report().records_recovered, 3);
}

#[test]
fn test_file_stops_at_corrupted_record() {
    let temp_dir = TempDir::new().unwrap();
    let path;

    {
        let store = open_store(&temp_dir);
        store.put(b"a", b"1").unwrap();
        store.put(b"b", b"2").unwrap();
        store.put(b"c", b"3").unwrap();
        path = store.path().to_path_buf();
    }

    // Flip a payload byte of the second record
    let mut bytes = std::fs::read(&path).unwrap();
    let first_len = StoreRecord::new(1, b"a".to_vec(), b"1".to_vec())
        .encode()
        .unwrap()
        .len();
    bytes[first_len + RECORD_HEADER_SIZE] ^= 0xFF;
    std::fs::write(&path, &bytes).unwrap();

    let store = open_store(&temp_dir);
    let report = store.recovery_report();
    assert_eq!(report.records_recovered, 1);
    assert_eq!(report.records_corrupted, 1);
    assert!(report.was_truncated);
    assert_eq!(store.get(b"a").unwrap(), b"1");
    assert!(store.get(b"b").unwrap_err().is_not_found());
    assert!(store.get(b"c").unwrap_err().is_not_found());
    assert_eq!(std::fs::metadata(&path).unwrap().len(), first_len as u64);
}

#[test]
fn test_file_binary_keys_and_values() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = open_store(&temp_dir);
        store.put(b"\x00\x01\xFF", b"\xFF\x00\xAB").unwrap();
        store.put(b"", b"empty key").unwrap();
    }

    let store = open_store(&temp_dir);
    assert_eq!(store.get(b"\x00\x01\xFF").unwrap(), b"\xFF\x00\xAB");
    assert_eq!(store.get(b"").unwrap(), b"empty key");
}

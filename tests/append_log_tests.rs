//! Tests for the append log file
//!
//! These tests verify:
//! - Offsets returned by append
//! - Positional reads and the end-of-log signal
//! - Reopening an existing log
//! - Sync strategies and truncation
//! - Offset bookkeeping after a failed append

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use diskdb::config::SyncStrategy;
use diskdb::log::{AppendLog, Record};
use diskdb::DbError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("test.data");
    (temp_dir, log_path)
}

fn append_raw(path: &PathBuf, bytes: &[u8]) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(bytes).unwrap();
    file.sync_all().unwrap();
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_empty_file() {
    let (_temp, path) = setup_temp_log();

    let log = AppendLog::open_or_create(&path, SyncStrategy::Never).unwrap();

    assert!(path.exists());
    assert_eq!(log.write_offset(), 0);
    assert_eq!(log.path(), path.as_path());
}

#[test]
fn test_open_missing_parent_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("no_such_dir").join("test.data");

    let result = AppendLog::open_or_create(&path, SyncStrategy::Never);

    assert!(matches!(result, Err(DbError::Io(_))));
}

#[test]
fn test_reopen_starts_at_file_length() {
    let (_temp, path) = setup_temp_log();

    let end = {
        let mut log = AppendLog::open_or_create(&path, SyncStrategy::EveryWrite).unwrap();
        log.append(&Record::put(b"a".to_vec(), b"1".to_vec())).unwrap();
        log.append(&Record::put(b"b".to_vec(), b"2".to_vec())).unwrap();
        log.write_offset()
    };

    let log = AppendLog::open_or_create(&path, SyncStrategy::Never).unwrap();

    assert_eq!(log.write_offset(), end);
    assert_eq!(fs::metadata(&path).unwrap().len(), end);
}

// =============================================================================
// Append Tests
// =============================================================================

#[test]
fn test_append_returns_start_offsets() {
    let (_temp, path) = setup_temp_log();
    let mut log = AppendLog::open_or_create(&path, SyncStrategy::Never).unwrap();

    let first = Record::put(b"key1".to_vec(), b"value1".to_vec());
    let second = Record::delete(b"key1".to_vec());

    let off1 = log.append(&first).unwrap();
    let off2 = log.append(&second).unwrap();

    assert_eq!(off1, 0);
    assert_eq!(off2, first.encoded_size());
    assert_eq!(log.write_offset(), first.encoded_size() + second.encoded_size());
}

#[test]
fn test_append_grows_file() {
    let (_temp, path) = setup_temp_log();
    let mut log = AppendLog::open_or_create(&path, SyncStrategy::Never).unwrap();

    for i in 0..50 {
        log.append(&Record::put(format!("key{}", i).into_bytes(), vec![1u8; i]))
            .unwrap();
    }

    assert_eq!(fs::metadata(&path).unwrap().len(), log.write_offset());
}

#[test]
fn test_append_continues_after_reopen() {
    let (_temp, path) = setup_temp_log();

    {
        let mut log = AppendLog::open_or_create(&path, SyncStrategy::Never).unwrap();
        log.append(&Record::put(b"old".to_vec(), b"1".to_vec())).unwrap();
    }

    let mut log = AppendLog::open_or_create(&path, SyncStrategy::Never).unwrap();
    let start = log.write_offset();
    let offset = log.append(&Record::put(b"new".to_vec(), b"2".to_vec())).unwrap();

    assert_eq!(offset, start);
    let (old, _) = log.read_at(0).unwrap();
    assert_eq!(old.key(), b"old");
    let (new, _) = log.read_at(offset).unwrap();
    assert_eq!(new.key(), b"new");
}

#[test]
fn test_sync_strategies_write_the_same_bytes() {
    let strategies = [
        SyncStrategy::Never,
        SyncStrategy::EveryWrite,
        SyncStrategy::EveryNEntries { count: 3 },
    ];

    for strategy in strategies {
        let (_temp, path) = setup_temp_log();
        let mut log = AppendLog::open_or_create(&path, strategy).unwrap();

        for i in 0..10 {
            log.append(&Record::put(format!("k{}", i).into_bytes(), b"v".to_vec()))
                .unwrap();
        }
        log.sync().unwrap();

        let expected: u64 = (0..10)
            .map(|i| Record::put(format!("k{}", i).into_bytes(), b"v".to_vec()).encoded_size())
            .sum();
        assert_eq!(fs::metadata(&path).unwrap().len(), expected);
    }
}

// =============================================================================
// Read Tests
// =============================================================================

#[test]
fn test_read_at_each_offset() {
    let (_temp, path) = setup_temp_log();
    let mut log = AppendLog::open_or_create(&path, SyncStrategy::Never).unwrap();

    let records = vec![
        Record::put(b"a".to_vec(), b"alpha".to_vec()),
        Record::put(b"b".to_vec(), vec![]),
        Record::delete(b"a".to_vec()),
    ];
    let offsets: Vec<u64> = records.iter().map(|r| log.append(r).unwrap()).collect();

    for (record, offset) in records.iter().zip(offsets) {
        let (read, size) = log.read_at(offset).unwrap();
        assert_eq!(&read, record);
        assert_eq!(size, record.encoded_size());
    }
}

#[test]
fn test_read_at_end_is_end_of_log() {
    let (_temp, path) = setup_temp_log();
    let mut log = AppendLog::open_or_create(&path, SyncStrategy::Never).unwrap();
    log.append(&Record::put(b"k".to_vec(), b"v".to_vec())).unwrap();

    let end = log.write_offset();

    assert!(matches!(log.read_at(end), Err(DbError::EndOfLog(o)) if o == end));
    assert!(log.read_at(end + 100).unwrap_err().is_end_of_log());
}

#[test]
fn test_read_empty_log_is_end_of_log() {
    let (_temp, path) = setup_temp_log();
    let log = AppendLog::open_or_create(&path, SyncStrategy::Never).unwrap();

    assert!(log.read_at(0).unwrap_err().is_end_of_log());
}

#[test]
fn test_read_misaligned_offset_is_corruption() {
    let (_temp, path) = setup_temp_log();
    let mut log = AppendLog::open_or_create(&path, SyncStrategy::Never).unwrap();
    log.append(&Record::put(b"key".to_vec(), b"value".to_vec())).unwrap();

    // Offset 1 reads a mark of 0x006b ('k'), which is not a valid mark
    let err = log.read_at(1).unwrap_err();

    assert!(matches!(err, DbError::Corruption { offset: 1, .. }));
}

#[test]
fn test_read_partial_trailing_record_is_truncated() {
    let (_temp, path) = setup_temp_log();

    let good = Record::put(b"good".to_vec(), b"1".to_vec());
    {
        let mut log = AppendLog::open_or_create(&path, SyncStrategy::Never).unwrap();
        log.append(&good).unwrap();
    }
    let partial = Record::put(b"partial".to_vec(), b"value".to_vec()).encode().unwrap();
    append_raw(&path, &partial[..partial.len() - 3]);

    let log = AppendLog::open_or_create(&path, SyncStrategy::Never).unwrap();

    assert!(log.read_at(0).is_ok());
    let err = log.read_at(good.encoded_size()).unwrap_err();
    assert!(err.is_truncated());
}

#[test]
fn test_read_partial_trailing_header_is_truncated() {
    let (_temp, path) = setup_temp_log();
    fs::write(&path, [0u8, 0, 0, 1]).unwrap();

    let log = AppendLog::open_or_create(&path, SyncStrategy::Never).unwrap();

    assert!(matches!(
        log.read_at(0),
        Err(DbError::TruncatedRecord {
            offset: 0,
            available: 4,
            ..
        })
    ));
}

// =============================================================================
// Truncate Tests
// =============================================================================

#[test]
fn test_truncate_resets_write_offset() {
    let (_temp, path) = setup_temp_log();
    let mut log = AppendLog::open_or_create(&path, SyncStrategy::Never).unwrap();

    let first = Record::put(b"keep".to_vec(), b"1".to_vec());
    log.append(&first).unwrap();
    log.append(&Record::put(b"drop".to_vec(), b"2".to_vec())).unwrap();

    log.truncate(first.encoded_size()).unwrap();

    assert_eq!(log.write_offset(), first.encoded_size());
    assert_eq!(fs::metadata(&path).unwrap().len(), first.encoded_size());
    assert!(log.read_at(first.encoded_size()).unwrap_err().is_end_of_log());

    let offset = log.append(&Record::put(b"next".to_vec(), b"3".to_vec())).unwrap();
    assert_eq!(offset, first.encoded_size());
}

// =============================================================================
// Failed Append Tests
// =============================================================================

#[test]
fn test_refresh_write_offset_tracks_torn_bytes() {
    let (_temp, path) = setup_temp_log();
    let mut log = AppendLog::open_or_create(&path, SyncStrategy::Never).unwrap();
    let first = Record::put(b"a".to_vec(), b"1".to_vec());
    log.append(&first).unwrap();

    // Bytes left behind by a write that could not be rolled back
    append_raw(&path, &[0, 0, 0, 9, 0]);

    let len = log.refresh_write_offset().unwrap();
    assert_eq!(len, first.encoded_size() + 5);
    assert_eq!(log.write_offset(), fs::metadata(&path).unwrap().len());

    let second = Record::put(b"b".to_vec(), b"2".to_vec());
    let offset = log.append(&second).unwrap();

    assert_eq!(offset, len);
    let (read, _) = log.read_at(offset).unwrap();
    assert_eq!(read, second);
}

#[cfg(target_os = "linux")]
#[test]
fn test_failed_append_keeps_write_offset() {
    if !std::path::Path::new("/dev/full").exists() {
        return;
    }
    let (_temp, path) = setup_temp_log();
    std::os::unix::fs::symlink("/dev/full", &path).unwrap();

    let mut log = AppendLog::open_or_create(&path, SyncStrategy::Never).unwrap();
    let record = Record::put(b"k".to_vec(), b"v".to_vec());

    // /dev/full rejects writes and cannot be truncated either
    assert!(matches!(log.append(&record), Err(DbError::Io(_))));
    assert_eq!(log.write_offset(), 0);
    assert!(!log.is_poisoned());

    assert!(matches!(log.append(&record), Err(DbError::Io(_))));
    assert_eq!(log.write_offset(), 0);
}

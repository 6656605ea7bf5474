//! Store Module
//!
//! The public entry point. Composes the append log and the key index.
//!
//! ## Responsibilities
//! - Create the data directory and log file on open
//! - Rebuild the index from the log before serving requests
//! - Put / Get / Delete under a single reader-writer lock

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::config::Config;
use crate::error::{DbError, Result};
use crate::index::KeyIndex;
use crate::log::{AppendLog, Record, Recovery, RecoveryResult};

/// An embedded key-value store over one append-only log file
///
/// ## Concurrency Model
///
/// One `RwLock` guards the index and the log's write path together.
///
/// - **Reads** (get): shared lock. Any number run at once; the log is read
///   with positional reads so readers never share a file cursor.
/// - **Writes** (put/delete/sync): exclusive lock, held across the append
///   and the index update. Log order is the order writers took the lock.
///
/// Empty keys are ignored by every operation.
pub struct Store {
    /// Store configuration
    config: Config,

    /// Log and index, guarded as one unit
    inner: RwLock<Inner>,

    /// Outcome of the scan run at open
    recovery: RecoveryResult,
}

struct Inner {
    log: AppendLog,
    index: KeyIndex,
}

impl Store {
    /// Open or create a store in `path` with default settings
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::builder().data_dir(path.as_ref()).build();
        Self::open_with_config(config)
    }

    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Create the data directory if it doesn't exist
    /// 2. Open or create the log file
    /// 3. Replay the log to rebuild the index
    pub fn open_with_config(config: Config) -> Result<Self> {
        config.validate()?;

        // Step 1: Create data directory if missing
        fs::create_dir_all(&config.data_dir)?;

        // Step 2: Open the log
        let mut log = AppendLog::open_or_create(&config.log_path(), config.sync_strategy)?;

        // Step 3: Rebuild the index
        let (index, recovery) = Recovery::rebuild(&mut log, config.recovery_mode)?;

        tracing::info!(
            "Opened store at {} ({} live keys, log size {} bytes)",
            config.data_dir.display(),
            index.len(),
            log.write_offset()
        );

        Ok(Self {
            config,
            inner: RwLock::new(Inner { log, index }),
            recovery,
        })
    }

    /// Set `key` to `value`, replacing any previous value
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Ok(());
        }

        let record = Record::put(key.to_vec(), value.to_vec());

        let mut inner = self.inner.write();
        let offset = inner.log.append(&record)?;
        inner.index.insert(record.into_key(), offset);

        tracing::debug!(
            "put key_len={} value_len={} at offset {}",
            key.len(),
            value.len(),
            offset
        );
        Ok(())
    }

    /// Get the value for `key`
    ///
    /// Returns:
    /// - `Ok(Some(value))`: key is live
    /// - `Ok(None)`: key unknown, deleted, or empty
    /// - `Err(_)`: the indexed record could not be read back
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if key.is_empty() {
            return Ok(None);
        }

        let inner = self.inner.read();
        let Some(offset) = inner.index.get(key) else {
            return Ok(None);
        };

        let record = match inner.log.read_at(offset) {
            Ok((record, _)) => record,
            Err(DbError::EndOfLog(offset)) => {
                return Err(DbError::Corruption {
                    offset,
                    reason: "indexed offset is past the end of the log".to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        if record.is_tombstone() || record.key() != key {
            return Err(DbError::Corruption {
                offset,
                reason: "index points at a record for a different key".to_string(),
            });
        }

        Ok(Some(record.into_value()))
    }

    /// Delete `key`
    ///
    /// Writes a tombstone only if the key is currently live; deleting an
    /// unknown key does nothing.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Ok(());
        }

        let mut inner = self.inner.write();
        if !inner.index.contains(key) {
            return Ok(());
        }

        let offset = inner.log.append(&Record::delete(key.to_vec()))?;
        inner.index.remove(key);

        tracing::debug!("delete key_len={} tombstone at offset {}", key.len(), offset);
        Ok(())
    }

    /// Force the log onto stable storage
    pub fn sync(&self) -> Result<()> {
        self.inner.write().log.sync()
    }

    /// Close the store, syncing the log first
    pub fn close(self) -> Result<()> {
        self.sync()?;
        tracing::info!("Closed store at {}", self.config.data_dir.display());
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.inner.read().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().index.is_empty()
    }

    /// Whether `key` currently has a value
    pub fn contains_key(&self, key: &[u8]) -> bool {
        !key.is_empty() && self.inner.read().index.contains(key)
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the log file path
    pub fn log_path(&self) -> PathBuf {
        self.config.log_path()
    }

    /// Current size of the log in bytes
    pub fn log_size(&self) -> u64 {
        self.inner.read().log.write_offset()
    }

    /// Stats from the recovery scan run at open
    pub fn recovery_result(&self) -> &RecoveryResult {
        &self.recovery
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

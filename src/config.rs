//! Configuration for DiskDB
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{DbError, Result};

/// Main configuration for a DiskDB store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the store. Created on open if missing.
    /// Internal structure:
    ///   {data_dir}/
    ///     └── diskdb.data      (append-only log)
    pub data_dir: PathBuf,

    /// Name of the log file inside `data_dir`
    pub file_name: String,

    // -------------------------------------------------------------------------
    // Log Configuration
    // -------------------------------------------------------------------------
    /// How often appended records are fsynced
    pub sync_strategy: SyncStrategy,

    /// What recovery does with a record cut short at the end of the log
    pub recovery_mode: RecoveryMode,
}

/// Log sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Leave flushing to the OS page cache
    Never,

    /// fsync after every append (safest, slowest)
    EveryWrite,

    /// fsync after N appends
    EveryNEntries { count: usize },
}

/// Recovery policy for the tail of the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryMode {
    /// Any undecodable record aborts open
    Strict,

    /// A trailing record cut short by end of file is discarded and the file
    /// truncated to the last complete record. Other corruption still aborts.
    TruncateTail,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./diskdb_data"),
            file_name: Self::DEFAULT_FILE_NAME.to_string(),
            sync_strategy: SyncStrategy::Never,
            recovery_mode: RecoveryMode::Strict,
        }
    }
}

impl Config {
    pub const DEFAULT_FILE_NAME: &'static str = "diskdb.data";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Full path of the log file
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    /// Reject settings the store cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.file_name.is_empty() {
            return Err(DbError::Config("log file name must not be empty".to_string()));
        }
        if self.file_name.contains(|c: char| c == '/' || c == '\\') {
            return Err(DbError::Config(format!(
                "log file name must not contain a path separator: {}",
                self.file_name
            )));
        }
        if let SyncStrategy::EveryNEntries { count: 0 } = self.sync_strategy {
            return Err(DbError::Config(
                "EveryNEntries sync count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the log file name
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.config.file_name = name.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the recovery mode
    pub fn recovery_mode(mut self, mode: RecoveryMode) -> Self {
        self.config.recovery_mode = mode;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

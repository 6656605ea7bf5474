//! Append log file
//!
//! Owns the log file, appends encoded records at the end and reads single
//! records back at known offsets.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::{DbError, Result};

use super::record::{Record, RecordHeader, HEADER_SIZE};

/// The on-disk, append-only sequence of records
///
/// `write_offset` always equals the file length. Offsets returned by
/// [`AppendLog::append`] stay valid for the lifetime of the file.
pub struct AppendLog {
    /// File handle, opened for reading and appending
    file: File,

    /// Location of the file (for logging and accessors)
    path: PathBuf,

    /// Where the next record will be written
    write_offset: u64,

    /// When to fsync
    sync_strategy: SyncStrategy,

    /// Appends since the last fsync
    unsynced: usize,

    /// Set when a failed append left the file length unknown
    poisoned: bool,
}

impl AppendLog {
    /// Open the log at `path`, creating an empty one if absent
    pub fn open_or_create(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        let write_offset = file.metadata()?.len();

        tracing::debug!(
            "Opened log {} ({} bytes)",
            path.display(),
            write_offset
        );

        Ok(Self {
            file,
            path: path.to_path_buf(),
            write_offset,
            sync_strategy,
            unsynced: 0,
            poisoned: false,
        })
    }

    /// Append a record and return the offset it starts at
    ///
    /// On failure the file is cut back to its previous length so no partial
    /// record is left behind, and `write_offset` does not move. If the cut
    /// fails, `write_offset` is re-read from the file so later offsets stay
    /// correct; if even that fails, the log refuses further appends.
    pub fn append(&mut self, record: &Record) -> Result<u64> {
        if self.poisoned {
            return Err(DbError::LogPoisoned(format!(
                "{} has an unknown length after a failed append",
                self.path.display()
            )));
        }

        let encoded = record.encode()?;
        let offset = self.write_offset;

        if let Err(e) = self.write_and_sync(&encoded) {
            self.rollback(offset);
            return Err(e.into());
        }

        self.write_offset += encoded.len() as u64;
        Ok(offset)
    }

    /// Read the record starting at `offset`
    ///
    /// Returns the record and its encoded size. `DbError::EndOfLog` when
    /// `offset` is at or past the end of the file; `TruncatedRecord` or
    /// `Corruption` when the bytes there are not a whole, valid record.
    pub fn read_at(&self, offset: u64) -> Result<(Record, u64)> {
        if offset >= self.write_offset {
            return Err(DbError::EndOfLog(offset));
        }
        let available = self.write_offset - offset;

        if available < HEADER_SIZE as u64 {
            return Err(DbError::TruncatedRecord {
                offset,
                needed: HEADER_SIZE as u64,
                available,
            });
        }

        let mut header_buf = [0u8; HEADER_SIZE];
        read_exact_at(&self.file, &mut header_buf, offset)?;
        let size = RecordHeader::decode(&header_buf, offset)?.encoded_size();

        if size > available {
            return Err(DbError::TruncatedRecord {
                offset,
                needed: size,
                available,
            });
        }

        let mut buf = vec![0u8; size as usize];
        buf[..HEADER_SIZE].copy_from_slice(&header_buf);
        read_exact_at(&self.file, &mut buf[HEADER_SIZE..], offset + HEADER_SIZE as u64)?;

        Record::decode(&buf, offset)
    }

    /// Force everything appended so far onto stable storage
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Cut the log to `len` bytes
    ///
    /// Only used by recovery to drop an incomplete trailing record.
    pub fn truncate(&mut self, len: u64) -> Result<()> {
        self.file.set_len(len)?;
        self.file.sync_data()?;
        self.write_offset = len;
        self.unsynced = 0;
        Ok(())
    }

    /// Reset `write_offset` to the file's current length
    pub fn refresh_write_offset(&mut self) -> Result<u64> {
        self.write_offset = self.file.metadata()?.len();
        Ok(self.write_offset)
    }

    /// Whether appends are refused after an unrecoverable failed append
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Offset of the next append (the file length)
    pub fn write_offset(&self) -> u64 {
        self.write_offset
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn write_and_sync(&mut self, encoded: &[u8]) -> io::Result<()> {
        self.file.write_all(encoded)?;
        self.unsynced += 1;

        let due = match self.sync_strategy {
            SyncStrategy::Never => false,
            SyncStrategy::EveryWrite => true,
            SyncStrategy::EveryNEntries { count } => self.unsynced >= count,
        };

        if due {
            self.file.sync_data()?;
            self.unsynced = 0;
        }
        Ok(())
    }

    fn rollback(&mut self, offset: u64) {
        let Err(e) = self.file.set_len(offset) else {
            return;
        };

        tracing::warn!(
            "Failed to roll back partial append in {} at offset {}: {}",
            self.path.display(),
            offset,
            e
        );

        // Appends land at the real end of file, so track it
        match self.refresh_write_offset() {
            Ok(len) if len > offset => tracing::warn!(
                "{} keeps {} torn bytes at offset {}",
                self.path.display(),
                len - offset,
                offset
            ),
            Ok(_) => {}
            Err(e) => {
                tracing::error!(
                    "Cannot read length of {}, refusing further appends: {}",
                    self.path.display(),
                    e
                );
                self.poisoned = true;
            }
        }
    }
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(n) => {
                buf = &mut std::mem::take(&mut buf)[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

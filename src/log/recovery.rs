//! Log Recovery
//!
//! Rebuilds the key index on open by replaying the log from offset 0.

use crate::config::RecoveryMode;
use crate::error::Result;
use crate::index::KeyIndex;

use super::file::AppendLog;
use super::record::Mark;

/// Replays a log into a fresh index
pub struct Recovery;

/// Result of a recovery scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Records decoded and applied
    pub records_replayed: u64,

    /// Of those, how many were Puts
    pub puts: u64,

    /// Of those, how many were tombstones
    pub deletes: u64,

    /// Keys present in the index after the scan
    pub live_keys: usize,

    /// Bytes of valid records scanned
    pub bytes_scanned: u64,

    /// Bytes cut from an incomplete tail (always 0 in strict mode)
    pub truncated_bytes: u64,
}

impl RecoveryResult {
    pub fn was_truncated(&self) -> bool {
        self.truncated_bytes > 0
    }
}

impl Recovery {
    /// Scan `log` from the start and build the index
    ///
    /// This will:
    /// 1. Read records one after another from offset 0
    /// 2. Map each Put's key to its offset; drop each tombstone's key
    /// 3. Stop cleanly at end of log
    /// 4. Fail on an undecodable record, unless the mode is `TruncateTail`
    ///    and the record merely runs past end of file, in which case the
    ///    file is cut back to the last whole record
    pub fn rebuild(
        log: &mut AppendLog,
        mode: RecoveryMode,
    ) -> Result<(KeyIndex, RecoveryResult)> {
        let mut index = KeyIndex::new();
        let mut result = RecoveryResult::default();
        let mut cursor = 0u64;

        loop {
            match log.read_at(cursor) {
                Ok((record, size)) => {
                    tracing::trace!(
                        "Replaying {:?} at offset {} ({} bytes)",
                        record.mark(),
                        cursor,
                        size
                    );

                    match record.mark() {
                        Mark::Put => result.puts += 1,
                        Mark::Delete => result.deletes += 1,
                    }
                    result.records_replayed += 1;

                    index.apply(record, cursor);
                    cursor += size;
                }
                Err(e) if e.is_end_of_log() => break,
                Err(e) if e.is_truncated() && mode == RecoveryMode::TruncateTail => {
                    let dropped = log.write_offset() - cursor;
                    tracing::warn!(
                        "Discarding incomplete record at end of {}: {} ({} bytes)",
                        log.path().display(),
                        e,
                        dropped
                    );
                    log.truncate(cursor)?;
                    result.truncated_bytes = dropped;
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        result.bytes_scanned = cursor;
        result.live_keys = index.len();

        tracing::info!(
            "Recovered {} records ({} puts, {} deletes), {} live keys from {}",
            result.records_replayed,
            result.puts,
            result.deletes,
            result.live_keys,
            log.path().display()
        );

        Ok((index, result))
    }
}

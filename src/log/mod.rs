//! Append-Only Log Module
//!
//! The single data file behind a store. Every Put and Delete becomes one
//! record appended at the end; nothing is ever rewritten in place.
//!
//! ## Responsibilities
//! - Encode and decode records
//! - Append records and hand back the offset they start at
//! - Positional reads of one record at a known offset
//! - Replay the whole log at startup to rebuild the key index
//!
//! ## File Format
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │ Record 1 (offset 0)                                       │
//! │ ┌───────────┬────────────┬──────────┬───────┬───────────┐ │
//! │ │KeyLen (4) │ValueLen (4)│ Mark (2) │  Key  │   Value   │ │
//! │ └───────────┴────────────┴──────────┴───────┴───────────┘ │
//! ├───────────────────────────────────────────────────────────┤
//! │ Record 2 (offset = size of record 1)                      │
//! │ ┌───────────┬────────────┬──────────┬───────┬───────────┐ │
//! │ │KeyLen (4) │ValueLen (4)│ Mark (2) │  Key  │   Value   │ │
//! │ └───────────┴────────────┴──────────┴───────┴───────────┘ │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are big-endian. Mark is 0 for Put and 1 for Delete.

mod file;
mod record;
mod recovery;

pub use file::AppendLog;
pub use record::{Mark, Record, RecordHeader, HEADER_SIZE};
pub use recovery::{Recovery, RecoveryResult};

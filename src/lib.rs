//! # DiskDB
//!
//! A minimal embedded key-value store with:
//! - A single append-only log file as the only on-disk state
//! - A full in-memory index rebuilt on open by replaying the log
//! - Single-writer/multi-reader concurrency behind one RwLock
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Store                               │
//! │            put / delete (write lock) · get (read lock)      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  AppendLog  │◄─────────│  KeyIndex   │
//!   │  (records)  │  offsets │ key → offset│
//!   └──────┬──────┘          └─────────────┘
//!          │                         ▲
//!          │      ┌─────────────┐    │
//!          └─────►│  Recovery   │────┘
//!                 │ (on open)   │
//!                 └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use diskdb::Store;
//!
//! let store = Store::open("./diskdb_data")?;
//! store.put(b"name", b"diskdb")?;
//! assert_eq!(store.get(b"name")?, Some(b"diskdb".to_vec()));
//! store.delete(b"name")?;
//! # Ok::<(), diskdb::DbError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod log;
pub mod index;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DbError, Result};
pub use config::Config;
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of DiskDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

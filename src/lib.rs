//! # skiptable
//!
//! The in-memory write buffer of a log-structured key-value engine:
//! - Versioned entries (key, value, sequence number, insert/delete tag)
//! - Arena-owned entry memory, skip-list ordered handles
//! - Latest-version point lookups with tombstone shadowing
//! - Thread-safe, with atomic sequence assignment
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         MemTable                            │
//! │        insert / delete / get / contains_key / get_entry     │
//! └──────┬──────────────────────┬────────────────────────┬──────┘
//!        │ allocate (locked)    │ encode (unlocked)      │ insert / seek (locked)
//!        ▼                      ▼                        ▼
//!   ┌──────────────┐     ┌──────────────┐        ┌──────────────┐
//!   │    Arenas    │     │ Entry Codec  │        │   SkipList   │
//!   │ durable +    │     │ key|seq|tag| │        │ (Bytes views │
//!   │ scratch      │     │ value        │        │  into arena) │
//!   └──────────────┘     └──────────────┘        └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod coding;
pub mod arena;
pub mod entry;
pub mod index;
pub mod memtable;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, TableError};
pub use config::Config;
pub use entry::{LookupKey, OpType, MAX_SEQUENCE};
pub use memtable::{MemTable, MemTableStats};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of skiptable
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

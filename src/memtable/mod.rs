//! MemTable Module
//!
//! In-memory, multi-version buffer for recent writes.
//!
//! ## Responsibilities
//! - Encode every mutation as an internal entry with a fresh sequence number
//! - Keep entries ordered (user key ASC, sequence DESC) in a skip list
//! - Resolve point lookups to the newest version of a key
//! - Track arena usage for flush triggers
//!
//! ## Memory Ownership
//! Two arenas back the table:
//! - **durable**: every inserted entry; lives as long as the table
//! - **scratch**: query records built by lookups; never referenced by the index
//!
//! The skip list only holds `Bytes` views into the durable arena.
//!
//! ## Locking
//! One mutex guards the arenas and the index. It is taken once to allocate
//! and once to touch the index; encoding runs unlocked on a buffer nobody
//! else can see yet. Sequence numbers come from an atomic counter so that
//! concurrent writers never share or reorder them.

mod table;

pub use table::MemTable;

/// Point-in-time counters for a MemTable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemTableStats {
    /// Entries in the index, tombstones included
    pub entry_count: usize,

    /// Sequence number the next mutation will receive
    pub next_sequence: u64,

    /// Bytes reserved by the durable arena
    pub durable_memory: usize,

    /// Bytes of encoded entries in the durable arena
    pub durable_allocated: usize,

    /// Bytes reserved by the scratch arena
    pub scratch_memory: usize,

    /// Bytes of query records in the scratch arena
    pub scratch_allocated: usize,
}

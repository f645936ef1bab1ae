//! Ordered Index Module
//!
//! Sorted storage of entry handles.
//!
//! ## Responsibilities
//! - Keep entry handles in comparator order
//! - Answer "first entry not less than target" queries
//! - Never own entry memory: handles are views into an arena
//!
//! The index is not synchronized; callers serialize mutation externally.

mod skiplist;

pub use skiplist::{SkipList, SkipListIter, MAX_HEIGHT};

use bytes::Bytes;

use crate::error::Result;

/// Sorted set of encoded entries under a comparator
pub trait OrderedIndex: Send {
    /// Insert an entry handle.
    /// Fails if an equal entry is already present.
    fn insert(&mut self, entry: Bytes) -> Result<()>;

    /// First entry that does not order before `target`
    fn find_not_less_than(&self, target: &[u8]) -> Option<&Bytes>;

    /// Number of entries (the sentinel head is not counted)
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Internal Entry Module
//!
//! The self-describing record every mutation is stored as.
//!
//! ## Entry Format
//! ```text
//! ┌──────────────┬───────────┬─────────────────────┬────────────────┬─────────┐
//! │ key_len (v32)│ user_key  │ trailer (8, LE)     │ value_len (v32)│ value   │
//! │              │           │ (sequence << 8)|tag │ Insert only    │ Insert  │
//! └──────────────┴───────────┴─────────────────────┴────────────────┴─────────┘
//! ```
//!
//! ## Ordering
//! Entries sort by user key ascending, then by trailer descending. Since the
//! sequence sits in the high 56 bits, the newest mutation of a key comes
//! first among that key's entries.

mod codec;
mod comparator;

pub use codec::{encode, encoded_len, trailer_of, user_key_of, InternalEntry, LookupKey};
pub use comparator::{BytewiseComparator, Comparator, InternalEntryComparator};

/// Size of the packed sequence/tag trailer
pub const TRAILER_SIZE: usize = 8;

/// Largest sequence number that fits in the trailer.
/// Reserved for lookup records; real mutations stay strictly below it.
pub const MAX_SEQUENCE: u64 = (1 << 56) - 1;

/// Kind of mutation an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpType {
    /// A live value
    Insert = 0x00,

    /// A tombstone (deleted key)
    Delete = 0x01,
}

impl OpType {
    /// Decode a tag byte
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x00 => Some(OpType::Insert),
            0x01 => Some(OpType::Delete),
            _ => None,
        }
    }
}

/// Pack a sequence number and tag into a trailer
#[inline]
pub fn pack_trailer(sequence: u64, op: OpType) -> u64 {
    (sequence << 8) | op as u64
}

/// Split a trailer back into its sequence number and raw tag byte
#[inline]
pub fn unpack_trailer(trailer: u64) -> (u64, u8) {
    (trailer >> 8, (trailer & 0xff) as u8)
}

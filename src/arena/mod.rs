//! Arena Module
//!
//! Bump allocation of entry buffers.
//!
//! ## Responsibilities
//! - Hand out exactly-sized, exclusively-owned buffers
//! - Never free individual buffers: memory goes away with the arena
//! - Track reserved and handed-out bytes for flush decisions
//!
//! ## Block Layout
//! ```text
//! block 0: ┌────────┬────────┬──────────┬───────────────┐
//!          │ buf A  │ buf B  │  buf C   │  (remaining)  │ ◄─ bump
//!          └────────┴────────┴──────────┴───────────────┘
//! block 1: ┌──────────────────────────────────────────────────┐
//!          │ dedicated block for a large request              │
//!          └──────────────────────────────────────────────────┘
//! ```
//!
//! Buffers are carved with `BytesMut::split_to`, so every buffer is a view
//! into a shared block allocation. Once frozen into `Bytes` the view is
//! cheap to clone and keeps its block alive; no buffer ever owns memory on
//! its own.
//!
//! ## Unbounded Growth
//! The arena never reuses space. A table that answers many lookups keeps
//! growing its scratch arena until the table itself is dropped.

use bytes::BytesMut;

use crate::error::{Result, TableError};

/// Bump allocator over `BytesMut` blocks
#[derive(Debug)]
pub struct Arena {
    /// Unused tail of the block currently being carved
    current: BytesMut,

    /// Size of a regular block
    block_size: usize,

    /// Max bytes this arena may reserve (None = unbounded)
    capacity: Option<usize>,

    /// Bytes reserved for blocks so far
    memory_usage: usize,

    /// Bytes handed out to callers so far
    allocated: usize,

    /// Number of blocks reserved so far
    blocks: usize,
}

impl Arena {
    /// Create an arena. No memory is reserved until the first allocation.
    pub fn new(block_size: usize, capacity: Option<usize>) -> Self {
        Self {
            current: BytesMut::new(),
            block_size: block_size.max(1),
            capacity,
            memory_usage: 0,
            allocated: 0,
            blocks: 0,
        }
    }

    /// Allocate a zeroed buffer of exactly `size` bytes
    pub fn allocate(&mut self, size: usize) -> Result<BytesMut> {
        if size <= self.current.len() {
            self.allocated += size;
            return Ok(self.current.split_to(size));
        }

        // Large requests get their own block so the tail of the current
        // block stays usable for small ones.
        if size > self.block_size / 4 {
            let mut dedicated = self.reserve_block(size)?;
            self.allocated += size;
            return Ok(dedicated.split_to(size));
        }

        self.current = self.reserve_block(self.block_size)?;
        self.allocated += size;
        Ok(self.current.split_to(size))
    }

    fn reserve_block(&mut self, block_size: usize) -> Result<BytesMut> {
        if let Some(capacity) = self.capacity {
            if self.memory_usage + block_size > capacity {
                return Err(TableError::OutOfMemory {
                    requested: block_size,
                    capacity,
                });
            }
        }

        self.memory_usage += block_size;
        self.blocks += 1;
        Ok(BytesMut::zeroed(block_size))
    }

    /// Bytes reserved for blocks (including unused tails)
    pub fn memory_usage(&self) -> usize {
        self.memory_usage
    }

    /// Bytes handed out by `allocate`
    pub fn allocated_bytes(&self) -> usize {
        self.allocated
    }

    /// Number of blocks reserved
    pub fn block_count(&self) -> usize {
        self.blocks
    }

    /// Configured block size
    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

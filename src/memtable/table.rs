//! MemTable implementation
//!
//! Arena-backed skip list with an atomic sequence counter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use crossbeam::utils::CachePadded;
use parking_lot::Mutex;

use super::MemTableStats;
use crate::arena::Arena;
use crate::config::Config;
use crate::entry::{
    encode, encoded_len, user_key_of, BytewiseComparator, Comparator, InternalEntry,
    InternalEntryComparator, OpType, MAX_SEQUENCE,
};
use crate::error::{Result, TableError};
use crate::index::{OrderedIndex, SkipList};

/// Head key of the skip list. Too short to parse as an entry, so the
/// internal comparator orders it before everything.
const SENTINEL_KEY: &[u8] = &[0];

/// State guarded by the table lock
struct Shared {
    durable: Arena,
    scratch: Arena,
    index: SkipList<InternalEntryComparator>,
}

/// In-memory table for recent writes
pub struct MemTable {
    /// Arenas and index, behind one lock
    shared: Mutex<Shared>,

    /// Next sequence number to hand out
    next_sequence: CachePadded<AtomicU64>,

    /// Sequence number the table started from
    first_sequence: u64,

    comparator: InternalEntryComparator,

    config: Config,
}

impl MemTable {
    /// Create a table with the default configuration whose first mutation
    /// receives sequence `first_entry_id`
    pub fn new(first_entry_id: u64) -> Self {
        Self::build(
            Config::default(),
            first_entry_id,
            InternalEntryComparator::default(),
        )
    }

    /// Create a table with a custom configuration
    pub fn with_config(config: Config, first_entry_id: u64) -> Result<Self> {
        Self::with_comparator(config, first_entry_id, Arc::new(BytewiseComparator))
    }

    /// Create a table ordering user keys with `user_comparator`
    pub fn with_comparator(
        config: Config,
        first_entry_id: u64,
        user_comparator: Arc<dyn Comparator>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(
            config,
            first_entry_id,
            InternalEntryComparator::new(user_comparator),
        ))
    }

    fn build(config: Config, first_entry_id: u64, comparator: InternalEntryComparator) -> Self {
        tracing::debug!(
            first_entry_id,
            block_size = config.arena_block_size,
            user_comparator = comparator.user_comparator().name(),
            "creating memtable"
        );

        let shared = Shared {
            durable: Arena::new(config.arena_block_size, config.arena_capacity),
            scratch: Arena::new(config.arena_block_size, config.scratch_capacity),
            index: SkipList::new(comparator.clone(), Bytes::from_static(SENTINEL_KEY)),
        };

        Self {
            shared: Mutex::new(shared),
            next_sequence: CachePadded::new(AtomicU64::new(first_entry_id)),
            first_sequence: first_entry_id,
            comparator,
            config,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Insert a key-value pair, returning the sequence number it received
    pub fn insert(&self, key: &[u8], value: &[u8]) -> Result<u64> {
        self.check_key(key)?;
        if value.len() > self.config.max_value_size {
            return Err(self.reject(TableError::Encoding(format!(
                "value of {} bytes exceeds max_value_size {}",
                value.len(),
                self.config.max_value_size
            ))));
        }

        self.write(key, value, OpType::Insert)
    }

    /// Write a tombstone for `key`, returning the sequence number it received
    ///
    /// The tombstone shadows every older insert of the key.
    pub fn delete(&self, key: &[u8]) -> Result<u64> {
        self.check_key(key)?;
        self.write(key, &[], OpType::Delete)
    }

    fn check_key(&self, key: &[u8]) -> Result<()> {
        if key.len() > self.config.max_key_size {
            return Err(self.reject(TableError::Encoding(format!(
                "key of {} bytes exceeds max_key_size {}",
                key.len(),
                self.config.max_key_size
            ))));
        }
        Ok(())
    }

    /// Allocate, sequence, encode, then publish into the index.
    /// Nothing reaches the index unless every earlier step succeeded.
    fn write(&self, key: &[u8], value: &[u8], op: OpType) -> Result<u64> {
        let size = encoded_len(key, value, op);

        let mut buf = {
            let mut shared = self.shared.lock();
            shared.durable.allocate(size)
        }
        .map_err(|e| self.reject(e))?;

        let sequence = self.assign_sequence().map_err(|e| self.reject(e))?;

        encode(key, value, sequence, op, &mut buf).map_err(|e| self.reject(e))?;

        {
            let mut shared = self.shared.lock();
            shared.index.insert(buf.freeze()).map_err(|e| self.reject(e))?;
        }

        tracing::trace!(sequence, ?op, key_len = key.len(), value_len = value.len(), "mutation applied");
        Ok(sequence)
    }

    fn assign_sequence(&self) -> Result<u64> {
        self.next_sequence
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                (next < MAX_SEQUENCE).then(|| next + 1)
            })
            .map_err(|_| TableError::SequenceExhausted)
    }

    fn reject(&self, error: TableError) -> TableError {
        tracing::warn!(%error, "mutation rejected");
        error
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Latest live value of `key`
    ///
    /// Returns `Ok(None)` when the key was never written or its newest
    /// entry is a tombstone.
    pub fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        match self.lookup(key)? {
            Some(entry) => live_value(&entry),
            None => Ok(None),
        }
    }

    /// Whether the newest entry of `key` is a live value
    pub fn contains_key(&self, key: &[u8]) -> Result<bool> {
        match self.lookup(key)? {
            Some(entry) => Ok(InternalEntry::parse(&entry)?.op_type() == OpType::Insert),
            None => Ok(false),
        }
    }

    /// Look up with a caller-encoded internal entry
    ///
    /// The entry's sequence bounds which versions are visible: the newest
    /// entry of the same user key at or below that sequence decides the
    /// outcome. See [`LookupKey`](crate::entry::LookupKey).
    pub fn get_entry(&self, internal_entry: &[u8]) -> Result<Option<Bytes>> {
        InternalEntry::parse(internal_entry)?;

        match self.find(internal_entry) {
            Some(entry) => live_value(&entry),
            None => Ok(None),
        }
    }

    /// Build the sentinel query record for `key` in the scratch arena and
    /// find the newest entry of that key
    fn lookup(&self, key: &[u8]) -> Result<Option<Bytes>> {
        if key.len() > self.config.max_key_size {
            // Never admitted, so never present
            return Ok(None);
        }

        let size = encoded_len(key, &[], OpType::Delete);
        let mut query: BytesMut = {
            let mut shared = self.shared.lock();
            shared.scratch.allocate(size)?
        };

        encode(key, &[], MAX_SEQUENCE, OpType::Delete, &mut query)?;

        let found = self.find(&query);
        tracing::trace!(key_len = key.len(), found = found.is_some(), "lookup");
        Ok(found)
    }

    /// First indexed entry not less than `query`, if it has the query's user key
    fn find(&self, query: &[u8]) -> Option<Bytes> {
        let user_key = user_key_of(query)?;

        let entry = self.shared.lock().index.find_not_less_than(query).cloned()?;

        let found_key = user_key_of(&entry)?;
        self.comparator
            .same_user_key(found_key, user_key)
            .then_some(entry)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of entries, tombstones included
    pub fn len(&self) -> usize {
        self.shared.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sequence number the next mutation will receive
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence.load(Ordering::Acquire)
    }

    /// Most recently assigned sequence number, if any
    pub fn last_sequence(&self) -> Option<u64> {
        let next = self.next_sequence();
        (next > self.first_sequence).then(|| next - 1)
    }

    /// Bytes reserved by both arenas
    pub fn memory_usage(&self) -> usize {
        let shared = self.shared.lock();
        shared.durable.memory_usage() + shared.scratch.memory_usage()
    }

    /// Whether the durable arena has reached `memtable_size_limit`
    pub fn should_flush(&self) -> bool {
        self.shared.lock().durable.memory_usage() >= self.config.memtable_size_limit
    }

    /// Snapshot of the table's counters
    pub fn stats(&self) -> MemTableStats {
        let shared = self.shared.lock();
        MemTableStats {
            entry_count: shared.index.len(),
            next_sequence: self.next_sequence(),
            durable_memory: shared.durable.memory_usage(),
            durable_allocated: shared.durable.allocated_bytes(),
            scratch_memory: shared.scratch.memory_usage(),
            scratch_allocated: shared.scratch.allocated_bytes(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Default for MemTable {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Value view of `entry` if it records an insert
fn live_value(entry: &Bytes) -> Result<Option<Bytes>> {
    let parsed = InternalEntry::parse(entry)?;
    match parsed.op_type() {
        OpType::Delete => Ok(None),
        OpType::Insert if parsed.value().is_empty() => Ok(Some(Bytes::new())),
        OpType::Insert => Ok(Some(entry.slice_ref(parsed.value()))),
    }
}

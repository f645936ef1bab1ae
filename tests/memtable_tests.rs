//! MemTable Tests
//!
//! Tests verify:
//! - Basic insert / get / delete / contains_key
//! - Multi-version resolution and tombstone shadowing
//! - Sequence assignment from the caller-supplied start
//! - Historical lookups through raw internal entries
//! - Failures that must leave the index untouched
//! - Size tracking and flush hints

use std::cmp::Ordering;
use std::sync::Arc;

use skiptable::entry::{encode, encoded_len, Comparator};
use skiptable::{Config, LookupKey, MemTable, OpType, TableError, MAX_SEQUENCE};

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_memtable_is_empty() {
    let memtable = MemTable::new(1);

    assert!(memtable.is_empty());
    assert_eq!(memtable.len(), 0);
    assert_eq!(memtable.next_sequence(), 1);
    assert_eq!(memtable.last_sequence(), None);
    assert_eq!(memtable.memory_usage(), 0);
}

#[test]
fn test_insert_and_get() {
    let memtable = MemTable::new(1);

    memtable.insert(b"key1", b"value1").unwrap();

    assert_eq!(memtable.get(b"key1").unwrap().as_deref(), Some(&b"value1"[..]));
    assert!(memtable.contains_key(b"key1").unwrap());
}

#[test]
fn test_get_nonexistent_key() {
    let memtable = MemTable::new(1);
    memtable.insert(b"b", b"2").unwrap();

    // Before, between and after existing keys
    assert_eq!(memtable.get(b"a").unwrap(), None);
    assert_eq!(memtable.get(b"bb").unwrap(), None);
    assert_eq!(memtable.get(b"c").unwrap(), None);
    assert!(!memtable.contains_key(b"a").unwrap());
}

#[test]
fn test_empty_value_is_live() {
    let memtable = MemTable::new(1);

    memtable.insert(b"k", b"").unwrap();

    assert_eq!(memtable.get(b"k").unwrap().as_deref(), Some(&b""[..]));
    assert!(memtable.contains_key(b"k").unwrap());
}

#[test]
fn test_empty_key_is_a_key() {
    let memtable = MemTable::new(1);

    memtable.insert(b"", b"root").unwrap();

    assert_eq!(memtable.get(b"").unwrap().as_deref(), Some(&b"root"[..]));
    assert_eq!(memtable.get(b"a").unwrap(), None);
}

// =============================================================================
// Multi-Version Tests
// =============================================================================

#[test]
fn test_latest_insert_wins() {
    let memtable = MemTable::new(1);

    assert_eq!(memtable.insert(b"k", b"v1").unwrap(), 1);
    assert_eq!(memtable.insert(b"k", b"v2").unwrap(), 2);

    assert_eq!(memtable.get(b"k").unwrap().as_deref(), Some(&b"v2"[..]));
    // Both versions are kept
    assert_eq!(memtable.len(), 2);
}

#[test]
fn test_delete_shadows_insert() {
    let memtable = MemTable::new(1);

    memtable.insert(b"k", b"v").unwrap();
    memtable.delete(b"k").unwrap();

    assert_eq!(memtable.get(b"k").unwrap(), None);
    assert!(!memtable.contains_key(b"k").unwrap());
    assert_eq!(memtable.len(), 2); // Tombstone still counts as entry
}

#[test]
fn test_delete_nonexistent_key() {
    let memtable = MemTable::new(1);

    memtable.delete(b"ghost").unwrap();

    assert_eq!(memtable.get(b"ghost").unwrap(), None);
    assert_eq!(memtable.len(), 1);
}

#[test]
fn test_insert_after_delete() {
    let memtable = MemTable::new(1);

    memtable.insert(b"k", b"v").unwrap();
    memtable.delete(b"k").unwrap();
    memtable.insert(b"k", b"v2").unwrap();

    assert_eq!(memtable.get(b"k").unwrap().as_deref(), Some(&b"v2"[..]));
    assert!(memtable.contains_key(b"k").unwrap());
}

#[test]
fn test_delete_does_not_touch_neighbours() {
    let memtable = MemTable::new(1);

    memtable.insert(b"a", b"1").unwrap();
    memtable.insert(b"ab", b"2").unwrap();
    memtable.insert(b"b", b"3").unwrap();
    memtable.delete(b"ab").unwrap();

    assert_eq!(memtable.get(b"a").unwrap().as_deref(), Some(&b"1"[..]));
    assert_eq!(memtable.get(b"ab").unwrap(), None);
    assert_eq!(memtable.get(b"b").unwrap().as_deref(), Some(&b"3"[..]));
}

// =============================================================================
// Sequence Tests
// =============================================================================

#[test]
fn test_scenario_from_first_entry_id() {
    let memtable = MemTable::new(100);

    assert_eq!(memtable.insert(b"a", b"1").unwrap(), 100);
    assert_eq!(memtable.insert(b"b", b"2").unwrap(), 101);
    assert_eq!(memtable.delete(b"a").unwrap(), 102);

    assert_eq!(memtable.get(b"a").unwrap(), None);
    assert_eq!(memtable.get(b"b").unwrap().as_deref(), Some(&b"2"[..]));
    assert!(!memtable.contains_key(b"a").unwrap());

    assert_eq!(memtable.next_sequence(), 103);
    assert_eq!(memtable.last_sequence(), Some(102));
}

#[test]
fn test_sequence_exhaustion() {
    let memtable = MemTable::new(MAX_SEQUENCE - 1);

    assert_eq!(memtable.insert(b"k", b"last").unwrap(), MAX_SEQUENCE - 1);
    assert_eq!(memtable.insert(b"k", b"over"), Err(TableError::SequenceExhausted));
    assert_eq!(memtable.delete(b"k"), Err(TableError::SequenceExhausted));

    assert_eq!(memtable.len(), 1);
    assert_eq!(memtable.get(b"k").unwrap().as_deref(), Some(&b"last"[..]));
}

// =============================================================================
// Raw Entry Lookup Tests
// =============================================================================

#[test]
fn test_get_entry_with_latest_lookup_key() {
    let memtable = MemTable::new(1);
    memtable.insert(b"k", b"v").unwrap();

    let lookup = LookupKey::latest(b"k").unwrap();
    assert_eq!(memtable.get_entry(lookup.as_bytes()).unwrap().as_deref(), Some(&b"v"[..]));
    assert_eq!(memtable.get_entry(lookup.as_ref()).unwrap().as_deref(), Some(&b"v"[..]));
}

#[test]
fn test_get_entry_at_historical_sequence() {
    let memtable = MemTable::new(10);

    memtable.insert(b"k", b"v10").unwrap(); // 10
    memtable.insert(b"other", b"x").unwrap(); // 11
    memtable.insert(b"k", b"v12").unwrap(); // 12
    memtable.delete(b"k").unwrap(); // 13

    let at = |seq| {
        let lookup = LookupKey::new(b"k", seq).unwrap();
        memtable.get_entry(lookup.as_bytes()).unwrap()
    };

    assert_eq!(at(9), None);
    assert_eq!(at(10).as_deref(), Some(&b"v10"[..]));
    assert_eq!(at(11).as_deref(), Some(&b"v10"[..]));
    assert_eq!(at(12).as_deref(), Some(&b"v12"[..]));
    assert_eq!(at(13), None);
    assert_eq!(at(MAX_SEQUENCE), None);
}

#[test]
fn test_get_entry_with_encoded_insert_record() {
    let memtable = MemTable::new(1);
    memtable.insert(b"k", b"v").unwrap();

    let mut raw = vec![0u8; encoded_len(b"k", b"ignored", OpType::Insert)];
    encode(b"k", b"ignored", 1, OpType::Insert, &mut raw).unwrap();

    assert_eq!(memtable.get_entry(&raw).unwrap().as_deref(), Some(&b"v"[..]));
}

#[test]
fn test_get_entry_rejects_garbage() {
    let memtable = MemTable::new(1);
    let result = memtable.get_entry(&[0x05, b'a']);
    assert!(matches!(result, Err(TableError::Corruption(_))));
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_oversized_key_is_rejected_without_insertion() {
    let config = Config::builder().max_key_size(8).build();
    let memtable = MemTable::with_config(config, 1).unwrap();

    let result = memtable.insert(b"this key is too long", b"v");
    assert!(matches!(result, Err(TableError::Encoding(_))));

    let result = memtable.delete(b"this key is too long");
    assert!(matches!(result, Err(TableError::Encoding(_))));

    assert!(memtable.is_empty());
    assert_eq!(memtable.get(b"this key is too long").unwrap(), None);
    // No sequence was consumed
    assert_eq!(memtable.next_sequence(), 1);
}

#[test]
fn test_oversized_value_is_rejected_without_insertion() {
    let config = Config::builder().max_value_size(4).build();
    let memtable = MemTable::with_config(config, 1).unwrap();

    let result = memtable.insert(b"k", b"too long");
    assert!(matches!(result, Err(TableError::Encoding(_))));
    assert!(memtable.is_empty());

    memtable.insert(b"k", b"ok").unwrap();
    assert_eq!(memtable.len(), 1);
}

#[test]
fn test_arena_exhaustion_is_surfaced() {
    let config = Config::builder()
        .arena_block_size(1024)
        .arena_capacity(1024)
        .build();
    let memtable = MemTable::with_config(config, 1).unwrap();

    let value = vec![b'v'; 200];
    let mut inserted = 0;
    let error = loop {
        match memtable.insert(format!("key{}", inserted).as_bytes(), &value) {
            Ok(_) => inserted += 1,
            Err(e) => break e,
        }
    };

    assert!(matches!(error, TableError::OutOfMemory { .. }));
    assert_eq!(memtable.len(), inserted);
    assert_eq!(memtable.get(b"key0").unwrap().as_deref(), Some(&value[..]));
}

#[test]
fn test_durable_capacity_does_not_limit_lookups() {
    let config = Config::builder()
        .arena_block_size(1024)
        .arena_capacity(64 * 1024)
        .build();
    let memtable = MemTable::with_config(config, 1).unwrap();

    memtable.insert(b"k", b"v").unwrap();

    // Each lookup reserves a 10-byte query record
    let lookups = 2 * 64 * 1024 / encoded_len(b"k", b"", OpType::Delete);
    for _ in 0..lookups {
        assert_eq!(memtable.get(b"k").unwrap().as_deref(), Some(&b"v"[..]));
    }

    memtable.insert(b"k2", b"v2").unwrap();
    assert_eq!(memtable.get(b"k2").unwrap().as_deref(), Some(&b"v2"[..]));
    assert!(memtable.contains_key(b"k2").unwrap());
    assert!(memtable.stats().scratch_memory > 64 * 1024);
}

#[test]
fn test_scratch_capacity_bounds_lookups_only() {
    let config = Config::builder()
        .arena_block_size(1024)
        .scratch_capacity(1024)
        .build();
    let memtable = MemTable::with_config(config, 1).unwrap();

    memtable.insert(b"k", b"v").unwrap();

    let error = loop {
        match memtable.get(b"k") {
            Ok(value) => assert_eq!(value.as_deref(), Some(&b"v"[..])),
            Err(e) => break e,
        }
    };
    assert!(matches!(error, TableError::OutOfMemory { capacity: 1024, .. }));

    // Writes draw on the durable arena and still succeed
    memtable.insert(b"k2", b"v2").unwrap();
    assert_eq!(memtable.len(), 2);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = Config::builder().arena_block_size(0).build();
    assert!(matches!(
        MemTable::with_config(config, 1),
        Err(TableError::Config(_))
    ));

    let config = Config::builder()
        .arena_block_size(4096)
        .arena_capacity(100)
        .build();
    assert!(MemTable::with_config(config, 1).is_err());

    let config = Config::builder()
        .arena_block_size(4096)
        .scratch_capacity(100)
        .build();
    assert!(MemTable::with_config(config, 1).is_err());
}

// =============================================================================
// Comparator Tests
// =============================================================================

struct ReverseComparator;

impl Comparator for ReverseComparator {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        b.cmp(a)
    }

    fn name(&self) -> &'static str {
        "test.ReverseComparator"
    }
}

#[test]
fn test_custom_user_comparator() {
    let memtable =
        MemTable::with_comparator(Config::default(), 1, Arc::new(ReverseComparator)).unwrap();

    memtable.insert(b"a", b"1").unwrap();
    memtable.insert(b"b", b"2").unwrap();
    memtable.insert(b"a", b"3").unwrap();

    assert_eq!(memtable.get(b"a").unwrap().as_deref(), Some(&b"3"[..]));
    assert_eq!(memtable.get(b"b").unwrap().as_deref(), Some(&b"2"[..]));
    assert_eq!(memtable.get(b"c").unwrap(), None);
}

// =============================================================================
// Size Tracking Tests
// =============================================================================

#[test]
fn test_stats_track_both_arenas() {
    let memtable = MemTable::new(1);

    memtable.insert(b"key", b"value").unwrap();
    let after_insert = memtable.stats();
    assert_eq!(after_insert.entry_count, 1);
    assert_eq!(after_insert.durable_allocated, encoded_len(b"key", b"value", OpType::Insert));
    assert_eq!(after_insert.scratch_allocated, 0);

    memtable.get(b"key").unwrap();
    memtable.contains_key(b"key").unwrap();
    let after_lookups = memtable.stats();
    assert_eq!(
        after_lookups.scratch_allocated,
        2 * encoded_len(b"key", b"", OpType::Delete)
    );
    // Lookups never grow the durable arena
    assert_eq!(after_lookups.durable_allocated, after_insert.durable_allocated);
    assert_eq!(after_lookups.next_sequence, 2);
}

#[test]
fn test_should_flush_after_limit() {
    let config = Config::builder()
        .arena_block_size(1024)
        .memtable_size_limit(4 * 1024)
        .build();
    let memtable = MemTable::with_config(config, 1).unwrap();

    assert!(!memtable.should_flush());

    let value = vec![b'v'; 100];
    for i in 0..100 {
        memtable.insert(format!("key{:03}", i).as_bytes(), &value).unwrap();
    }

    assert!(memtable.should_flush());
}

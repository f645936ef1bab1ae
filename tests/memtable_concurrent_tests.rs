//! MemTable Concurrency Tests
//!
//! Tests verify:
//! - Concurrent writers receive distinct, per-thread increasing sequences
//! - Same-key writers resolve to their last write
//! - Readers observe consistent values while a writer runs

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use skiptable::MemTable;

// =============================================================================
// Test 1: Concurrent writers never share a sequence number
// =============================================================================
#[test]
fn concurrent_writers_get_distinct_sequences() {
    let table = Arc::new(MemTable::new(1));

    let mut handles = vec![];
    for t in 0..8 {
        let tbl = Arc::clone(&table);
        handles.push(thread::spawn(move || {
            let mut seqs = Vec::with_capacity(500);
            for i in 0..500 {
                let key = format!("t{}-k{}", t, i % 50).into_bytes();
                let seq = if i % 5 == 4 {
                    tbl.delete(&key).unwrap()
                } else {
                    tbl.insert(&key, format!("v{}", i).as_bytes()).unwrap()
                };
                seqs.push(seq);
            }
            seqs
        }));
    }

    let mut all = HashSet::new();
    for h in handles {
        let seqs = h.join().unwrap();

        // Same-thread calls are strictly increasing
        assert!(seqs.windows(2).all(|w| w[0] < w[1]));

        for seq in seqs {
            assert!(all.insert(seq), "sequence {} assigned twice", seq);
        }
    }

    assert_eq!(all.len(), 8 * 500);
    assert_eq!(table.len(), 8 * 500);
    assert_eq!(table.next_sequence(), 1 + 8 * 500);
}

// =============================================================================
// Test 2: Writers on the same key resolve to their last write
// =============================================================================
#[test]
fn per_thread_keys_resolve_to_last_write() {
    let table = Arc::new(MemTable::new(1));

    let mut handles = vec![];
    for t in 0..4 {
        let tbl = Arc::clone(&table);
        handles.push(thread::spawn(move || {
            let key = format!("owner{}", t).into_bytes();
            for i in 0..200 {
                tbl.insert(&key, format!("{}", i).as_bytes()).unwrap();
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    for t in 0..4 {
        let key = format!("owner{}", t).into_bytes();
        assert_eq!(table.get(&key).unwrap().as_deref(), Some(&b"199"[..]));
    }
}

// =============================================================================
// Test 3: Readers and writers work together
// =============================================================================
#[test]
fn readers_and_writers_concurrent() {
    let table = Arc::new(MemTable::new(1));
    table.insert(b"stable", b"value").unwrap();

    let writer_tbl = Arc::clone(&table);
    let writer = thread::spawn(move || {
        for i in 0..500 {
            let key = format!("key{}", i).into_bytes();
            writer_tbl.insert(&key, b"v").unwrap();
            if i % 2 == 0 {
                writer_tbl.delete(&key).unwrap();
            }
        }
    });

    let mut readers = vec![];
    for _ in 0..4 {
        let tbl = Arc::clone(&table);
        readers.push(thread::spawn(move || {
            for i in 0..500 {
                if let Some(value) = tbl.get(format!("key{}", i).as_bytes()).unwrap() {
                    assert_eq!(&value[..], b"v");
                }
                assert_eq!(tbl.get(b"stable").unwrap().as_deref(), Some(&b"value"[..]));
            }
        }));
    }

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }

    for i in 0..500 {
        let key = format!("key{}", i).into_bytes();
        assert_eq!(table.contains_key(&key).unwrap(), i % 2 == 1);
    }
}

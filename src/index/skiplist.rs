//! Skip list implementation
//!
//! Nodes live in a `Vec` and link to each other by index, so the list needs
//! no unsafe pointer juggling and never frees a node once inserted.
//!
//! ```text
//! Level 3:  HEAD ──────────────────────────────► 50 ──────────► NIL
//! Level 2:  HEAD ──────────► 20 ────────────────► 50 ──────────► NIL
//! Level 1:  HEAD ──► 10 ──► 20 ────► 35 ────────► 50 ──► 60 ──► NIL
//! Level 0:  HEAD ──► 10 ──► 20 ──► 25 ──► 35 ──► 50 ──► 60 ──► 70 ► NIL
//! ```

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::OrderedIndex;
use crate::entry::{trailer_of, unpack_trailer, Comparator};
use crate::error::{Result, TableError};

/// Maximum height of the skip list. LevelDB uses 12.
pub const MAX_HEIGHT: usize = 12;

/// Each level is kept with probability 1/BRANCHING
const BRANCHING: u32 = 4;

/// Index of the head node in `nodes`
const HEAD: usize = 0;

struct Node {
    key: Bytes,
    forward: [Option<usize>; MAX_HEIGHT],
}

/// A probabilistic sorted list of entry handles
pub struct SkipList<C: Comparator> {
    nodes: Vec<Node>,
    comparator: C,
    height: usize,
    rng: StdRng,
}

impl<C: Comparator> SkipList<C> {
    /// Create an empty list whose head holds `sentinel`
    ///
    /// The sentinel must order before every entry under `comparator`.
    pub fn new(comparator: C, sentinel: Bytes) -> Self {
        Self::with_rng(comparator, sentinel, StdRng::from_entropy())
    }

    /// Create an empty list with a fixed height seed
    pub fn with_seed(comparator: C, sentinel: Bytes, seed: u64) -> Self {
        Self::with_rng(comparator, sentinel, StdRng::seed_from_u64(seed))
    }

    fn with_rng(comparator: C, sentinel: Bytes, rng: StdRng) -> Self {
        Self {
            nodes: vec![Node {
                key: sentinel,
                forward: [None; MAX_HEIGHT],
            }],
            comparator,
            height: 1,
            rng,
        }
    }

    /// The sentinel key held by the head node
    pub fn sentinel(&self) -> &Bytes {
        &self.nodes[HEAD].key
    }

    /// Current number of levels in use
    pub fn height(&self) -> usize {
        self.height
    }

    fn random_height(&mut self) -> usize {
        let mut height = 1;
        while height < MAX_HEIGHT && self.rng.gen_ratio(1, BRANCHING) {
            height += 1;
        }
        height
    }

    /// Walk down from the top level, recording at each level the last node
    /// ordering before `target`.
    fn find_predecessors(&self, target: &[u8]) -> [usize; MAX_HEIGHT] {
        let mut prev = [HEAD; MAX_HEIGHT];
        let mut current = HEAD;

        for level in (0..self.height).rev() {
            while let Some(next) = self.nodes[current].forward[level] {
                if self.comparator.compare(&self.nodes[next].key, target).is_lt() {
                    current = next;
                } else {
                    break;
                }
            }
            prev[level] = current;
        }

        prev
    }
}

impl<C: Comparator> OrderedIndex for SkipList<C> {
    fn insert(&mut self, entry: Bytes) -> Result<()> {
        let prev = self.find_predecessors(&entry);

        if let Some(next) = self.nodes[prev[0]].forward[0] {
            if self.comparator.compare(&self.nodes[next].key, &entry).is_eq() {
                let sequence = trailer_of(&entry).map(|t| unpack_trailer(t).0).unwrap_or(0);
                return Err(TableError::DuplicateEntry(sequence));
            }
        }

        let height = self.random_height();
        if height > self.height {
            // prev already points at HEAD for the new levels
            self.height = height;
        }

        let id = self.nodes.len();
        let mut node = Node {
            key: entry,
            forward: [None; MAX_HEIGHT],
        };
        for level in 0..height {
            node.forward[level] = self.nodes[prev[level]].forward[level];
        }
        self.nodes.push(node);
        for level in 0..height {
            self.nodes[prev[level]].forward[level] = Some(id);
        }

        Ok(())
    }

    fn find_not_less_than(&self, target: &[u8]) -> Option<&Bytes> {
        let prev = self.find_predecessors(target);
        self.nodes[prev[0]].forward[0].map(|id| &self.nodes[id].key)
    }

    fn len(&self) -> usize {
        self.nodes.len() - 1
    }
}

impl<C: Comparator> SkipList<C> {
    /// Entries in order, head excluded
    pub fn iter(&self) -> SkipListIter<'_, C> {
        SkipListIter {
            list: self,
            next: self.nodes[HEAD].forward[0],
        }
    }
}

/// Level-0 walk over the list
pub struct SkipListIter<'a, C: Comparator> {
    list: &'a SkipList<C>,
    next: Option<usize>,
}

impl<'a, C: Comparator> Iterator for SkipListIter<'a, C> {
    type Item = &'a Bytes;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = &self.list.nodes[id];
        self.next = node.forward[0];
        Some(&node.key)
    }
}

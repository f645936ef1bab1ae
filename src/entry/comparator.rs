//! Entry ordering
//!
//! User-key comparators and the internal entry comparator built on them.

use std::cmp::Ordering;
use std::sync::Arc;

use super::codec::{trailer_of, user_key_of};

/// Total order over user keys
pub trait Comparator: Send + Sync {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;

    /// Name identifying the ordering
    fn name(&self) -> &'static str;
}

/// Lexicographic byte order
#[derive(Debug, Default, Clone, Copy)]
pub struct BytewiseComparator;

impl Comparator for BytewiseComparator {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }

    fn name(&self) -> &'static str {
        "skiptable.BytewiseComparator"
    }
}

/// Orders encoded internal entries
///
/// Primary: user key ascending, per the wrapped user comparator.
/// Secondary: trailer descending, i.e. newest sequence first.
///
/// Buffers that do not hold a key and trailer (such as the index's sentinel
/// head key) order before every real entry and equal to each other.
#[derive(Clone)]
pub struct InternalEntryComparator {
    user: Arc<dyn Comparator>,
}

impl InternalEntryComparator {
    pub fn new(user: Arc<dyn Comparator>) -> Self {
        Self { user }
    }

    /// The wrapped user-key comparator
    pub fn user_comparator(&self) -> &dyn Comparator {
        self.user.as_ref()
    }

    /// Whether two user keys are equal under the user comparator
    pub fn same_user_key(&self, a: &[u8], b: &[u8]) -> bool {
        self.user.compare(a, b) == Ordering::Equal
    }
}

impl Default for InternalEntryComparator {
    fn default() -> Self {
        Self::new(Arc::new(BytewiseComparator))
    }
}

impl std::fmt::Debug for InternalEntryComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalEntryComparator")
            .field("user", &self.user.name())
            .finish()
    }
}

impl Comparator for InternalEntryComparator {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        let parsed_a = user_key_of(a).zip(trailer_of(a));
        let parsed_b = user_key_of(b).zip(trailer_of(b));

        match (parsed_a, parsed_b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some((key_a, trailer_a)), Some((key_b, trailer_b))) => self
                .user
                .compare(key_a, key_b)
                .then_with(|| trailer_b.cmp(&trailer_a)),
        }
    }

    fn name(&self) -> &'static str {
        "skiptable.InternalEntryComparator"
    }
}

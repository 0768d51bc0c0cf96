//! Multiplicity: the unit the bag stores in its table.
//!
//! A `Multiplicity` pairs a value with its occurrence count. Identity for
//! hashing and equality is the wrapped value only; the count is payload.
//! Two multiplicities for the same value are therefore the same table key
//! regardless of their counts.
//!
//! Lookups never materialize a zero-count probe entry: the table is probed
//! with a hash and an equality predicate, so a live count below one never
//! exists, even transiently.

use core::hash::{Hash, Hasher};

use crate::counter::Count;

/// A value together with how many logical occurrences of it the bag holds.
#[derive(Debug, Clone)]
pub(crate) struct Multiplicity<T, C> {
    pub(crate) item: T,
    pub(crate) count: C,
}

impl<T, C: Count> Multiplicity<T, C> {
    /// A freshly added value: one occurrence.
    pub(crate) fn single(item: T) -> Self {
        Multiplicity {
            item,
            count: C::ONE,
        }
    }
}

impl<T: PartialEq, C> Multiplicity<T, C> {
    /// Probe predicate: does this entry represent `other`?
    #[inline]
    pub(crate) fn matches(&self, other: &T) -> bool {
        self.item == *other
    }
}

// Identity delegates to the wrapped value; the count is excluded so entries
// for the same value collide as one table key.
impl<T: PartialEq, C> PartialEq for Multiplicity<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.item == other.item
    }
}

impl<T: Eq, C> Eq for Multiplicity<T, C> {}

impl<T: Hash, C> Hash for Multiplicity<T, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.item.hash(state);
    }
}

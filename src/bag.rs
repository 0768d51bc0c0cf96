//! Bag: multiset semantics over the chained table.
//!
//! A `Bag` stores one physical `Multiplicity` per distinct value and
//! tracks the exact number of logical occurrences per value, plus a cached
//! total (`size == Σ count`) that must survive every mutation path. The
//! bag owns the hasher; the table below it only ever sees 32-bit hashes
//! and equality predicates.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

use crate::chain_table::{ChainTable, Cursor, DEFAULT_FILL_FACTOR, MIN_CAPACITY};
use crate::counter::Count;
use crate::error::Error;
use crate::events::BagEvents;
use crate::multiplicity::Multiplicity;

/// A counting multiset ("bag") backed by a chained hash table with
/// randomized multiplicative hashing.
///
/// `T` is the stored value type, `C` the occurrence-count width, and `S`
/// the injected equality/hash capability (any `BuildHasher`; equal values
/// must hash equal).
///
/// ```
/// use hash_bag::Bag;
///
/// let mut bag: Bag<&str> = Bag::new();
/// bag.add("a");
/// bag.add("a");
/// bag.add("b");
/// assert_eq!(bag.len(), 3);
/// assert_eq!(bag.contains_count(&"a"), 2);
/// assert_eq!(bag.remove(&"a"), Some(1));
/// assert_eq!(bag.remove(&"missing"), None);
/// ```
pub struct Bag<T, C = u64, S = RandomState> {
    hasher: S,
    table: ChainTable<Multiplicity<T, C>>,
    /// Cached Σ count over all live entries.
    size: C,
    events: Option<Box<dyn BagEvents<T, C>>>,
}

impl<T, C> Bag<T, C>
where
    T: Eq + Hash,
    C: Count,
{
    /// An empty bag with default capacity (16) and fill factor (0.66).
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    /// An empty bag sized for roughly `capacity` distinct values.
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::with_config(capacity, DEFAULT_FILL_FACTOR, RandomState::new())
    }
}

impl<T, C> Default for Bag<T, C>
where
    T: Eq + Hash,
    C: Count,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C, S> Bag<T, C, S>
where
    T: Eq + Hash,
    C: Count,
    S: BuildHasher,
{
    /// An empty bag with default capacity and fill factor, using `hasher`
    /// as the injected equality/hash capability.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_config(MIN_CAPACITY, DEFAULT_FILL_FACTOR, hasher)
            .expect("default construction parameters are valid")
    }

    /// Fully parameterized constructor.
    ///
    /// `capacity` rounds up to a power of two (minimum 16) and must be
    /// positive; `fill_factor` must lie within `[0.10, 0.90]`.
    pub fn with_config(capacity: usize, fill_factor: f64, hasher: S) -> Result<Self, Error> {
        Ok(Bag {
            hasher,
            table: ChainTable::new(capacity, fill_factor)?,
            size: C::ZERO,
            events: None,
        })
    }

    /// Install the post-mutation hook handler, replacing any previous one.
    pub fn set_events(&mut self, events: Box<dyn BagEvents<T, C>>) {
        self.events = Some(events);
    }

    /// Remove and return the installed hook handler.
    pub fn take_events(&mut self) -> Option<Box<dyn BagEvents<T, C>>> {
        self.events.take()
    }

    /// Total number of logical occurrences, as the counter type.
    pub fn size(&self) -> C {
        self.size
    }

    /// Total number of logical occurrences.
    pub fn len(&self) -> usize {
        self.size.as_usize()
    }

    /// Number of distinct values (physical table entries).
    pub fn distinct_len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size == C::ZERO
    }

    /// Current bucket count of the backing table.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Fold the hasher's 64-bit output to the table's 32-bit hash width,
    /// spending all input bits.
    fn hash_of<Q>(&self, item: &Q) -> u32
    where
        Q: ?Sized + Hash,
    {
        let h = self.hasher.hash_one(item);
        (h ^ (h >> 32)) as u32
    }

    /// Insert a brand-new entry at count one and fire the `added` hook.
    fn insert_new(&mut self, hash: u32, item: T) -> slotmap::DefaultKey {
        let key = self.table.insert(hash, Multiplicity::single(item));
        self.size = self.size.checked_add(C::ONE).expect("bag size overflow");
        if let Some(events) = self.events.as_deref_mut() {
            let m = self
                .table
                .get(key)
                .expect("entry resolves immediately after insert");
            events.added(&m.item, m.count);
        }
        key
    }

    /// Add one logical occurrence of `item`. Always succeeds.
    ///
    /// If the value is already present, its count is incremented and the
    /// stored representative is replaced by this newly supplied instance
    /// (relevant when equality ignores payload that differs between equal
    /// instances). Otherwise a fresh entry is inserted at count one.
    pub fn add(&mut self, item: T) {
        let hash = self.hash_of(&item);
        match self.table.find(hash, |m| m.matches(&item)) {
            Some(key) => {
                let count = self
                    .table
                    .get(key)
                    .expect("found key resolves")
                    .count
                    .checked_add(C::ONE)
                    .expect("occurrence count overflow");
                self.table.update(key, |m| {
                    m.item = item;
                    m.count = count;
                });
                self.size = self.size.checked_add(C::ONE).expect("bag size overflow");
                if let Some(events) = self.events.as_deref_mut() {
                    let m = self.table.get(key).expect("updated entry resolves");
                    events.added(&m.item, m.count);
                }
            }
            None => {
                self.insert_new(hash, item);
            }
        }
    }

    /// Add one occurrence per input element, in input order.
    pub fn add_all<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        for item in items {
            self.add(item);
        }
    }

    /// Remove one logical occurrence of `item`.
    ///
    /// Returns the remaining count (`Some(0)` when the last occurrence
    /// deleted the entry), or `None` — with no mutation — if the value is
    /// absent.
    pub fn remove<Q>(&mut self, item: &Q) -> Option<C>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_of(item);
        let key = self.table.find(hash, |m| m.item.borrow() == item)?;
        let count = self.table.get(key).expect("found key resolves").count;
        self.size = self.size.checked_sub(C::ONE).expect("bag size underflow");
        if count == C::ONE {
            let removed = self.table.remove_key(key).expect("found key removes");
            if let Some(events) = self.events.as_deref_mut() {
                events.removed(&removed.item, C::ZERO);
            }
            Some(C::ZERO)
        } else {
            let remaining = count.checked_sub(C::ONE).expect("count underflow");
            self.table.update(key, |m| m.count = remaining);
            if let Some(events) = self.events.as_deref_mut() {
                let m = self.table.get(key).expect("updated entry resolves");
                events.removed(&m.item, remaining);
            }
            Some(remaining)
        }
    }

    /// Remove one occurrence per input element, in input order. Removing
    /// an already-exhausted value is a silent no-op, so multiplicities are
    /// clipped at zero.
    pub fn remove_all<I>(&mut self, items: I)
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        for item in items {
            let _ = self.remove(item.borrow());
        }
    }

    /// Delete the whole entry for `item` regardless of its count, in one
    /// table removal. Returns the count that was removed, or `None` if the
    /// value was absent.
    pub fn remove_all_copies<Q>(&mut self, item: &Q) -> Option<C>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_of(item);
        let key = self.table.find(hash, |m| m.item.borrow() == item)?;
        let removed = self.table.remove_key(key).expect("found key removes");
        self.size = self
            .size
            .checked_sub(removed.count)
            .expect("bag size underflow");
        if let Some(events) = self.events.as_deref_mut() {
            events.removed(&removed.item, C::ZERO);
        }
        Some(removed.count)
    }

    /// Occurrence count of `item`, zero when absent.
    pub fn contains_count<Q>(&self, item: &Q) -> C
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_of(item);
        match self.table.find(hash, |m| m.item.borrow() == item) {
            Some(key) => self.table.get(key).expect("found key resolves").count,
            None => C::ZERO,
        }
    }

    pub fn contains<Q>(&self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.contains_count(item) > C::ZERO
    }

    /// Replace the stored representative for an equal existing value
    /// without changing its count. Returns `false` — with no mutation —
    /// when the value is absent.
    pub fn update(&mut self, item: T) -> bool {
        let hash = self.hash_of(&item);
        match self.table.find(hash, |m| m.matches(&item)) {
            Some(key) => {
                self.table.update(key, |m| m.item = item);
                true
            }
            None => false,
        }
    }

    /// Replace the stored representative when present (returning `true`),
    /// or insert at count one when absent (returning `false`).
    pub fn update_or_add(&mut self, item: T) -> bool {
        let hash = self.hash_of(&item);
        match self.table.find(hash, |m| m.matches(&item)) {
            Some(key) => {
                self.table.update(key, |m| m.item = item);
                true
            }
            None => {
                self.insert_new(hash, item);
                false
            }
        }
    }

    /// Borrow the stored representative equal to `item`, inserting `item`
    /// at count one first when absent.
    pub fn find_or_add(&mut self, item: T) -> &T {
        let hash = self.hash_of(&item);
        let key = match self.table.find(hash, |m| m.matches(&item)) {
            Some(key) => key,
            None => self.insert_new(hash, item),
        };
        &self
            .table
            .get(key)
            .expect("entry resolves immediately after lookup or insert")
            .item
    }

    /// An arbitrary stored value, or `Error::EmptyCollection`.
    pub fn choose(&self) -> Result<&T, Error> {
        self.table
            .iter()
            .next()
            .map(|m| &m.item)
            .ok_or(Error::EmptyCollection)
    }

    /// Each distinct stored value exactly once, in table iteration order.
    pub fn unique_items(&self) -> UniqueItems<'_, T, C> {
        UniqueItems {
            inner: self.table.iter(),
        }
    }

    /// `(value, count)` per distinct stored value, in table order.
    pub fn counts(&self) -> Counts<'_, T, C> {
        Counts {
            inner: self.table.iter(),
        }
    }

    /// Every logical occurrence: each value repeated `count` times, in
    /// table order. The total length equals `len()`.
    pub fn iter(&self) -> Iter<'_, T, C> {
        Iter {
            inner: self.table.iter(),
            current: None,
        }
    }

    /// Collect the full enumeration of logical occurrences.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// A fail-fast cursor positioned before the first distinct entry.
    ///
    /// Unlike `iter`, a cursor does not borrow the bag between steps; each
    /// `advance` re-checks the revision captured here and reports
    /// `Error::ConcurrentModification` after any intervening mutation.
    pub fn cursor(&self) -> Cursor {
        self.table.cursor()
    }

    /// Step a cursor to the next distinct entry, yielding the value and
    /// its count, or `None` past the end.
    pub fn advance<'a>(&'a self, cursor: &mut Cursor) -> Result<Option<(&'a T, C)>, Error> {
        Ok(self
            .table
            .advance(cursor)?
            .map(|m| (&m.item, m.count)))
    }

    /// Multiset intersection with multiplicity, in place.
    ///
    /// For each input element in order, up to the available count of that
    /// value is carried over into a scratch bag; once the input is
    /// exhausted, this bag atomically adopts the scratch table and size.
    /// A value present 5 times here and requested 3 times retains exactly
    /// 3 copies. Input items not present here are silently dropped. Fires
    /// no per-item hooks; the swap is a single structural mutation.
    pub fn retain_all<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
        S: Clone,
    {
        let mut scratch: Bag<T, C, S> = Bag::with_config(
            self.table.initial_capacity(),
            self.table.fill_factor(),
            self.hasher.clone(),
        )
        .expect("existing table parameters are valid");
        for item in items {
            let available = self.contains_count(&item);
            let taken = scratch.contains_count(&item);
            if taken < available {
                scratch.add(item);
            }
        }
        let Bag { table, size, .. } = scratch;
        self.table.adopt(table);
        self.size = size;
    }

    /// Empty the bag and reset the table to its construction-time
    /// capacity class, discarding any growth. Fires the `cleared` hook.
    pub fn clear(&mut self) {
        self.table.clear();
        self.size = C::ZERO;
        if let Some(events) = self.events.as_deref_mut() {
            events.cleared();
        }
    }

    /// Diagnostic self-audit: recompute Σ count over a full scan, compare
    /// with the cached size, and run the table's structural check. For
    /// test-suite use, not runtime control flow.
    pub fn check(&self) -> bool {
        if !self.table.check() {
            return false;
        }
        let mut total = C::ZERO;
        for m in self.table.iter() {
            if m.count < C::ONE {
                return false;
            }
            total = match total.checked_add(m.count) {
                Some(t) => t,
                None => return false,
            };
        }
        total == self.size
    }
}

/// Iterator over distinct stored values.
pub struct UniqueItems<'a, T, C> {
    inner: crate::chain_table::Iter<'a, Multiplicity<T, C>>,
}

impl<'a, T, C> Iterator for UniqueItems<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|m| &m.item)
    }
}

/// Iterator over `(value, count)` pairs.
pub struct Counts<'a, T, C> {
    inner: crate::chain_table::Iter<'a, Multiplicity<T, C>>,
}

impl<'a, T, C: Count> Iterator for Counts<'a, T, C> {
    type Item = (&'a T, C);

    fn next(&mut self) -> Option<(&'a T, C)> {
        self.inner.next().map(|m| (&m.item, m.count))
    }
}

/// Iterator over logical occurrences: each value repeated `count` times.
pub struct Iter<'a, T, C> {
    inner: crate::chain_table::Iter<'a, Multiplicity<T, C>>,
    current: Option<(&'a T, usize)>,
}

impl<'a, T, C: Count> Iterator for Iter<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            if let Some((item, remaining)) = &mut self.current {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Some(*item);
                }
                self.current = None;
            }
            let m = self.inner.next()?;
            self.current = Some((&m.item, m.count.as_usize()));
        }
    }
}

impl<'a, T, C, S> IntoIterator for &'a Bag<T, C, S>
where
    T: Eq + Hash,
    C: Count,
    S: BuildHasher,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

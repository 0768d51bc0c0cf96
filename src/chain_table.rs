//! ChainTable: structural layer with chained buckets and fail-fast cursors.
//!
//! A `ChainTable<T>` is a bucket array of singly linked chains. Nodes live
//! in a `slotmap::SlotMap` arena and are linked by their stable
//! `DefaultKey`s, so chains need no unsafe pointer handling and keys
//! remain valid identities across rehashing.
//!
//! The table is hash-agnostic: every operation takes a 32-bit hash and,
//! where identity matters, an equality predicate. This keeps the layer
//! free of `Hash`/`Eq` bounds and lets the bag above it inject any
//! equality capability once, at construction.
//!
//! Bucket placement is randomized multiplicative hashing: the index of
//! hash `h` is `(h * factor) >> (32 - bits)` where `factor` is an odd
//! 32-bit multiplier drawn once per table from the process-wide random
//! source. The full-width multiply spreads entropy across all 32 bits
//! before truncation and makes placement unpredictable to anyone who only
//! knows the value type's hash function, which defeats engineered-collision
//! flooding. This is a correctness/security property of the table, not a
//! tuning knob.
//!
//! Capacity only changes in whole powers of two. Growth is evaluated on
//! insert: when the incoming entry would push the live count past
//! `capacity * fill_factor`, the bucket count doubles and every node is
//! relinked by walking the old buckets in index order, reusing the same
//! multiplier. `shrink` is the matching primitive in the other direction
//! (floor: 8 buckets); the bag layer never calls it.
//!
//! Every mutation bumps a monotonically increasing revision. A `Cursor`
//! captures the revision at creation and every `advance` re-checks it,
//! failing with `Error::ConcurrentModification` if the table has moved on.

use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::{DefaultKey, SlotMap};

use crate::error::{Error, MAX_FILL_FACTOR, MIN_FILL_FACTOR};

/// Source of per-instance table identities; see `ChainTable::table_id`.
static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(0);

/// Smallest bucket-array size a table is constructed with.
pub const MIN_CAPACITY: usize = 16;
/// Fill factor used when the caller does not supply one.
pub const DEFAULT_FILL_FACTOR: f64 = 0.66;

const MIN_BITS: u32 = 4;
const SHRINK_FLOOR_BITS: u32 = 3;
const MAX_BITS: u32 = 32;

#[derive(Debug)]
struct Node<T> {
    /// Cached hash: a cheap integer pre-check before full equality.
    hash: u32,
    next: Option<DefaultKey>,
    item: T,
}

/// Bucket-chained hash table storing `T` keyed by caller-supplied hashes.
pub struct ChainTable<T> {
    buckets: Vec<Option<DefaultKey>>,
    nodes: SlotMap<DefaultKey, Node<T>>,
    bits: u32,
    initial_bits: u32,
    fill_factor: f64,
    /// Live entries allowed before the next insert triggers growth.
    threshold: usize,
    /// Per-instance odd random multiplier, fixed at construction.
    factor: u32,
    /// Process-unique identity binding cursors to the table that minted
    /// them.
    table_id: u64,
    revision: u64,
}

fn bits_for(capacity: usize) -> u32 {
    capacity
        .next_power_of_two()
        .trailing_zeros()
        .clamp(MIN_BITS, MAX_BITS)
}

fn threshold_for(bits: u32, fill_factor: f64) -> usize {
    (((1u64 << bits) as f64) * fill_factor) as usize
}

impl<T> ChainTable<T> {
    /// Create a table with `initial_capacity` rounded up to a power of two
    /// (minimum 16 buckets) and the given fill factor.
    ///
    /// Fails with `Error::InvalidCapacity` for a zero capacity and
    /// `Error::InvalidFillFactor` outside `[0.10, 0.90]`.
    pub fn new(initial_capacity: usize, fill_factor: f64) -> Result<Self, Error> {
        use rand::Rng;
        // `| 1` keeps the multiplier odd and therefore non-zero.
        let factor = rand::rng().random::<u32>() | 1;
        Self::with_factor(initial_capacity, fill_factor, factor)
    }

    pub(crate) fn with_factor(
        initial_capacity: usize,
        fill_factor: f64,
        factor: u32,
    ) -> Result<Self, Error> {
        if initial_capacity == 0 {
            return Err(Error::InvalidCapacity(initial_capacity));
        }
        if !(MIN_FILL_FACTOR..=MAX_FILL_FACTOR).contains(&fill_factor) {
            return Err(Error::InvalidFillFactor(fill_factor));
        }
        let bits = bits_for(initial_capacity);
        Ok(ChainTable {
            buckets: vec![None; 1usize << bits],
            nodes: SlotMap::with_key(),
            bits,
            initial_bits: bits,
            fill_factor,
            threshold: threshold_for(bits, fill_factor),
            factor: factor | 1,
            table_id: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
            revision: 0,
        })
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current bucket count.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Bucket count the table was constructed with; `clear` resets to it.
    pub fn initial_capacity(&self) -> usize {
        1usize << self.initial_bits
    }

    pub fn fill_factor(&self) -> f64 {
        self.fill_factor
    }

    /// Current mutation stamp.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[cfg(test)]
    pub(crate) fn factor(&self) -> u32 {
        self.factor
    }

    #[inline]
    fn bucket_of(&self, hash: u32) -> usize {
        (hash.wrapping_mul(self.factor) >> (32 - self.bits)) as usize
    }

    /// Locate the entry with this hash satisfying `eq`.
    ///
    /// Chain probing compares the cached node hash first; `eq` runs only on
    /// an exact hash match.
    pub fn find(&self, hash: u32, mut eq: impl FnMut(&T) -> bool) -> Option<DefaultKey> {
        let mut cur = self.buckets[self.bucket_of(hash)];
        while let Some(key) = cur {
            let node = &self.nodes[key];
            if node.hash == hash && eq(&node.item) {
                return Some(key);
            }
            cur = node.next;
        }
        None
    }

    /// Borrow the payload of a live entry.
    pub fn get(&self, key: DefaultKey) -> Option<&T> {
        self.nodes.get(key).map(|n| &n.item)
    }

    /// Rewrite the payload of a live entry in place.
    ///
    /// Counts as a mutation: outstanding cursors are invalidated even
    /// though no node is linked or unlinked.
    pub fn update<R>(&mut self, key: DefaultKey, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let node = self.nodes.get_mut(key)?;
        let out = f(&mut node.item);
        self.revision += 1;
        Some(out)
    }

    /// Insert an entry the caller has verified to be absent.
    ///
    /// Growth is evaluated first: if this entry would push the live count
    /// past `capacity * fill_factor`, the table doubles before placement.
    /// The new node is pushed at the head of its chain.
    pub fn insert(&mut self, hash: u32, item: T) -> DefaultKey {
        if self.nodes.len() + 1 > self.threshold {
            self.grow();
        }
        let bucket = self.bucket_of(hash);
        let head = self.buckets[bucket];
        let key = self.nodes.insert(Node {
            hash,
            next: head,
            item,
        });
        self.buckets[bucket] = Some(key);
        self.revision += 1;
        key
    }

    /// Unlink and return the entry behind `key`, or `None` for a stale key.
    pub fn remove_key(&mut self, key: DefaultKey) -> Option<T> {
        let hash = self.nodes.get(key)?.hash;
        let bucket = self.bucket_of(hash);
        let mut prev: Option<DefaultKey> = None;
        let mut cur = self.buckets[bucket];
        while let Some(k) = cur {
            if k == key {
                let next = self.nodes[k].next;
                match prev {
                    None => self.buckets[bucket] = next,
                    Some(p) => self.nodes[p].next = next,
                }
                let node = self
                    .nodes
                    .remove(k)
                    .expect("node is live while being unlinked");
                self.revision += 1;
                return Some(node.item);
            }
            prev = Some(k);
            cur = self.nodes[k].next;
        }
        // A live key always sits in the chain its cached hash maps to.
        None
    }

    /// Double the bucket count (no-op at the 2^32 ceiling).
    pub fn grow(&mut self) {
        if self.bits < MAX_BITS {
            self.rehash(self.bits + 1);
        }
    }

    /// Halve the bucket count, flooring at 8 buckets.
    ///
    /// Provided as a primitive; the bag layer never invokes it.
    pub fn shrink(&mut self) {
        if self.bits > SHRINK_FLOOR_BITS {
            self.rehash(self.bits - 1);
        }
    }

    fn rehash(&mut self, bits: u32) {
        let old = std::mem::replace(&mut self.buckets, vec![None; 1usize << bits]);
        self.bits = bits;
        self.threshold = threshold_for(bits, self.fill_factor);
        // Walk old buckets in index order; same multiplier, new bit count.
        for head in old {
            let mut cur = head;
            while let Some(key) = cur {
                cur = self.nodes[key].next;
                let hash = self.nodes[key].hash;
                let bucket = self.bucket_of(hash);
                let new_head = self.buckets[bucket];
                self.nodes[key].next = new_head;
                self.buckets[bucket] = Some(key);
            }
        }
        self.revision += 1;
    }

    /// Drop every entry and reset to the construction-time capacity class.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.bits = self.initial_bits;
        self.threshold = threshold_for(self.bits, self.fill_factor);
        self.buckets.clear();
        self.buckets.resize(1usize << self.bits, None);
        self.revision += 1;
    }

    /// Replace this table's contents wholesale with `other`'s.
    ///
    /// The adopting table keeps its construction-time capacity class, and
    /// the resulting revision is strictly larger than both inputs so no
    /// pre-swap cursor can ever match the fresh stamp.
    pub(crate) fn adopt(&mut self, mut other: ChainTable<T>) {
        other.initial_bits = self.initial_bits;
        // The adopter's identity survives the swap: it is still the same
        // collection as far as any caller-held cursor is concerned.
        other.table_id = self.table_id;
        other.revision = self.revision.max(other.revision) + 1;
        *self = other;
    }

    /// A cursor positioned before the first entry, stamped with the
    /// current revision.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            table: self.table_id,
            revision: self.revision,
            bucket: 0,
            node: None,
            started: false,
        }
    }

    /// Step `cursor` forward and borrow the entry it lands on, or `None`
    /// past the end. Fails fast with `Error::ConcurrentModification` if
    /// the table has mutated since the cursor was created, or if the
    /// cursor was minted by a different table.
    ///
    /// Iteration order is bucket-index order, head first within a chain;
    /// it is not insertion order and is unspecified across a rehash.
    pub fn advance<'a>(&'a self, cursor: &mut Cursor) -> Result<Option<&'a T>, Error> {
        if cursor.table != self.table_id || cursor.revision != self.revision {
            return Err(Error::ConcurrentModification);
        }
        if !cursor.started {
            cursor.started = true;
            self.seek(cursor, 0);
        } else if let Some(key) = cursor.node {
            match self.nodes[key].next {
                Some(next) => cursor.node = Some(next),
                None => {
                    let from = cursor.bucket + 1;
                    self.seek(cursor, from);
                }
            }
        }
        // Past the end the cursor stays put and keeps returning None.
        Ok(cursor.node.map(|key| &self.nodes[key].item))
    }

    /// Scan forward from bucket `from` for the next non-empty chain head.
    fn seek(&self, cursor: &mut Cursor, from: usize) {
        for bucket in from..self.buckets.len() {
            if let Some(head) = self.buckets[bucket] {
                cursor.bucket = bucket;
                cursor.node = Some(head);
                return;
            }
        }
        cursor.bucket = self.buckets.len();
        cursor.node = None;
    }

    /// Borrowing iterator over all entries in bucket order.
    ///
    /// The shared borrow pins the revision for the iterator's lifetime, so
    /// this walk cannot observe a concurrent modification.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            table: self,
            cursor: self.cursor(),
        }
    }

    /// Structural self-audit: every node reachable exactly once, each node
    /// linked in the bucket its cached hash maps to, no cycles, bucket
    /// array sized to the current bit count. Diagnostic, for test suites.
    pub fn check(&self) -> bool {
        if self.buckets.len() != 1usize << self.bits {
            return false;
        }
        let mut reached = 0usize;
        for (bucket, head) in self.buckets.iter().enumerate() {
            let mut cur = *head;
            let mut steps = 0usize;
            while let Some(key) = cur {
                let Some(node) = self.nodes.get(key) else {
                    return false;
                };
                if self.bucket_of(node.hash) != bucket {
                    return false;
                }
                steps += 1;
                if steps > self.nodes.len() {
                    return false;
                }
                cur = node.next;
            }
            reached += steps;
        }
        reached == self.nodes.len()
    }
}

/// Restartable iteration position: the minting table's identity and
/// revision at creation plus the current chain node.
///
/// A cursor is bound to the table that minted it. Two cursors compare
/// equal only if they sit at the same position of the same table
/// instance, and advancing a cursor on any other table fails like any
/// other invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    table: u64,
    revision: u64,
    bucket: usize,
    node: Option<DefaultKey>,
    started: bool,
}

/// Borrowing bucket-order iterator over a `ChainTable`.
pub struct Iter<'a, T> {
    table: &'a ChainTable<T>,
    cursor: Cursor,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.table.advance(&mut self.cursor).ok().flatten()
    }
}

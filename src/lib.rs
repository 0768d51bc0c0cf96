//! hash-bag: a single-threaded counting multiset ("bag") over a custom
//! chained hash table with randomized multiplicative hashing.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: build `Bag` in safe, verifiable layers so each piece can be
//!   reasoned about independently.
//! - Layers:
//!   - `ChainTable<T>`: structural layer — a bucket array of singly
//!     linked chains whose nodes live in a slotmap arena. Hash-agnostic:
//!     callers supply a 32-bit hash and an equality predicate per
//!     operation. Owns capacity (powers of two), the fill-factor growth
//!     threshold, the per-instance random odd multiplier, and the
//!     revision stamp that fail-fasts outstanding cursors.
//!   - `Multiplicity<T, C>`: the stored unit — a value plus its
//!     occurrence count. Identity (hash/equality) is the value only; the
//!     count is payload, so one physical entry represents every logical
//!     occurrence of a value.
//!   - `Bag<T, C, S>`: public multiset API — add/remove single logical
//!     occurrences, whole-entry removal, multiset intersection with
//!     multiplicity, enumeration of distinct values and of every
//!     occurrence, and post-mutation event hooks.
//!
//! Constraints
//! - Single-threaded: no internal locking, no operation suspends;
//!   cross-thread use without external synchronization is out of contract.
//! - Invariant after every public operation: `size == Σ count` over live
//!   entries, no entry persists at count zero, and at most one entry
//!   exists per distinct value.
//! - Bucket placement is `(hash * factor) >> (32 - bits)` with a random
//!   odd `factor` fixed at construction: engineered-collision flooding
//!   against the value type's hash function does not translate into
//!   predictable bucket placement. A required property, not a tunable.
//! - Fail-fast iteration: cursors capture the table revision at creation
//!   and every step re-checks it; any intervening mutation surfaces as
//!   `Error::ConcurrentModification` instead of an undefined walk.
//!
//! Why this split?
//! - Localize invariants: the table knows nothing about counts, the bag
//!   nothing about buckets; each layer has a small, precise contract.
//! - No unsafe: chain links are slotmap keys, so removal, rehashing, and
//!   cursor positions never touch raw pointers.
//! - Clear failure boundaries: "not found" is always a normal return;
//!   errors are reserved for invalid construction parameters, empty-bag
//!   "choose", and cursor invalidation.

mod bag;
mod bag_proptest;
pub mod chain_table;
pub mod counter;
mod error;
mod events;
mod multiplicity;

// Public surface
pub use bag::{Bag, Counts, Iter, UniqueItems};
pub use chain_table::{ChainTable, Cursor, DEFAULT_FILL_FACTOR, MIN_CAPACITY};
pub use counter::Count;
pub use error::{Error, MAX_FILL_FACTOR, MIN_FILL_FACTOR};
pub use events::BagEvents;

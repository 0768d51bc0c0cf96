//! Failure taxonomy for the bag and its table.
//!
//! "Not found" is never an error anywhere in this crate; lookups and
//! removals report absence through `Option`/`bool` returns. The variants
//! here cover the only conditions surfaced as failures: invalid
//! construction parameters, operations that require a non-empty bag, and
//! cursor invalidation after a mutation. `ReadOnly` is carried for
//! wrapping layers that flag an instance immutable; the core itself never
//! raises it.

use thiserror::Error;

/// Minimum accepted fill factor.
pub const MIN_FILL_FACTOR: f64 = 0.10;
/// Maximum accepted fill factor.
pub const MAX_FILL_FACTOR: f64 = 0.90;

/// Errors reported by constructors and cursor advancement.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    /// Initial capacity must be positive.
    #[error("initial capacity must be positive (got {0})")]
    InvalidCapacity(usize),

    /// Fill factor outside the accepted range.
    #[error("fill factor must lie within [{MIN_FILL_FACTOR}, {MAX_FILL_FACTOR}] (got {0})")]
    InvalidFillFactor(f64),

    /// An operation that requires at least one element ran on an empty bag.
    #[error("operation requires a non-empty bag")]
    EmptyCollection,

    /// A cursor observed a revision newer than the one it captured.
    #[error("collection was modified during iteration")]
    ConcurrentModification,

    /// Mutation attempted on an instance flagged read-only by a wrapping
    /// layer.
    #[error("collection is read-only")]
    ReadOnly,
}

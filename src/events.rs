//! Post-mutation hook points.
//!
//! The bag's only obligation toward the surrounding event-publication
//! framework is to call these hooks at the correct moment with the
//! resolved value and count: immediately after a mutation has settled the
//! entry's final state. Subscription management, fan-out, and read-only
//! enforcement live in the wrapping layers.

use crate::counter::Count;

/// Observer for resolved bag mutations. All hooks default to no-ops so
/// implementors override only what they forward.
pub trait BagEvents<T, C: Count> {
    /// An occurrence of `item` was added; `count` is the resolved total.
    fn added(&mut self, item: &T, count: C) {
        let _ = (item, count);
    }

    /// Occurrences of `item` were removed; `count` is the resolved total,
    /// zero when the entry was physically deleted.
    fn removed(&mut self, item: &T, count: C) {
        let _ = (item, count);
    }

    /// The bag was cleared wholesale.
    fn cleared(&mut self) {}
}

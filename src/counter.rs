//! Generic occurrence-count widths.
//!
//! The bag is parameterized over its count representation instead of being
//! duplicated per integer width. `Count` is the small arithmetic
//! capability the bag needs: zero/one, checked add/sub, ordering, and a
//! conversion for repeat lengths. Implemented for `u32`, `u64`, and
//! `usize`.

use core::fmt::Debug;

/// Arithmetic capability for occurrence counts and the cached bag size.
pub trait Count: Copy + Ord + Debug {
    /// The additive identity; never stored as a live count.
    const ZERO: Self;
    /// The count of a freshly added single occurrence.
    const ONE: Self;

    /// Add, returning `None` on overflow.
    fn checked_add(self, rhs: Self) -> Option<Self>;
    /// Subtract, returning `None` on underflow.
    fn checked_sub(self, rhs: Self) -> Option<Self>;
    /// Widening/narrowing view for repeat lengths during enumeration.
    fn as_usize(self) -> usize;
}

macro_rules! impl_count {
    ($($ty:ty),* $(,)?) => {$(
        impl Count for $ty {
            const ZERO: Self = 0;
            const ONE: Self = 1;

            #[inline]
            fn checked_add(self, rhs: Self) -> Option<Self> {
                <$ty>::checked_add(self, rhs)
            }

            #[inline]
            fn checked_sub(self, rhs: Self) -> Option<Self> {
                <$ty>::checked_sub(self, rhs)
            }

            #[inline]
            fn as_usize(self) -> usize {
                self as usize
            }
        }
    )*};
}

impl_count!(u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::Count;

    /// Invariant: checked arithmetic reports overflow/underflow instead of
    /// wrapping, for every supported width.
    #[test]
    fn checked_ops_report_edges() {
        assert_eq!(<u32 as Count>::checked_add(u32::MAX, 1), None);
        assert_eq!(<u64 as Count>::checked_add(u64::MAX, 1), None);
        assert_eq!(<u32 as Count>::checked_sub(0, 1), None);
        assert_eq!(<u64 as Count>::checked_sub(0, 1), None);
        assert_eq!(<usize as Count>::checked_sub(0, 1), None);
    }

    /// Invariant: the same generic code runs unchanged at both widths.
    #[test]
    fn zero_one_identities() {
        fn bump<C: Count>(c: C) -> C {
            c.checked_add(C::ONE).expect("no overflow in test range")
        }
        assert_eq!(bump(<u32 as Count>::ZERO), 1u32);
        assert_eq!(bump(<u64 as Count>::ZERO), 1u64);
        assert_eq!(<u64 as Count>::ONE.as_usize(), 1);
    }
}

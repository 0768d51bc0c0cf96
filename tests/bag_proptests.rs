// Public-surface property tests for Bag.
//
// The in-crate proptest module does full state-machine equivalence
// against a count model; these properties exercise the published API
// contracts directly.

use hash_bag::Bag;
use proptest::prelude::*;

proptest! {
    // Property: for every value, contains_count equals the number of
    // successful adds minus successful removes — clipping happens
    // naturally because remove on an absent value fails without effect.
    #[test]
    fn prop_count_ledger(ops in proptest::collection::vec((0u8..2, 0u8..5), 1..200)) {
        let mut bag: Bag<u8> = Bag::new();
        let mut ledger = [0u64; 5];

        for (op, v) in ops {
            match op {
                0 => {
                    bag.add(v);
                    ledger[v as usize] += 1;
                }
                _ => {
                    if bag.remove(&v).is_some() {
                        ledger[v as usize] -= 1;
                    }
                }
            }
        }

        for v in 0u8..5 {
            prop_assert_eq!(bag.contains_count(&v), ledger[v as usize]);
        }
        prop_assert_eq!(bag.size(), ledger.iter().sum::<u64>());
        prop_assert_eq!(bag.iter().count(), bag.len());
        prop_assert!(bag.check());
    }

    // Property: growth never loses a (value, count) pair. Loading enough
    // distinct values forces at least one rehash with the default
    // 16-bucket table.
    #[test]
    fn prop_growth_preserves_counts(
        counts in proptest::collection::btree_map(any::<u16>(), 1u64..4, 30..300)
    ) {
        let mut bag: Bag<u16> = Bag::new();
        for (&v, &c) in &counts {
            for _ in 0..c {
                bag.add(v);
            }
        }
        for (&v, &c) in &counts {
            prop_assert_eq!(bag.contains_count(&v), c);
        }
        prop_assert_eq!(bag.size(), counts.values().sum::<u64>());
        prop_assert_eq!(bag.distinct_len(), counts.len());
        prop_assert!(bag.check());
    }

    // Property: an add/remove pair leaves size and the value's count
    // exactly where they were.
    #[test]
    fn prop_add_remove_neutral(
        seed in proptest::collection::vec(0u8..8, 0..40),
        probe in 0u8..8,
    ) {
        let mut bag: Bag<u8> = Bag::new();
        bag.add_all(seed);
        let size_before = bag.size();
        let count_before = bag.contains_count(&probe);

        bag.add(probe);
        prop_assert_eq!(bag.remove(&probe), Some(count_before));
        prop_assert_eq!(bag.size(), size_before);
        prop_assert_eq!(bag.contains_count(&probe), count_before);
        prop_assert!(bag.check());
    }
}

// Cursor invalidation suite.
//
// Cursors capture the table revision at creation; every advance
// re-checks it. The invariants exercised:
// - Any mutation between steps surfaces as ConcurrentModification on the
//   next advance, including count-only rewrites with no relinking.
// - Iteration is restartable: a fresh cursor observes the new state.
// - An undisturbed cursor walks every distinct entry exactly once and
//   then parks on the end sentinel.

use hash_bag::{Bag, Error};

fn bag_of(items: &[&'static str]) -> Bag<&'static str> {
    let mut bag = Bag::new();
    bag.add_all(items.iter().copied());
    bag
}

// Test: undisturbed traversal.
// Assumes: no mutation between steps.
// Verifies: every distinct (value, count) pair is seen once; the end
// sentinel repeats.
#[test]
fn traversal_without_mutation() {
    let bag = bag_of(&["a", "b", "a", "c"]);
    let mut cursor = bag.cursor();
    let mut seen = Vec::new();
    while let Some((item, count)) = bag.advance(&mut cursor).unwrap() {
        seen.push((*item, count));
    }
    seen.sort();
    assert_eq!(seen, [("a", 2), ("b", 1), ("c", 1)]);
    assert_eq!(bag.advance(&mut cursor).unwrap(), None);
    assert_eq!(bag.advance(&mut cursor).unwrap(), None);
}

// Test: structural mutations invalidate.
// Assumes: add of a new value, removal, and clear are structural.
// Verifies: the next step after each mutation reports
// ConcurrentModification.
#[test]
fn structural_mutations_invalidate() {
    let mut bag = bag_of(&["a", "b"]);

    let mut cursor = bag.cursor();
    bag.add("c");
    assert_eq!(
        bag.advance(&mut cursor),
        Err(Error::ConcurrentModification)
    );

    let mut cursor = bag.cursor();
    bag.remove(&"b");
    assert_eq!(
        bag.advance(&mut cursor),
        Err(Error::ConcurrentModification)
    );

    let mut cursor = bag.cursor();
    bag.remove_all_copies(&"a");
    assert_eq!(
        bag.advance(&mut cursor),
        Err(Error::ConcurrentModification)
    );

    let mut cursor = bag.cursor();
    bag.clear();
    assert_eq!(
        bag.advance(&mut cursor),
        Err(Error::ConcurrentModification)
    );
}

// Test: count-only mutations invalidate too.
// Assumes: adding an existing value rewrites the entry payload without
// linking a new node.
// Verifies: the rewrite still trips an in-flight cursor.
#[test]
fn count_rewrite_invalidates() {
    let mut bag = bag_of(&["a", "b"]);
    let mut cursor = bag.cursor();
    bag.advance(&mut cursor).unwrap();

    bag.add("a"); // existing value: count bump, no new node
    assert_eq!(
        bag.advance(&mut cursor),
        Err(Error::ConcurrentModification)
    );
}

// Test: retain_all's table swap invalidates.
// Assumes: the swap installs a fresh table with a strictly newer stamp.
// Verifies: pre-swap cursors cannot resume on the new table.
#[test]
fn retain_all_swap_invalidates() {
    let mut bag = bag_of(&["a", "a", "b"]);
    let mut cursor = bag.cursor();
    bag.advance(&mut cursor).unwrap();

    bag.retain_all(["a"]);
    assert_eq!(
        bag.advance(&mut cursor),
        Err(Error::ConcurrentModification)
    );
}

// Test: restartability.
// Assumes: invalidation poisons only the old cursor, not the bag.
// Verifies: a fresh cursor walks the post-mutation state cleanly.
#[test]
fn iteration_restarts_after_invalidation() {
    let mut bag = bag_of(&["a", "b", "c"]);
    let mut stale = bag.cursor();
    bag.remove_all_copies(&"b");
    assert_eq!(bag.advance(&mut stale), Err(Error::ConcurrentModification));

    // The stale cursor stays invalid.
    assert_eq!(bag.advance(&mut stale), Err(Error::ConcurrentModification));

    let mut fresh = bag.cursor();
    let mut seen = Vec::new();
    while let Some((item, _count)) = bag.advance(&mut fresh).unwrap() {
        seen.push(*item);
    }
    seen.sort();
    assert_eq!(seen, ["a", "c"]);
}

// Test: cursors are bound to the bag that minted them.
// Assumes: two bags with identical contents still have distinct
// identities.
// Verifies: same-position cursors from different bags compare unequal,
// and a foreign cursor cannot advance on another bag.
#[test]
fn cursors_are_bag_specific() {
    let a = bag_of(&["a", "b"]);
    let b = bag_of(&["a", "b"]);

    assert_ne!(a.cursor(), b.cursor());

    let mut foreign = a.cursor();
    assert_eq!(b.advance(&mut foreign), Err(Error::ConcurrentModification));
    assert!(a.advance(&mut foreign).unwrap().is_some());
}

// Test: borrowing iterators are immune by construction.
// Assumes: iter()/unique_items() hold a shared borrow for their whole
// lifetime, so no mutation can interleave.
// Verifies: they complete without error paths.
#[test]
fn borrowing_iterators_complete() {
    let bag = bag_of(&["x", "y", "x"]);
    assert_eq!(bag.iter().count(), 3);
    assert_eq!(bag.unique_items().count(), 2);
    assert_eq!(bag.counts().count(), 2);
}

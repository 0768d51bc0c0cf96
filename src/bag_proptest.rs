#![cfg(test)]

// Property tests for Bag kept inside the crate so they do not require
// feature gates to access internal modules.

use crate::bag::Bag;
use hashbrown::HashMap;
use proptest::prelude::*;
use std::hash::{BuildHasher, Hasher};

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Add(usize),
    Remove(usize),
    RemoveAllCopies(usize),
    ContainsCount(usize),
    RetainAll(Vec<usize>),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=6).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs.clone());
        let op = prop_oneof![
            4 => idx.clone().prop_map(OpI::Add),
            3 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::RemoveAllCopies),
            2 => idx.clone().prop_map(OpI::ContainsCount),
            1 => proptest::collection::vec(proptest::sample::select(idxs), 0..12)
                .prop_map(OpI::RetainAll),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn model_size(model: &HashMap<String, u64>) -> u64 {
    model.values().sum()
}

fn sorted_expansion(model: &HashMap<String, u64>) -> Vec<String> {
    let mut out = Vec::new();
    for (k, &c) in model {
        for _ in 0..c {
            out.push(k.clone());
        }
    }
    out.sort();
    out
}

fn run_scenario<S>(pool: Vec<String>, ops: Vec<OpI>, mut sut: Bag<String, u64, S>)
where
    S: BuildHasher + Clone,
{
    let mut model: HashMap<String, u64> = HashMap::new();

    for op in ops {
        match op {
            OpI::Add(i) => {
                let k = pool[i].clone();
                sut.add(k.clone());
                *model.entry(k).or_insert(0) += 1;
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let expected = match model.get_mut(k) {
                    Some(c) => {
                        *c -= 1;
                        let remaining = *c;
                        if remaining == 0 {
                            model.remove(k);
                        }
                        Some(remaining)
                    }
                    None => None,
                };
                assert_eq!(sut.remove(k.as_str()), expected);
            }
            OpI::RemoveAllCopies(i) => {
                let k = &pool[i];
                let expected = model.remove(k);
                assert_eq!(sut.remove_all_copies(k.as_str()), expected);
            }
            OpI::ContainsCount(i) => {
                let k = &pool[i];
                let expected = model.get(k).copied().unwrap_or(0);
                assert_eq!(sut.contains_count(k.as_str()), expected);
                assert_eq!(sut.contains(k.as_str()), expected > 0);
            }
            OpI::RetainAll(items) => {
                // Expected: per value, min(requested multiplicity,
                // available count); unknown inputs are silently dropped.
                let mut requested: HashMap<String, u64> = HashMap::new();
                for &i in &items {
                    *requested.entry(pool[i].clone()).or_insert(0) += 1;
                }
                let mut expected: HashMap<String, u64> = HashMap::new();
                for (k, &want) in &requested {
                    let have = model.get(k).copied().unwrap_or(0);
                    let take = want.min(have);
                    if take > 0 {
                        expected.insert(k.clone(), take);
                    }
                }
                sut.retain_all(items.iter().map(|&i| pool[i].clone()));
                model = expected;
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
            }
            OpI::Iterate => {
                let mut all: Vec<String> = sut.iter().cloned().collect();
                all.sort();
                assert_eq!(all, sorted_expansion(&model));

                let mut uniques: Vec<String> = sut.unique_items().cloned().collect();
                uniques.sort();
                let mut keys: Vec<String> = model.keys().cloned().collect();
                keys.sort();
                assert_eq!(uniques, keys);
            }
        }

        // Post-conditions after each op: cached size parity and the
        // structural + counting self-audit.
        assert_eq!(sut.size(), model_size(&model));
        assert_eq!(sut.distinct_len(), model.len());
        assert_eq!(sut.is_empty(), model.is_empty());
        assert!(sut.check(), "self-audit failed after {:?}", model);
    }
}

// Property: state-machine equivalence against a hashbrown count model.
// Invariants exercised across random operation sequences:
// - size == Σ count, and the full enumeration has exactly that length.
// - contains_count equals adds minus removes, clipped at zero.
// - remove returns the remaining count and deletes entries exactly at zero.
// - retain_all keeps min(requested, available) per value and drops unknowns.
// - check() holds in every reachable state.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(pool, ops, Bag::new());
    }
}

// Collision variant using a constant hasher: every value lands in one
// chain, stressing equality probing and chain relinking.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(pool, ops, Bag::with_hasher(ConstBuildHasher));
    }
}

#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can check
// structural invariants that are not part of the public API.

use crate::hash_table::HashTable;
use crate::key_hasher::KeyHasher;
use hashbrown::HashMap;
use proptest::prelude::*;
use std::collections::BTreeSet;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    Remove(usize),
    Get(usize),
    Has(String),
    Mutate(usize, i32),
    Iterate,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let has_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![
                has_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Has),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Runs `ops` against both the table and a hashbrown model, checking after
// every step:
// - `get`/`has` parity with the model, including for absent keys.
// - `set` returns the overwritten value; `remove` returns the removed one.
// - `entries`/`keys`/`values` have `len` elements and the model's key set.
// - Structural invariants: every entry reachable exactly once, each in the
//   slot its key hashes to, capacity a power of two >= 16.
// - Load factor stays at or below the growth threshold.
fn run_scenario<H: KeyHasher>(
    mut sut: HashTable<i32, H>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Set(i, v) => {
                let k = &pool[i];
                let prev = sut.set(k.as_str(), v);
                prop_assert_eq!(prev, model.insert(k.clone(), v));
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k), model.remove(k));
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
            }
            OpI::Has(s) => {
                prop_assert_eq!(sut.has(&s), model.contains_key(&s));
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                match (sut.get_mut(k), model.get_mut(k)) {
                    (Some(a), Some(b)) => {
                        *a = a.saturating_add(d);
                        *b = b.saturating_add(d);
                    }
                    (None, None) => {}
                    (a, b) => prop_assert!(false, "get_mut mismatch: {:?} vs {:?}", a, b),
                }
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<String> = sut.keys().into_iter().map(str::to_owned).collect();
                let m_keys: BTreeSet<String> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
                for (k, v) in sut.entries() {
                    prop_assert_eq!(Some(v), model.get(k));
                }
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), crate::INITIAL_CAPACITY);
            }
        }

        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(sut.entries().len(), sut.len());
        prop_assert_eq!(sut.values().len(), sut.len());
        prop_assert!(sut.load_factor() <= crate::LOAD_FACTOR);
    }
    Ok(())
}

// Property: state-machine equivalence against hashbrown::HashMap under the
// default polynomial hasher.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(HashTable::new(), &pool, ops)?;
    }
}

// Constant hasher: every key shares slot 0, so every operation walks one
// long chain. Stresses append, head removal and mid-chain splicing.
#[derive(Clone, Default)]
struct ConstHasher;
impl KeyHasher for ConstHasher {
    fn hash_key(&self, _key: &str) -> u64 {
        0
    }
}

// Property: same invariants as above under total collision.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(HashTable::with_hasher(ConstHasher), &pool, ops)?;
    }
}

// Property: inserting a run of distinct keys keeps every earlier key
// retrievable across each growth step.
proptest! {
    #[test]
    fn prop_growth_preserves_entries(n in 1usize..400) {
        let mut t = HashTable::new();
        for i in 0..n {
            t.set(format!("g{i}"), i);
            prop_assert!(t.capacity().is_power_of_two());
        }
        prop_assert_eq!(t.len(), n);
        for i in 0..n {
            prop_assert_eq!(t.get(&format!("g{i}")), Some(&i));
        }
        t.assert_invariants();
    }
}

//! HashTable: string-keyed separate chaining over a generational arena.

use crate::key_hasher::{KeyHasher, Prime31};
use core::fmt;
use core::iter::FusedIterator;
use core::mem;
use slotmap::{DefaultKey, SlotMap};

/// Slot count of a fresh or cleared table.
pub const INITIAL_CAPACITY: usize = 16;

/// Growth threshold for `len / capacity`.
pub const LOAD_FACTOR: f64 = 0.75;

// LOAD_FACTOR as an exact ratio, so the growth check stays in integers.
const LOAD_NUM: usize = 3;
const LOAD_DEN: usize = 4;

#[derive(Clone, Debug)]
struct Entry<V> {
    key: String,
    value: V,
    next: Option<DefaultKey>, // successor in this entry's chain
}

/// Result of walking one chain for a key.
///
/// When `found` is `None`, `prev` is the tail of the chain (or `None` if the
/// slot is empty), which is where a new entry gets appended.
#[derive(Copy, Clone, Debug)]
struct Located {
    found: Option<DefaultKey>,
    prev: Option<DefaultKey>,
}

/// A hash table mapping `String` keys to values of type `V`.
///
/// Keys are hashed with `H` and reduced to one of `capacity()` slots. Each
/// slot heads a singly linked chain of entries; the chain links are arena
/// keys into a `SlotMap` that owns every entry.
pub struct HashTable<V, H = Prime31> {
    hasher: H,
    slots: Vec<Option<DefaultKey>>, // chain heads, len == capacity
    entries: SlotMap<DefaultKey, Entry<V>>,
}

impl<V> HashTable<V> {
    pub fn new() -> Self {
        Self::with_hasher(Prime31)
    }
}

impl<V, H> Default for HashTable<V, H>
where
    H: KeyHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(H::default())
    }
}

impl<V: Clone, H: Clone> Clone for HashTable<V, H> {
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            slots: self.slots.clone(),
            entries: self.entries.clone(),
        }
    }
}

impl<V, H> HashTable<V, H>
where
    H: KeyHasher,
{
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            hasher,
            slots: vec![None; INITIAL_CAPACITY],
            entries: SlotMap::with_key(),
        }
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current number of slots. Always a power of two, at least
    /// [`INITIAL_CAPACITY`].
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    // Capacity is a power of two, so masking is `hash mod capacity`.
    #[inline]
    fn slot_index(&self, key: &str) -> usize {
        let mask = (self.slots.len() - 1) as u64;
        (self.hasher.hash_key(key) & mask) as usize
    }

    fn locate_in(&self, slot: usize, key: &str) -> Located {
        let mut prev = None;
        let mut cur = self.slots[slot];
        while let Some(k) = cur {
            let e = &self.entries[k];
            if e.key == key {
                return Located {
                    found: Some(k),
                    prev,
                };
            }
            prev = Some(k);
            cur = e.next;
        }
        Located { found: None, prev }
    }

    fn locate(&self, key: &str) -> Located {
        self.locate_in(self.slot_index(key), key)
    }

    /// Returns the value stored under `key`, or `None` if absent.
    pub fn get(&self, key: &str) -> Option<&V> {
        let k = self.locate(key).found?;
        Some(&self.entries[k].value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let k = self.locate(key).found?;
        Some(&mut self.entries[k].value)
    }

    pub fn has(&self, key: &str) -> bool {
        self.locate(key).found.is_some()
    }

    /// Inserts or overwrites the value for `key`.
    ///
    /// An existing entry is updated in place and its previous value is
    /// returned. A new key is appended to the tail of its chain; if adding it
    /// would push the load factor above [`LOAD_FACTOR`], the table doubles
    /// first so the entry lands in a slot of the grown table.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        let mut slot = self.slot_index(&key);
        let mut at = self.locate_in(slot, &key);

        if let Some(k) = at.found {
            return Some(mem::replace(&mut self.entries[k].value, value));
        }

        if self.would_overload(self.len() + 1) {
            self.resize();
            slot = self.slot_index(&key);
            at = self.locate_in(slot, &key);
        }

        let node = self.entries.insert(Entry {
            key,
            value,
            next: None,
        });
        self.append(slot, at.prev, node);
        None
    }

    /// Removes `key`, returning its value. Absent keys are a no-op.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let slot = self.slot_index(key);
        let Located { found, prev } = self.locate_in(slot, key);
        let entry = self.entries.remove(found?)?;

        // Splice around the removed entry so the rest of the chain survives.
        match prev {
            Some(p) => self.entries[p].next = entry.next,
            None => self.slots[slot] = entry.next,
        }
        Some(entry.value)
    }

    /// Drops every entry and resets capacity to [`INITIAL_CAPACITY`].
    pub fn clear(&mut self) {
        log::trace!("clearing hash table, discarding {} entries", self.len());
        self.slots = vec![None; INITIAL_CAPACITY];
        self.entries = SlotMap::with_key();
    }

    /// Iterates entries in slot order, each chain head to tail.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            walk: ChainWalk::new(&self.slots, &self.entries),
        }
    }

    /// Snapshot of all `(key, value)` pairs in [`iter`](Self::iter) order.
    pub fn entries(&self) -> Vec<(&str, &V)> {
        self.iter().collect()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.iter().map(|(k, _)| k).collect()
    }

    pub fn values(&self) -> Vec<&V> {
        self.iter().map(|(_, v)| v).collect()
    }

    fn would_overload(&self, len: usize) -> bool {
        len.saturating_mul(LOAD_DEN) > self.capacity().saturating_mul(LOAD_NUM)
    }

    // `tail` must be the last entry of `slot`'s chain, or `None` when the
    // slot is empty.
    fn append(&mut self, slot: usize, tail: Option<DefaultKey>, node: DefaultKey) {
        match tail {
            Some(t) => {
                let t = &mut self.entries[t];
                debug_assert!(t.next.is_none(), "append target is not the chain tail");
                t.next = Some(node);
            }
            None => {
                debug_assert!(self.slots[slot].is_none(), "append into non-empty slot");
                self.slots[slot] = Some(node);
            }
        }
    }

    /// Doubles capacity and relinks every entry against the new slot count.
    ///
    /// Entries are re-appended in current iteration order (slot ascending,
    /// chain order within a slot). Only links move; keys and values stay
    /// where the arena put them.
    fn resize(&mut self) {
        let old_capacity = self.capacity();
        let new_capacity = match old_capacity.checked_mul(2) {
            Some(c) => c,
            None => panic!("capacity overflow"),
        };
        log::debug!(
            "growing hash table from {} to {} slots ({} entries)",
            old_capacity,
            new_capacity,
            self.len()
        );

        let order: Vec<DefaultKey> = ChainWalk::new(&self.slots, &self.entries)
            .map(|(k, _)| k)
            .collect();

        self.slots = vec![None; new_capacity];
        let mut tails: Vec<Option<DefaultKey>> = vec![None; new_capacity];
        for k in order {
            let slot = self.slot_index(&self.entries[k].key);
            self.entries[k].next = None;
            self.append(slot, tails[slot], k);
            tails[slot] = Some(k);
        }
    }

    /// Length of every chain, indexed by slot.
    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn chain_lengths(&self) -> Vec<usize> {
        self.slots
            .iter()
            .map(|&head| {
                let mut n = 0;
                let mut cur = head;
                while let Some(k) = cur {
                    n += 1;
                    cur = self.entries[k].next;
                }
                n
            })
            .collect()
    }

    /// Panics if any structural invariant is broken.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let cap = self.capacity();
        assert!(cap.is_power_of_two(), "capacity {cap} is not a power of two");
        assert!(cap >= INITIAL_CAPACITY, "capacity {cap} below initial");

        let mut seen = std::collections::BTreeSet::new();
        let mut reachable = 0;
        for (slot, &head) in self.slots.iter().enumerate() {
            let mut cur = head;
            while let Some(k) = cur {
                let e = self.entries.get(k).expect("chain link to dead entry");
                assert_eq!(self.slot_index(&e.key), slot, "{:?} in wrong slot", e.key);
                assert!(seen.insert(e.key.clone()), "duplicate key {:?}", e.key);
                reachable += 1;
                assert!(reachable <= self.entries.len(), "cycle in chain {slot}");
                cur = e.next;
            }
        }
        assert_eq!(reachable, self.len(), "unreachable entries in arena");
    }
}

impl<V: fmt::Debug, H: KeyHasher> fmt::Debug for HashTable<V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, H> Extend<(K, V)> for HashTable<V, H>
where
    K: Into<String>,
    H: KeyHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K, V, H> FromIterator<(K, V)> for HashTable<V, H>
where
    K: Into<String>,
    H: KeyHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::default();
        table.extend(iter);
        table
    }
}

impl<'a, V, H: KeyHasher> IntoIterator for &'a HashTable<V, H> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Walks every chain in slot order, yielding arena keys with their entries.
struct ChainWalk<'a, V> {
    slots: core::slice::Iter<'a, Option<DefaultKey>>,
    entries: &'a SlotMap<DefaultKey, Entry<V>>,
    cur: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, V> ChainWalk<'a, V> {
    fn new(slots: &'a [Option<DefaultKey>], entries: &'a SlotMap<DefaultKey, Entry<V>>) -> Self {
        Self {
            slots: slots.iter(),
            entries,
            cur: None,
            remaining: entries.len(),
        }
    }
}

impl<'a, V> Iterator for ChainWalk<'a, V> {
    type Item = (DefaultKey, &'a Entry<V>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(k) = self.cur {
                let e = &self.entries[k];
                self.cur = e.next;
                self.remaining -= 1;
                return Some((k, e));
            }
            if self.remaining == 0 {
                return None;
            }
            self.cur = *self.slots.next()?;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// Iterator over the entries of a [`HashTable`].
pub struct Iter<'a, V> {
    walk: ChainWalk<'a, V>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next().map(|(_, e)| (e.key.as_str(), &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.walk.size_hint()
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> FusedIterator for Iter<'_, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[derive(Clone, Default)]
    struct ConstHasher;
    impl KeyHasher for ConstHasher {
        fn hash_key(&self, _key: &str) -> u64 {
            0 // every key lands in slot 0
        }
    }

    /// `n` distinct keys sharing `key`'s slot at the given table.
    fn colliding_keys<V, H: KeyHasher>(t: &HashTable<V, H>, n: usize) -> Vec<String> {
        let target = t.slot_index("k0");
        (0..)
            .map(|i| format!("k{i}"))
            .filter(|k| t.slot_index(k) == target)
            .take(n)
            .collect()
    }

    /// Invariant: a fresh table is empty with the initial capacity.
    #[test]
    fn new_table_is_empty() {
        let t: HashTable<i32> = HashTable::new();
        assert_eq!(t.len(), 0);
        assert!(t.is_empty());
        assert_eq!(t.capacity(), INITIAL_CAPACITY);
        assert!(t.entries().is_empty());
        t.assert_invariants();
    }

    /// Invariant: `set` then `get` returns the stored value; `has` agrees.
    #[test]
    fn set_get_has() {
        let mut t = HashTable::new();
        assert_eq!(t.set("a", 1), None);
        assert_eq!(t.set("b", 2), None);
        assert_eq!(t.get("a"), Some(&1));
        assert_eq!(t.get("b"), Some(&2));
        assert_eq!(t.get("c"), None);
        assert!(t.has("a"));
        assert!(!t.has("c"));
        assert_eq!(t.len(), 2);
        t.assert_invariants();
    }

    /// Invariant: `has` reports presence, not the result of the lookup call.
    #[test]
    fn has_is_false_for_absent_keys() {
        let mut t: HashTable<()> = HashTable::new();
        assert!(!t.has("missing"));
        t.set("present", ());
        assert!(t.has("present"));
        assert!(!t.has("missing"));
        t.remove("present");
        assert!(!t.has("present"));
    }

    /// Invariant: overwriting keeps the entry in place and `len` unchanged.
    #[test]
    fn overwrite_in_place() {
        let mut t = HashTable::new();
        t.set("k", 1);
        let before = t.locate("k").found;
        assert_eq!(t.set("k", 2), Some(1));
        assert_eq!(t.locate("k").found, before);
        assert_eq!(t.get("k"), Some(&2));
        assert_eq!(t.len(), 1);
    }

    /// Invariant: stored values that look "empty" are still found.
    #[test]
    fn falsy_values_are_present() {
        let mut t: HashTable<Option<i32>> = HashTable::new();
        t.set("none", None);
        t.set("zero", Some(0));
        assert!(t.has("none"));
        assert_eq!(t.get("none"), Some(&None));
        assert_eq!(t.get("zero"), Some(&Some(0)));
    }

    /// Invariant: the empty string is an ordinary key.
    #[test]
    fn empty_key() {
        let mut t = HashTable::new();
        t.set("", 7);
        assert_eq!(t.get(""), Some(&7));
        assert_eq!(t.remove(""), Some(7));
        assert!(t.is_empty());
    }

    /// Invariant: `get_mut` edits the stored value.
    #[test]
    fn get_mut_updates_value() {
        let mut t = HashTable::new();
        t.set("n", 10);
        *t.get_mut("n").unwrap() += 5;
        assert_eq!(t.get("n"), Some(&15));
        assert!(t.get_mut("absent").is_none());
    }

    /// Invariant: removing an absent key changes nothing.
    #[test]
    fn remove_absent_is_noop() {
        let mut t = HashTable::new();
        t.set("a", 1);
        t.set("b", 2);
        assert_eq!(t.remove("zzz"), None);
        assert_eq!(t.len(), 2);
        assert_eq!(t.get("a"), Some(&1));
        assert_eq!(t.get("b"), Some(&2));
        t.assert_invariants();
    }

    /// Invariant: colliding keys are appended, never overwrite the chain.
    #[test]
    fn collisions_append_to_tail() {
        let mut t = HashTable::with_hasher(ConstHasher);
        for (i, k) in ["a", "b", "c", "d"].iter().enumerate() {
            t.set(*k, i);
        }
        assert_eq!(t.chain_lengths()[0], 4);
        assert_eq!(t.keys(), vec!["a", "b", "c", "d"]);
        for (i, k) in ["a", "b", "c", "d"].iter().enumerate() {
            assert_eq!(t.get(k), Some(&i));
        }
        t.assert_invariants();
    }

    /// Invariant: removing the chain head promotes its successor.
    #[test]
    fn remove_head_keeps_rest_of_chain() {
        let mut t = HashTable::with_hasher(ConstHasher);
        t.set("a", 1);
        t.set("b", 2);
        t.set("c", 3);
        assert_eq!(t.remove("a"), Some(1));
        assert_eq!(t.keys(), vec!["b", "c"]);
        assert_eq!(t.get("b"), Some(&2));
        assert_eq!(t.get("c"), Some(&3));
        t.assert_invariants();
    }

    /// Invariant: removing mid-chain splices; later entries survive.
    #[test]
    fn remove_middle_splices() {
        let mut t = HashTable::with_hasher(ConstHasher);
        t.set("a", 1);
        t.set("b", 2);
        t.set("c", 3);
        assert_eq!(t.remove("b"), Some(2));
        assert_eq!(t.keys(), vec!["a", "c"]);
        assert_eq!(t.get("c"), Some(&3));
        assert_eq!(t.remove("c"), Some(3));
        assert_eq!(t.keys(), vec!["a"]);
        t.set("d", 4);
        assert_eq!(t.keys(), vec!["a", "d"]);
        t.assert_invariants();
    }

    /// Invariant: keys colliding under the default hasher are independently
    /// retrievable and removable.
    #[test]
    fn default_hasher_collisions() {
        let mut t = HashTable::new();
        let keys = colliding_keys(&t, 5);
        for (i, k) in keys.iter().enumerate() {
            t.set(k.as_str(), i);
        }
        assert_eq!(t.capacity(), INITIAL_CAPACITY);
        for (i, k) in keys.iter().enumerate() {
            assert_eq!(t.get(k), Some(&i));
        }
        for (i, k) in keys.iter().enumerate().rev() {
            assert_eq!(t.remove(k), Some(i));
            for (j, other) in keys.iter().enumerate().take(i) {
                assert_eq!(t.get(other), Some(&j));
            }
            t.assert_invariants();
        }
        assert!(t.is_empty());
    }

    /// Invariant: the 13th distinct key doubles capacity 16 -> 32; all keys survive.
    #[test]
    fn grows_on_thirteenth_insert() {
        let mut t = HashTable::new();
        for i in 0..12 {
            t.set(format!("key{i}"), i);
        }
        assert_eq!(t.capacity(), 16);
        t.set("key12", 12);
        assert_eq!(t.capacity(), 32);
        assert_eq!(t.len(), 13);
        for i in 0..13 {
            assert_eq!(t.get(&format!("key{i}")), Some(&i));
        }
        t.assert_invariants();
    }

    /// Invariant: overwrites never trigger growth.
    #[test]
    fn overwrite_does_not_grow() {
        let mut t = HashTable::new();
        for i in 0..12 {
            t.set(format!("key{i}"), i);
        }
        for i in 0..12 {
            t.set(format!("key{i}"), i * 10);
        }
        assert_eq!(t.capacity(), 16);
        assert_eq!(t.len(), 12);
    }

    /// Invariant: load factor never exceeds the threshold after a `set`.
    #[test]
    fn load_factor_bounded_across_growth() {
        let mut t = HashTable::new();
        for i in 0..1000 {
            t.set(i.to_string(), i);
            assert!(t.load_factor() <= LOAD_FACTOR, "load {} at {i}", t.load_factor());
        }
        assert_eq!(t.capacity(), 2048);
        t.assert_invariants();
    }

    /// Invariant: a collided chain keeps its relative order through a resize
    /// when its members still share a slot afterwards.
    #[test]
    fn resize_preserves_chain_order_under_const_hasher() {
        let mut t = HashTable::with_hasher(ConstHasher);
        let keys: Vec<String> = (0..20).map(|i| format!("c{i}")).collect();
        for k in &keys {
            t.set(k.as_str(), ());
        }
        assert_eq!(t.capacity(), 32);
        let got: Vec<&str> = t.keys();
        let want: Vec<&str> = keys.iter().map(String::as_str).collect();
        assert_eq!(got, want);
        t.assert_invariants();
    }

    /// Invariant: entries/keys/values agree in length and order with `len`.
    #[test]
    fn projections_agree() {
        let mut t = HashTable::new();
        for i in 0..40 {
            t.set(format!("p{i}"), i);
        }
        let entries = t.entries();
        let keys = t.keys();
        let values = t.values();
        assert_eq!(entries.len(), t.len());
        assert_eq!(keys.len(), t.len());
        assert_eq!(values.len(), t.len());
        for ((ek, ev), (k, v)) in entries.iter().zip(keys.iter().zip(values.iter())) {
            assert_eq!(ek, k);
            assert_eq!(ev, v);
        }
        assert_eq!(t.iter().len(), t.len());
    }

    /// Invariant: iteration visits slots in ascending order.
    #[test]
    fn iteration_follows_slot_order() {
        let mut t = HashTable::new();
        for i in 0..10 {
            t.set(format!("s{i}"), i);
        }
        let slots: Vec<usize> = t.keys().iter().map(|k| t.slot_index(k)).collect();
        let mut sorted = slots.clone();
        sorted.sort_unstable();
        assert_eq!(slots, sorted);
    }

    /// Invariant: `clear` empties the table and restores the initial capacity.
    #[test]
    fn clear_resets() {
        let mut t = HashTable::new();
        for i in 0..100 {
            t.set(format!("x{i}"), i);
        }
        assert!(t.capacity() > INITIAL_CAPACITY);
        t.clear();
        assert_eq!(t.len(), 0);
        assert_eq!(t.capacity(), INITIAL_CAPACITY);
        assert!(!t.has("x0"));
        assert_eq!(t.get("x99"), None);

        t.set("fresh", 1);
        assert_eq!(t.get("fresh"), Some(&1));
        assert_eq!(t.len(), 1);
        t.assert_invariants();
    }

    /// Invariant: collecting and extending apply `set` per pair; later wins.
    #[test]
    fn from_iter_and_extend() {
        let mut t: HashTable<i32> = vec![("a", 1), ("b", 2), ("a", 3)].into_iter().collect();
        assert_eq!(t.len(), 2);
        assert_eq!(t.get("a"), Some(&3));
        t.extend([("c".to_string(), 4)]);
        let keys: BTreeSet<&str> = t.keys().into_iter().collect();
        assert_eq!(keys, BTreeSet::from(["a", "b", "c"]));
    }

    /// Invariant: clones are independent.
    #[test]
    fn clone_is_deep() {
        let mut t = HashTable::new();
        t.set("a", 1);
        let mut c = t.clone();
        c.set("a", 2);
        c.set("b", 3);
        assert_eq!(t.get("a"), Some(&1));
        assert!(!t.has("b"));
        assert_eq!(c.get("a"), Some(&2));
    }

    /// Invariant: Debug renders as a map.
    #[test]
    fn debug_renders_map() {
        let mut t = HashTable::new();
        t.set("only", 1);
        assert_eq!(format!("{t:?}"), r#"{"only": 1}"#);
    }
}

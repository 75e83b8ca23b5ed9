//! chain-table: a string-keyed hash table built on separate chaining.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small, predictable associative container whose hashing,
//!   bucket layout, collision handling and growth policy are all visible
//!   and testable, rather than delegated to a built-in map.
//! - Layers:
//!   - `KeyHasher`: turns a `&str` into a raw `u64`. The default,
//!     `Prime31`, is the classic `h = h * 31 + c` polynomial.
//!   - `HashTable<V, H>`: owns a power-of-two array of slots. Each slot
//!     heads a singly linked chain; chain links are generational arena
//!     keys into a `SlotMap` that owns every entry.
//!
//! Constraints
//! - Keys are `String`; lookups borrow as `&str`.
//! - A key appears at most once in the whole table.
//! - Capacity starts at 16, is always a power of two, and only shrinks
//!   back to 16 through `clear()`.
//! - Single-owner and synchronous: mutation needs `&mut self`. Callers who
//!   share a table across threads wrap it in their own lock.
//!
//! Chain discipline
//! - New keys are appended after the true tail of their chain; existing
//!   keys are overwritten in place.
//! - Removal splices the predecessor (or the slot head) to the removed
//!   entry's successor, so the remainder of the chain survives.
//!
//! Growth
//! - Before a new key is placed, if the insertion would push
//!   `len / capacity` above 0.75, capacity doubles and every entry is
//!   relinked in iteration order (slot ascending, chain order). The slot
//!   index is always recomputed from the key against the current capacity;
//!   no hash is cached per entry.
//!
//! Iteration
//! - `iter()`, `entries()`, `keys()` and `values()` visit slots in index
//!   order and each chain head to tail. That order is unrelated to
//!   insertion order and changes when the table grows.
//!
//! Logging
//! - Uses the `log` facade: a `debug` record per resize and a `trace`
//!   record per `clear`. Nothing is logged on lookups or inserts.
//!
//! Notes and non-goals
//! - No shrink-on-remove, no open addressing, no persistence.
//! - Not resistant to adversarial keys; plug in a different `KeyHasher`
//!   if that matters.
//! - The `stats` feature adds `HashTable::chain_stats` for inspecting how
//!   entries are spread across slots.

pub mod hash_table;
mod hash_table_proptest;
pub mod key_hasher;
#[cfg(feature = "stats")]
mod stats;

// Public surface
pub use hash_table::{HashTable, Iter, INITIAL_CAPACITY, LOAD_FACTOR};
pub use key_hasher::{KeyHasher, Prime31};
#[cfg(feature = "stats")]
pub use stats::ChainStats;

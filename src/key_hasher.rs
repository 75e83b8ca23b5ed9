//! Key hashing for slot selection.
//!
//! A `KeyHasher` turns a string key into a raw 64-bit hash. Reducing that
//! hash to a slot index is the table's job, because the reduction depends on
//! the table's current capacity.

/// Hashes string keys for [`HashTable`](crate::HashTable).
///
/// Implementations must be deterministic: the same key must always produce
/// the same hash for the lifetime of a table.
pub trait KeyHasher {
    fn hash_key(&self, key: &str) -> u64;
}

/// Polynomial hash with multiplier 31.
///
/// Starting from 0, folds each `char` of the key left to right as
/// `h = h * 31 + c` with wrapping 64-bit arithmetic. Not resistant to
/// adversarial input.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Prime31;

impl Prime31 {
    const PRIME: u64 = 31;
}

impl KeyHasher for Prime31 {
    #[inline]
    fn hash_key(&self, key: &str) -> u64 {
        key.chars().fold(0u64, |h, c| {
            h.wrapping_mul(Self::PRIME).wrapping_add(u64::from(c))
        })
    }
}

impl<H: KeyHasher + ?Sized> KeyHasher for &H {
    #[inline]
    fn hash_key(&self, key: &str) -> u64 {
        (**self).hash_key(key)
    }
}

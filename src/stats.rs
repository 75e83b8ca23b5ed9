//! Chain-length statistics (feature `stats`).

use crate::hash_table::HashTable;
use crate::key_hasher::KeyHasher;

/// Snapshot of how entries are spread across a table's slots.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainStats {
    pub len: usize,
    pub capacity: usize,
    pub occupied_slots: usize,
    pub empty_slots: usize,
    pub longest_chain: usize,
    pub load_factor: f64,
    /// Mean chain length over occupied slots; 0.0 for an empty table.
    pub average_chain: f64,
    /// `histogram[n]` is the number of slots whose chain has `n` entries.
    pub histogram: Vec<usize>,
}

impl ChainStats {
    pub fn print(&self) {
        println!(
            "{} entries in {} slots (load {:.3})",
            self.len, self.capacity, self.load_factor
        );
        println!(
            "occupied {} / empty {}, longest chain {}, mean chain {:.3}",
            self.occupied_slots, self.empty_slots, self.longest_chain, self.average_chain
        );
        for (n, count) in self.histogram.iter().enumerate() {
            println!("  chain {n:>3}: {count}");
        }
    }
}

impl<V, H> HashTable<V, H>
where
    H: KeyHasher,
{
    pub fn chain_stats(&self) -> ChainStats {
        let lengths = self.chain_lengths();
        let longest_chain = lengths.iter().copied().max().unwrap_or(0);

        let mut histogram = vec![0usize; longest_chain + 1];
        for &n in &lengths {
            histogram[n] += 1;
        }

        let empty_slots = histogram[0];
        let occupied_slots = lengths.len() - empty_slots;
        let average_chain = if occupied_slots == 0 {
            0.0
        } else {
            self.len() as f64 / occupied_slots as f64
        };

        ChainStats {
            len: self.len(),
            capacity: self.capacity(),
            occupied_slots,
            empty_slots,
            longest_chain,
            load_factor: self.load_factor(),
            average_chain,
            histogram,
        }
    }
}

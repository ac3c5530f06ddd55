//! Minimizer admission and the dense ID table.
//!
//! A canonical k-mer is admitted as a minimizer iff its FNV-1a hash, masked
//! to 63 bits, falls below `density * 2^63`. The ID table is an
//! insertion-ordered map so IDs are assigned in first-seen order, which is
//! why pass 1 must walk reads in deterministic file order.

use crate::hash::{fnv1a64, unsigned63};
use indexmap::IndexSet;

pub fn admission_threshold(density: f64) -> u64 {
    (density * (1u64 << 63) as f64).floor() as u64
}

pub fn is_minimizer(canonical_kmer: u64, threshold: u64) -> bool {
    unsigned63(fnv1a64(canonical_kmer)) < threshold
}

/// Dense `canonical_kmer -> u32` table, IDs assigned in first-seen order.
#[derive(Default)]
pub struct MinimizerTable {
    ids: IndexSet<u64>,
}

impl MinimizerTable {
    pub fn new() -> Self {
        MinimizerTable {
            ids: IndexSet::new(),
        }
    }

    /// Records `kmer` as a minimizer if not already present, returning its
    /// (possibly newly assigned) id.
    pub fn insert(&mut self, kmer: u64) -> u32 {
        let (idx, _) = self.ids.insert_full(kmer);
        idx as u32
    }

    /// Looks up an already-admitted minimizer's id without inserting.
    pub fn get(&self, kmer: u64) -> Option<u32> {
        self.ids.get_index_of(&kmer).map(|i| i as u32)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

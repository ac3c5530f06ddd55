//! A bit-array Bloom filter over `u64` keys, sized for a target expected
//! entry count and false-positive rate.
//!
//! Two independent seed hashes are mixed with Kirsch-Mitzenmacher double
//! hashing to derive the `k` probe hashes, and a Lemire fast-range
//! reduction maps each probe into the bit array without a modulo. Merge is
//! a bitwise OR over the backing word array, which is the only merge
//! operation `BuildConfig`'s two-pass construction needs.

#[derive(Clone, Debug)]
pub struct BloomFilter {
    bits: Vec<u64>,
    num_bits: u64,
    num_hashes: u32,
}

/// 64-bit mixer (splitmix64 finalizer), used to derive two independent
/// seed hashes from a single key without adding a hashing dependency.
fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^= x >> 31;
    x
}

/// Maps a 64-bit hash into `[0, range)` without a modulo (Lemire 2019).
fn fast_range(hash: u64, range: u64) -> u64 {
    ((hash as u128 * range as u128) >> 64) as u64
}

impl BloomFilter {
    /// Sizes a filter for `expected_entries` items at `fp_rate` false
    /// positive probability, using the standard optimal-m/k formulas.
    pub fn new(expected_entries: usize, fp_rate: f64) -> Self {
        assert!(expected_entries > 0);
        assert!(fp_rate > 0.0 && fp_rate < 1.0);

        let n = expected_entries as f64;
        let ln2 = std::f64::consts::LN_2;
        let num_bits = (-(n * fp_rate.ln()) / (ln2 * ln2)).ceil().max(64.0) as u64;
        let num_hashes = ((num_bits as f64 / n) * ln2).round().clamp(1.0, 32.0) as u32;

        let num_words = (num_bits + 63) / 64;
        BloomFilter {
            bits: vec![0u64; num_words as usize],
            num_bits: num_words * 64,
            num_hashes,
        }
    }

    fn probe_indices(&self, key: u64) -> impl Iterator<Item = u64> + '_ {
        let h1 = mix64(key);
        let h2 = mix64(h1 ^ 0x9E3779B97F4A7C15);
        (0..self.num_hashes).map(move |i| {
            let combined = h1.wrapping_add((i as u64).wrapping_mul(h2));
            fast_range(combined, self.num_bits)
        })
    }

    pub fn insert(&mut self, key: u64) {
        let indices: Vec<u64> = self.probe_indices(key).collect();
        for idx in indices {
            let word = (idx / 64) as usize;
            let bit = idx % 64;
            self.bits[word] |= 1u64 << bit;
        }
    }

    pub fn might_contain(&self, key: u64) -> bool {
        self.probe_indices(key)
            .all(|idx| self.bits[(idx / 64) as usize] & (1u64 << (idx % 64)) != 0)
    }

    /// Folds `other` into `self` by bitwise OR. Both filters must have been
    /// constructed with identical sizing and hash parameters.
    pub fn merge(&mut self, other: &BloomFilter) {
        assert_eq!(self.bits.len(), other.bits.len(), "bloom filters must match in size to merge");
        assert_eq!(self.num_hashes, other.num_hashes, "bloom filters must match in hash count to merge");
        for (a, b) in self.bits.iter_mut().zip(other.bits.iter()) {
            *a |= b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_false_negatives() {
        let mut bf = BloomFilter::new(1000, 0.01);
        for i in 0..1000u64 {
            bf.insert(i);
        }
        for i in 0..1000u64 {
            assert!(bf.might_contain(i));
        }
    }

    #[test]
    fn merge_is_union() {
        let mut a = BloomFilter::new(100, 0.01);
        let mut b = BloomFilter::new(100, 0.01);
        a.insert(1);
        b.insert(2);
        a.merge(&b);
        assert!(a.might_contain(1));
        assert!(a.might_contain(2));
    }

    #[test]
    fn deterministic_across_instances() {
        let mut a = BloomFilter::new(500, 0.01);
        let mut b = BloomFilter::new(500, 0.01);
        for k in [7u64, 42, 99999] {
            a.insert(k);
            b.insert(k);
        }
        for k in [7u64, 42, 99999] {
            assert_eq!(a.might_contain(k), b.might_contain(k));
        }
    }
}

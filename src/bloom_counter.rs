//! Two-pass Bloom-filter k-mer counter.
//!
//! A single producer pushes read sequences onto a bounded
//! `crossbeam-channel` (capacity 1000); `threads` consumers each own a
//! thread-local Bloom filter and fold their local result back by value
//! once the channel is drained (closed-on-EOF, no sentinel value). The
//! driver then OR-merges every thread-local filter across a join barrier.

use crate::bloom::BloomFilter;
use crate::config::BuildConfig;
use crate::kmer::{canonical, KmerIter};
use crossbeam_channel::bounded;
use rayon::prelude::*;
use std::thread;

/// Runs one pass (`insert_unconditionally = true` for pass 1, `false` for
/// pass 2, gated on `seen_once`) over `sequences`, returning the merged
/// resulting filter.
fn run_pass(
    sequences: &[Vec<u8>],
    config: &BuildConfig,
    seen_once: Option<&BloomFilter>,
) -> BloomFilter {
    let (sender, receiver) = bounded::<&[u8]>(crate::config::BLOOM_QUEUE_CAPACITY);
    let threads = config.threads.max(1);

    let result = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(threads);
        for _ in 0..threads {
            let receiver = receiver.clone();
            let k = config.k;
            let expected = config.expected_kmer_count;
            let fp_rate = config.fp_rate;
            handles.push(scope.spawn(move || {
                let mut local = BloomFilter::new(expected, fp_rate);
                while let Ok(seq) = receiver.recv() {
                    for hit in KmerIter::new(seq, k) {
                        let kc = canonical(hit.kmer, k);
                        match seen_once {
                            None => local.insert(kc),
                            Some(seen_once) => {
                                if seen_once.might_contain(kc) {
                                    local.insert(kc);
                                }
                            }
                        }
                    }
                }
                local
            }));
        }

        for seq in sequences {
            sender.send(seq).expect("consumers outlive the producer");
        }
        drop(sender);

        // Each worker's local filter is the same fixed size, so OR-merging
        // them is associative and commutative: fold them pairwise in
        // parallel rather than serially through a single accumulator.
        let locals: Vec<BloomFilter> = handles
            .into_iter()
            .map(|h| h.join().expect("bloom worker thread panicked"))
            .collect();
        locals
            .into_par_iter()
            .reduce(
                || BloomFilter::new(config.expected_kmer_count, config.fp_rate),
                |mut a, b| {
                    a.merge(&b);
                    a
                },
            )
    });

    result
}

/// Builds the `seen_twice` filter: pass 1 inserts every canonical k-mer
/// into `seen_once`, pass 2 inserts a canonical k-mer into `seen_twice`
/// only if `seen_once` already reports it.
pub fn build_seen_twice(sequences: &[Vec<u8>], config: &BuildConfig) -> BloomFilter {
    let seen_once = run_pass(sequences, config, None);
    run_pass(sequences, config, Some(&seen_once))
}

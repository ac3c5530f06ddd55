//! Pipeline orchestration: wires the encoder, Bloom counter, minimizer
//! selector, edge extractor, external sorter and unitig assembler into the
//! single `build()` entry point.

use crate::bloom_counter::build_seen_twice;
use crate::config::BuildConfig;
use crate::edge::{extract_edges, occurrences_for_read, Edge, Occurrence};
use crate::encoding::EncodedSequence;
use crate::error::{AssemblyError, Result};
use crate::graph::{BubblePopper, Graph};
use crate::io::{read_filtered_records, write_fasta};
use crate::kmer::{canonical, KmerIter};
use crate::minimizer::{admission_threshold, MinimizerTable};
use log::info;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct AssemblyStats {
    pub reads_processed: usize,
    pub valid_bases: usize,
    pub minimizers_discovered: usize,
    pub edges_written: usize,
    pub unitigs_emitted: usize,
    pub elapsed_seconds: f64,
}

/// Runs the full pipeline: reads `input_fastq` (optionally filtered by
/// read name), builds the minimizer graph, and writes unitigs in FASTA
/// form to `output_fasta`.
pub fn build(
    input_fastq: impl AsRef<Path>,
    read_name_filter: Option<&HashSet<String>>,
    output_fasta: impl AsRef<Path>,
    config: &BuildConfig,
) -> Result<AssemblyStats> {
    let start = Instant::now();
    config.validate()?;

    let input_fastq = input_fastq.as_ref();
    if !input_fastq.exists() {
        return Err(AssemblyError::MissingInput(input_fastq.to_path_buf()));
    }
    fs::create_dir_all(&config.work_dir)?;

    info!("reading {:?}", input_fastq);
    let records = read_filtered_records(input_fastq, read_name_filter)?;
    info!("{} reads after filtering", records.len());

    let valid_bases: usize = records
        .iter()
        .map(|r| EncodedSequence::encode(&r.sequence).len())
        .sum();
    info!("{} valid (A/C/G/T) bases across filtered reads", valid_bases);

    info!("building seen-twice bloom filter (k={})", config.k);
    let sequences: Vec<Vec<u8>> = records.iter().map(|r| r.sequence.clone()).collect();
    let seen_twice = build_seen_twice(&sequences, config);

    let threshold = admission_threshold(config.density);

    // Pass 1: discover minimizers in deterministic file order, assigning
    // dense ids in first-seen order.
    let mut table = MinimizerTable::new();
    for seq in &sequences {
        for hit in KmerIter::new(seq, config.k) {
            let kc = canonical(hit.kmer, config.k);
            if seen_twice.might_contain(kc) && crate::minimizer::is_minimizer(kc, threshold) {
                table.insert(kc);
            }
        }
    }
    info!("{} minimizers discovered", table.len());

    // Pass 2: re-walk each read, emit occurrences and edges.
    let unsorted_path = config.edges_unsorted_path();
    let mut edge_set: HashSet<(u32, u32, Vec<u8>)> = HashSet::new();
    for seq in &sequences {
        let hits = KmerIter::new(seq, config.k).filter_map(|hit| {
            let kc = canonical(hit.kmer, config.k);
            if seen_twice.might_contain(kc) {
                Some((kc, hit.start))
            } else {
                None
            }
        });
        let occurrences: Vec<Occurrence> = occurrences_for_read(hits, &table, threshold);
        for edge in extract_edges(seq, &occurrences, config.k) {
            edge_set.insert((edge.from_id, edge.to_id, edge.sequence));
        }
    }
    info!("{} distinct edges", edge_set.len());

    write_unsorted_edges(&unsorted_path, &edge_set)?;

    let sorted_path = config.edges_sorted_path();
    let work_dir = config.work_dir.clone();
    crate::sort::external_sort(
        &unsorted_path,
        &sorted_path,
        &config.work_dir,
        config.sort_buffer_records,
        move |i| work_dir.join(format!("run_{i}")),
    )
    .map_err(|e| match e {
        AssemblyError::Sort(msg) => AssemblyError::Sort(msg),
        other => other,
    })?;
    fs::remove_file(&unsorted_path)?;

    let reader = BufReader::new(File::open(&sorted_path)?);
    let graph = Graph::load_sorted(reader)?;
    let mut unitigs = graph.assemble_unitigs(config.k);
    if config.pop_bubbles {
        unitigs = BubblePopper::pop(unitigs, config.k);
    }
    info!("{} unitigs emitted", unitigs.len());

    let out = BufWriter::new(File::create(output_fasta.as_ref())?);
    write_fasta(out, &unitigs)?;
    fs::remove_file(&sorted_path)?;

    Ok(AssemblyStats {
        reads_processed: records.len(),
        valid_bases,
        minimizers_discovered: table.len(),
        edges_written: edge_set.len(),
        unitigs_emitted: unitigs.len(),
        elapsed_seconds: start.elapsed().as_secs_f64(),
    })
}

fn write_unsorted_edges(
    path: &Path,
    edges: &HashSet<(u32, u32, Vec<u8>)>,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for (from_id, to_id, sequence) in edges {
        writer.write_all(from_id.to_string().as_bytes())?;
        writer.write_all(b"\t")?;
        writer.write_all(to_id.to_string().as_bytes())?;
        writer.write_all(b"\t")?;
        writer.write_all(sequence)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[allow(dead_code)]
fn count_edges(edges: &[Edge]) -> HashMap<(u32, u32), usize> {
    let mut counts = HashMap::new();
    for e in edges {
        *counts.entry((e.from_id, e.to_id)).or_insert(0) += 1;
    }
    counts
}

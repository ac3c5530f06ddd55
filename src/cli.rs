//! Command-line surface. A thin `clap` derive struct that validates
//! paths/flags and calls straight into [`crate::pipeline::build`]; it owns
//! no pipeline logic itself.

use crate::config::{BuildConfig, DEFAULT_DENSITY, DEFAULT_K};
use clap::Parser;
use std::collections::HashSet;
use std::io::BufRead;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Assembles FASTQ reads into unitig contigs via a minimizer de Bruijn graph", long_about = None)]
pub struct Cli {
    /// Input FASTQ file (optionally gzip-compressed).
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output FASTA file for assembled unitigs.
    #[arg(short, long)]
    pub output: PathBuf,

    /// K-mer size, 1..=31.
    #[arg(short = 'k', long, default_value_t = DEFAULT_K)]
    pub k: u8,

    /// Minimizer density; the source material used both 0.005 and 0.2 in
    /// different builds, so this is left as an explicit, documented knob.
    #[arg(long, default_value_t = DEFAULT_DENSITY)]
    pub density: f64,

    /// Optional file of read names (one per line) to exclude before assembly.
    #[arg(long)]
    pub filter: Option<PathBuf>,

    /// Worker threads for Bloom-filter construction. Defaults to available parallelism.
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Working directory for intermediate edge files. Defaults to a fresh temp dir.
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Collapse parallel simple paths between the same node pair (depth <= 20, length <= 1500).
    #[arg(long, default_value_t = false)]
    pub pop_bubbles: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }

    pub fn read_name_filter(&self) -> anyhow::Result<Option<HashSet<String>>> {
        let Some(path) = &self.filter else {
            return Ok(None);
        };
        let file = std::fs::File::open(path)?;
        let names = std::io::BufReader::new(file)
            .lines()
            .collect::<Result<HashSet<String>, _>>()?;
        Ok(Some(names))
    }

    pub fn build_config(&self, work_dir: PathBuf) -> BuildConfig {
        let mut config = BuildConfig::new(self.k, self.density, work_dir);
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        config.pop_bubbles = self.pop_bubbles;
        config
    }
}

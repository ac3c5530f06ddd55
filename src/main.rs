//! Binary entry point: parses CLI flags, initializes logging, and wraps
//! the library's fallible `build()` call in `anyhow` so the process exits
//! nonzero with a readable error chain on failure.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use mdbg_asm::cli::Cli;
use tempfile::TempDir;

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level_filter())
        .init();

    // Keep the TempDir guard alive for the whole run when no explicit
    // working directory was given, so its contents aren't removed early.
    let _temp_guard: Option<TempDir>;
    let work_dir = match &cli.work_dir {
        Some(dir) => {
            _temp_guard = None;
            dir.clone()
        }
        None => {
            let dir = tempfile::tempdir().context("failed to create a working directory")?;
            let path = dir.path().to_path_buf();
            _temp_guard = Some(dir);
            path
        }
    };

    let read_name_filter = cli.read_name_filter()?;
    let config = cli.build_config(work_dir);

    info!(
        "assembling {:?} -> {:?} (k={}, density={})",
        cli.input, cli.output, config.k, config.density
    );

    let stats = mdbg_asm::build(
        &cli.input,
        read_name_filter.as_ref(),
        &cli.output,
        &config,
    )
    .with_context(|| format!("assembly failed for {:?}", cli.input))?;

    info!(
        "done: {} reads, {} minimizers, {} edges, {} unitigs in {:.2}s",
        stats.reads_processed,
        stats.minimizers_discovered,
        stats.edges_written,
        stats.unitigs_emitted,
        stats.elapsed_seconds
    );

    Ok(())
}

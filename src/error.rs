//! Error types for the assembly core.
//!
//! The library surfaces a single `thiserror`-derived enum; the binary crate
//! wraps calls into this library in `anyhow::Result` at the CLI boundary.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid k-mer size {k}: must be in 1..=31")]
    InvalidK { k: u8 },

    #[error("invalid density {density}: must be in 0.0..=1.0")]
    InvalidDensity { density: f64 },

    #[error("input file does not exist: {0}")]
    MissingInput(PathBuf),

    #[error("needletail parse error: {0}")]
    Parse(#[from] needletail::errors::ParseError),

    #[error("external sort failed: {0}")]
    Sort(String),

    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, AssemblyError>;

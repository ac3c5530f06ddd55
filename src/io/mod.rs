//! FASTQ/FASTA I/O. FASTQ reading leans on `needletail`, matching the rest
//! of the pack's sequence-file handling; FASTA writing is our own thin
//! buffered writer.

pub mod fasta;
pub mod fastq;

pub use fasta::write_fasta;
pub use fastq::{read_filtered_records, ReadRecord};

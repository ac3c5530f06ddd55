//! FASTA writing: `>unitig_<i> length_<len>` headers, sequence wrapped at
//! 80 columns.

use crate::error::Result;
use std::io::Write;

const WRAP_WIDTH: usize = 80;

pub fn write_fasta<W: Write>(mut out: W, unitigs: &[Vec<u8>]) -> Result<()> {
    for (i, seq) in unitigs.iter().enumerate() {
        writeln!(out, ">unitig_{} length_{}", i, seq.len())?;
        for chunk in seq.chunks(WRAP_WIDTH) {
            out.write_all(chunk)?;
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_wraps_sequence() {
        let seq = vec![b'A'; 85];
        let mut buf = Vec::new();
        write_fasta(&mut buf, &[seq]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), ">unitig_0 length_85");
        assert_eq!(lines.next().unwrap().len(), 80);
        assert_eq!(lines.next().unwrap().len(), 5);
        assert!(lines.next().is_none());
    }

    #[test]
    fn empty_unitig_list_writes_nothing() {
        let mut buf = Vec::new();
        write_fasta(&mut buf, &[]).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn multiple_unitigs_are_indexed_in_order() {
        let mut buf = Vec::new();
        write_fasta(&mut buf, &[b"ACGT".to_vec(), b"TTTT".to_vec()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with(">unitig_0 length_4\nACGT\n>unitig_1 length_4\nTTTT\n"));
    }
}

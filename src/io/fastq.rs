//! FASTQ reading via `needletail`, with an optional read-name filter
//! applied as a streaming predicate over the same reader rather than a
//! separate pass over the file.

use crate::error::Result;
use needletail::parse_fastx_file;
use std::collections::HashSet;
use std::path::Path;

/// An owned FASTQ/FASTA record: just the pieces the core pipeline needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadRecord {
    pub name: String,
    pub sequence: Vec<u8>,
}

/// Reads every record from `path`, applying `exclude` (if given) as a
/// read-name filter: a record is dropped iff its name (header after `@`,
/// first whitespace-delimited token) is present in the set.
pub fn read_filtered_records(
    path: impl AsRef<Path>,
    exclude: Option<&HashSet<String>>,
) -> Result<Vec<ReadRecord>> {
    let mut reader = parse_fastx_file(path.as_ref())?;
    let mut records = Vec::new();
    while let Some(rec) = reader.next() {
        let rec = match rec {
            Ok(r) => r,
            Err(_) => break, // truncated trailing record at EOF: tolerated, stop reading
        };
        let id = rec.id();
        let name = String::from_utf8_lossy(id)
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_string();
        if let Some(exclude) = exclude {
            if exclude.contains(&name) {
                continue;
            }
        }
        records.push(ReadRecord {
            name,
            sequence: rec.seq().into_owned(),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_fastq(path: &std::path::Path, content: &str) {
        fs::write(path, content).unwrap();
    }

    fn write_fastq_gz(path: &std::path::Path, content: &str) {
        let file = fs::File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn reads_plain_fastq() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reads.fq");
        write_fastq(&path, "@r1\nACGT\n+\n!!!!\n@r2\nTTTT\n+\n####\n");

        let records = read_filtered_records(&path, None).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "r1");
        assert_eq!(records[0].sequence, b"ACGT");
        assert_eq!(records[1].name, "r2");
    }

    #[test]
    fn reads_gzipped_fastq() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reads.fq.gz");
        write_fastq_gz(&path, "@r1\nACGT\n+\n!!!!\n");

        let records = read_filtered_records(&path, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence, b"ACGT");
    }

    #[test]
    fn applies_read_name_filter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reads.fq");
        write_fastq(
            &path,
            "@keep\nACGT\n+\n!!!!\n@drop\nTTTT\n+\n####\n",
        );

        let mut exclude = HashSet::new();
        exclude.insert("drop".to_string());

        let records = read_filtered_records(&path, Some(&exclude)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "keep");
    }

    #[test]
    fn tolerates_truncated_trailing_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reads.fq");
        write_fastq(&path, "@r1\nACGT\n+\n!!!!\n@r2\nTTTT\n+\n##");

        let records = read_filtered_records(&path, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "r1");
    }
}

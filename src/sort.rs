//! External merge sort over the edge-record file.
//!
//! Records are tab-separated ASCII: `"<from_id>\t<to_id>\t<sequence>\n"`.
//! The unsorted file is chunked into in-memory-sorted runs written to the
//! configured working directory, then merged with a binary-heap k-way
//! merge keyed on `from_id`. Run files are removed once the merge
//! completes successfully.

use crate::error::{AssemblyError, Result};
use itertools::Itertools;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

fn parse_from_id(line: &str) -> Result<u32> {
    line.split('\t')
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(|| AssemblyError::Sort(format!("malformed edge record: {line:?}")))
}

/// Splits `unsorted_path` into sorted run files under `work_dir`, at most
/// `buffer_records` lines each, returning the run file paths in creation
/// order.
fn write_sorted_runs(
    unsorted_path: &Path,
    work_dir: &Path,
    buffer_records: usize,
    run_path: impl Fn(usize) -> PathBuf,
) -> Result<Vec<PathBuf>> {
    let file = File::open(unsorted_path)?;
    let reader = BufReader::new(file);
    let mut runs = Vec::new();
    let mut buffer: Vec<(u32, String)> = Vec::with_capacity(buffer_records);

    let flush = |buffer: &mut Vec<(u32, String)>, run_idx: usize| -> Result<Option<PathBuf>> {
        if buffer.is_empty() {
            return Ok(None);
        }
        let path = run_path(run_idx);
        let mut writer = BufWriter::new(File::create(&path)?);
        for (_, line) in buffer.drain(..).sorted_by_key(|(id, _)| *id) {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(Some(path))
    };

    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let from_id = parse_from_id(&line)?;
        buffer.push((from_id, line));
        if buffer.len() >= buffer_records {
            let run_idx = runs.len();
            if let Some(path) = flush(&mut buffer, run_idx)? {
                runs.push(path);
            }
        }
    }
    let run_idx = runs.len();
    if let Some(path) = flush(&mut buffer, run_idx)? {
        runs.push(path);
    }
    let _ = work_dir; // work_dir is only used through `run_path`
    Ok(runs)
}

struct RunCursor {
    from_id: u32,
    line: String,
    reader: BufReader<File>,
}

impl RunCursor {
    fn open(path: &Path) -> Result<Option<Self>> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut line = String::new();
        let n = reader.read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        let from_id = parse_from_id(&line)?;
        Ok(Some(RunCursor {
            from_id,
            line,
            reader,
        }))
    }

    fn advance(mut self) -> Result<Option<Self>> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        self.from_id = parse_from_id(&line)?;
        self.line = line;
        Ok(Some(self))
    }
}

impl PartialEq for RunCursor {
    fn eq(&self, other: &Self) -> bool {
        self.from_id == other.from_id
    }
}
impl Eq for RunCursor {}
impl PartialOrd for RunCursor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for RunCursor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.from_id.cmp(&other.from_id)
    }
}

/// Sorts the edge-record file at `unsorted_path` by `from_id`, writing the
/// result to `sorted_path`. Scratch run files live under `work_dir` and are
/// removed on success.
pub fn external_sort(
    unsorted_path: &Path,
    sorted_path: &Path,
    work_dir: &Path,
    buffer_records: usize,
    run_path: impl Fn(usize) -> PathBuf,
) -> Result<()> {
    let runs = write_sorted_runs(unsorted_path, work_dir, buffer_records, run_path)?;

    let mut heap: BinaryHeap<Reverse<RunCursor>> = BinaryHeap::new();
    for run in &runs {
        if let Some(cursor) = RunCursor::open(run)? {
            heap.push(Reverse(cursor));
        }
    }

    let mut out = BufWriter::new(File::create(sorted_path)?);
    while let Some(Reverse(cursor)) = heap.pop() {
        out.write_all(cursor.line.as_bytes())?;
        out.write_all(b"\n")?;
        if let Some(next) = cursor.advance()? {
            heap.push(Reverse(next));
        }
    }
    out.flush()?;

    for run in &runs {
        std::fs::remove_file(run)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sorts_by_from_id_and_cleans_up_runs() {
        let dir = tempdir().unwrap();
        let unsorted = dir.path().join("edges_unsorted");
        std::fs::write(&unsorted, "3\t1\tACGTA\n1\t2\tACGTA\n2\t3\tACGTA\n0\t1\tACGTA\n").unwrap();

        let sorted = dir.path().join("edges_sorted");
        let work_dir = dir.path().to_path_buf();
        external_sort(&unsorted, &sorted, &work_dir, 2, |i| {
            work_dir.join(format!("run_{i}"))
        })
        .unwrap();

        let contents = std::fs::read_to_string(&sorted).unwrap();
        let ids: Vec<u32> = contents
            .lines()
            .map(|l| l.split('\t').next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);

        // run files must be gone
        assert!(!dir.path().join("run_0").exists());
    }

    #[test]
    fn empty_input_produces_empty_output() {
        let dir = tempdir().unwrap();
        let unsorted = dir.path().join("edges_unsorted");
        std::fs::write(&unsorted, "").unwrap();
        let sorted = dir.path().join("edges_sorted");
        let work_dir = dir.path().to_path_buf();
        external_sort(&unsorted, &sorted, &work_dir, 10, |i| {
            work_dir.join(format!("run_{i}"))
        })
        .unwrap();
        let contents = std::fs::read_to_string(&sorted).unwrap();
        assert!(contents.is_empty());
    }
}

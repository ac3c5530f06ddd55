//! Streaming unitig assembly: load the sorted edge stream into an
//! adjacency map, walk from every non-simple node through chains of
//! (in=1, out=1) nodes, and run a required second pass to emit pure
//! cycles the first pass's non-simple-start rule can never reach.

use crate::config::{BUBBLE_MAX_DEPTH, BUBBLE_MAX_LENGTH};
use crate::edge::Edge;
use std::collections::{HashMap, HashSet};
use std::io::BufRead;

#[derive(Default)]
pub struct Graph {
    pub adjacency: HashMap<u32, Vec<Edge>>,
    pub in_degrees: HashMap<u32, u32>,
    pub out_degrees: HashMap<u32, u32>,
}

impl Graph {
    /// Loads a sorted edge stream (`"<from_id>\t<to_id>\t<sequence>\n"`)
    /// in a single pass, building the adjacency map and both degree maps.
    pub fn load_sorted<R: BufRead>(reader: R) -> crate::error::Result<Self> {
        let mut graph = Graph::default();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let mut parts = line.splitn(3, '\t');
            let from_id: u32 = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| crate::error::AssemblyError::Invariant("bad from_id".into()))?;
            let to_id: u32 = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| crate::error::AssemblyError::Invariant("bad to_id".into()))?;
            let sequence = parts.next().unwrap_or("").as_bytes().to_vec();

            *graph.out_degrees.entry(from_id).or_insert(0) += 1;
            *graph.in_degrees.entry(to_id).or_insert(0) += 1;
            graph.in_degrees.entry(from_id).or_insert(0);
            graph.out_degrees.entry(to_id).or_insert(0);

            graph.adjacency.entry(from_id).or_default().push(Edge {
                from_id,
                to_id,
                sequence,
            });
        }
        Ok(graph)
    }

    fn degree(&self, node: u32) -> (u32, u32) {
        (
            *self.in_degrees.get(&node).unwrap_or(&0),
            *self.out_degrees.get(&node).unwrap_or(&0),
        )
    }

    fn is_simple(&self, node: u32) -> bool {
        self.degree(node) == (1, 1)
    }

    /// All node ids in ascending order. Traversal order must not depend on
    /// `HashMap`'s randomized iteration order, or the same sorted edge
    /// stream could assemble into a different (rotated) cycle sequence from
    /// one run to the next.
    fn all_nodes(&self) -> Vec<u32> {
        let set: HashSet<u32> = self
            .in_degrees
            .keys()
            .chain(self.out_degrees.keys())
            .copied()
            .collect();
        let mut nodes: Vec<u32> = set.into_iter().collect();
        nodes.sort_unstable();
        nodes
    }

    fn traversal_key(from: u32, to: u32) -> u64 {
        ((from as u64) << 32) | to as u64
    }

    fn walk_path(&self, start_edge: &Edge, traversed: &mut HashSet<u64>, k: usize) -> Vec<u8> {
        let mut seq = start_edge.sequence.clone();
        traversed.insert(Self::traversal_key(start_edge.from_id, start_edge.to_id));
        let mut cur = start_edge.to_id;

        while self.is_simple(cur) {
            let next_edge = match self.adjacency.get(&cur).and_then(|edges| edges.first()) {
                Some(e) => e,
                None => break,
            };
            let key = Self::traversal_key(next_edge.from_id, next_edge.to_id);
            if traversed.contains(&key) {
                break;
            }
            seq.extend_from_slice(&next_edge.sequence[k..]);
            traversed.insert(key);
            cur = next_edge.to_id;
        }
        seq
    }

    /// Runs the full unitig-emission algorithm: walks from every
    /// non-simple start, then a required second pass over any edges left
    /// untraversed to emit pure cycles.
    pub fn assemble_unitigs(&self, k: u8) -> Vec<Vec<u8>> {
        let k = k as usize;
        let mut traversed: HashSet<u64> = HashSet::new();
        let mut unitigs = Vec::new();

        for node in self.all_nodes() {
            if self.is_simple(node) {
                continue;
            }
            if let Some(edges) = self.adjacency.get(&node) {
                for edge in edges {
                    let key = Self::traversal_key(edge.from_id, edge.to_id);
                    if traversed.contains(&key) {
                        continue;
                    }
                    let seq = self.walk_path(edge, &mut traversed, k);
                    if seq.len() >= k {
                        unitigs.push(seq);
                    }
                }
            }
        }

        // Second pass: pure cycles are invisible to the non-simple-start
        // rule because every vertex on the ring has in=out=1. Walk any
        // still-untraversed edge until the first revisit, then emit the
        // cycle with its duplicated closing vertex trimmed.
        for node in self.all_nodes() {
            if let Some(edges) = self.adjacency.get(&node) {
                for edge in edges {
                    let key = Self::traversal_key(edge.from_id, edge.to_id);
                    if traversed.contains(&key) {
                        continue;
                    }
                    if let Some(seq) = self.walk_cycle(edge, &mut traversed, k) {
                        if seq.len() >= k {
                            unitigs.push(seq);
                        }
                    }
                }
            }
        }

        unitigs
    }

    /// Walks forward from `start_edge` until an already-traversed edge is
    /// hit (the ring closing). Returns `None` if the walk runs off the end
    /// of a simple chain instead of closing (not a pure cycle).
    fn walk_cycle(&self, start_edge: &Edge, traversed: &mut HashSet<u64>, k: usize) -> Option<Vec<u8>> {
        let mut seq = start_edge.sequence.clone();
        let start_key = Self::traversal_key(start_edge.from_id, start_edge.to_id);
        traversed.insert(start_key);
        let mut cur = start_edge.to_id;

        loop {
            let next_edge = self.adjacency.get(&cur).and_then(|edges| edges.first())?;
            let key = Self::traversal_key(next_edge.from_id, next_edge.to_id);
            if key == start_key {
                return Some(seq);
            }
            if traversed.contains(&key) {
                return None;
            }
            seq.extend_from_slice(&next_edge.sequence[k..]);
            traversed.insert(key);
            cur = next_edge.to_id;
        }
    }
}

/// Collapses parallel simple paths between the same pair of non-simple
/// nodes into a single chosen path (lexicographically smallest sequence),
/// bounded by `BUBBLE_MAX_DEPTH` hops and `BUBBLE_MAX_LENGTH` bases. This
/// is an opt-in post-process over already-assembled unitigs grouped by
/// their endpoints; the baseline assembler never calls it.
pub struct BubblePopper;

impl BubblePopper {
    /// Groups unitigs sharing the same (first k bases, last k bases)
    /// endpoint pair and, within depth/length bounds, keeps only the
    /// lexicographically smallest member of each group.
    pub fn pop(unitigs: Vec<Vec<u8>>, k: u8) -> Vec<Vec<u8>> {
        let k = k as usize;
        let mut groups: HashMap<(Vec<u8>, Vec<u8>), Vec<Vec<u8>>> = HashMap::new();
        let mut passthrough = Vec::new();

        for seq in unitigs {
            if seq.len() < 2 * k || seq.len() > BUBBLE_MAX_LENGTH {
                passthrough.push(seq);
                continue;
            }
            let start = seq[..k].to_vec();
            let end = seq[seq.len() - k..].to_vec();
            groups.entry((start, end)).or_default().push(seq);
        }

        let mut result = passthrough;
        for (_, mut group) in groups {
            if group.len() <= 1 || group.len() > BUBBLE_MAX_DEPTH {
                result.append(&mut group);
                continue;
            }
            group.sort();
            result.push(group.into_iter().next().unwrap());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_from(lines: &[&str]) -> Graph {
        Graph::load_sorted(lines.join("\n").as_bytes()).unwrap()
    }

    #[test]
    fn single_chain_produces_one_unitig() {
        // 0 -1-> 1 -1-> 2, node 0 non-simple (in=0), node 2 non-simple (out=0)
        let graph = graph_from(&["0\t1\tACGTA", "1\t2\tACGTA"]);
        let unitigs = graph.assemble_unitigs(5);
        assert_eq!(unitigs.len(), 1);
        assert_eq!(unitigs[0], b"ACGTACGTA");
    }

    #[test]
    fn branching_node_produces_multiple_unitigs() {
        // 0 -> 1, 0 -> 2: node 0 has out-degree 2, both branches are unitigs of length k
        let graph = graph_from(&["0\t1\tAAAAA", "0\t2\tCCCCC"]);
        let mut unitigs = graph.assemble_unitigs(5);
        unitigs.sort();
        assert_eq!(unitigs, vec![b"AAAAA".to_vec(), b"CCCCC".to_vec()]);
    }

    #[test]
    fn pure_cycle_is_emitted_by_second_pass() {
        // 0 -> 1 -> 2 -> 0: every node has in=out=1, a pure 3-cycle.
        let graph = graph_from(&["0\t1\tAAAAA", "1\t2\tAAAAA", "2\t0\tAAAAA"]);
        let unitigs = graph.assemble_unitigs(5);
        assert_eq!(unitigs.len(), 1);
        assert!(unitigs[0].len() >= 5);
    }

    #[test]
    fn no_edges_emits_no_unitigs() {
        let graph = Graph::default();
        assert!(graph.assemble_unitigs(5).is_empty());
    }

    #[test]
    fn bubble_popper_collapses_parallel_paths() {
        // Two paths sharing the same start and end k-mer: a bubble.
        let p1 = b"AAAAATTTTTCCCCC".to_vec();
        let p2 = b"AAAAAGGGGGCCCCC".to_vec();
        let result = BubblePopper::pop(vec![p1, p2.clone()], 5);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0], p2); // lexicographically smaller (G < T)
    }

    #[test]
    fn bubble_popper_leaves_unrelated_unitigs_alone() {
        let unitigs = vec![b"AAAAACCCCC".to_vec(), b"GGGGGTTTTT".to_vec()];
        let result = BubblePopper::pop(unitigs.clone(), 5);
        assert_eq!(result.len(), 2);
    }
}

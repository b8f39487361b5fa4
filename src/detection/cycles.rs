/// Circular fund-flow detection
///
/// Depth-first search from every unvisited account, tracking the current path.
/// An edge back onto the path closes a cycle; only cycles whose length falls
/// inside the configured bounds are kept. Accounts finished by an earlier
/// search are never re-entered, so this reports the cycles closed by back
/// edges of one traversal order rather than every simple cycle.

use ahash::{AHashMap, AHashSet};
use tracing::{debug, instrument};

use crate::config::CycleSettings;
use crate::graph::{NodeId, TransferGraph};

/// Deduplicated cycles plus a node -> containing-cycles index
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    cycles: Vec<Vec<NodeId>>,
    membership: AHashMap<NodeId, Vec<usize>>,
}

impl CycleReport {
    fn from_cycles(cycles: Vec<Vec<NodeId>>) -> Self {
        let mut membership: AHashMap<NodeId, Vec<usize>> = AHashMap::new();
        for (idx, cycle) in cycles.iter().enumerate() {
            for &node in cycle {
                membership.entry(node).or_default().push(idx);
            }
        }
        Self { cycles, membership }
    }

    pub fn cycles(&self) -> &[Vec<NodeId>] {
        &self.cycles
    }

    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Indices into [`CycleReport::cycles`] of every cycle through `node`
    pub fn cycles_containing(&self, node: NodeId) -> &[usize] {
        self.membership.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn shortest_cycle_len(&self, node: NodeId) -> Option<usize> {
        self.cycles_containing(node)
            .iter()
            .map(|&idx| self.cycles[idx].len())
            .min()
    }
}

/// DFS frame: the account and how far through its out-edges we are
struct Frame {
    node: NodeId,
    cursor: usize,
}

#[derive(Debug, Clone)]
pub struct CycleFinder {
    min_length: usize,
    max_length: usize,
}

impl CycleFinder {
    pub fn new(min_length: usize, max_length: usize) -> Self {
        Self { min_length, max_length }
    }

    pub fn from_settings(settings: &CycleSettings) -> Self {
        Self::new(settings.min_length, settings.max_length)
    }

    #[instrument(skip_all, fields(nodes = graph.node_count()))]
    pub fn find(&self, graph: &TransferGraph) -> CycleReport {
        let raw = self.search(graph);
        let found = raw.len();
        let cycles = dedupe_by_node_set(raw);

        debug!("🔁 Cycle search closed {} loops, {} unique", found, cycles.len());
        CycleReport::from_cycles(cycles)
    }

    fn search(&self, graph: &TransferGraph) -> Vec<Vec<NodeId>> {
        let node_count = graph.node_count();
        let mut visited = vec![false; node_count];
        // Position of each account on the current path, if it is on it
        let mut path_pos: Vec<Option<usize>> = vec![None; node_count];
        let mut path: Vec<NodeId> = Vec::new();
        let mut frames: Vec<Frame> = Vec::new();
        let mut cycles = Vec::new();

        for root in graph.nodes() {
            if visited[root] {
                continue;
            }
            visited[root] = true;
            path_pos[root] = Some(0);
            path.push(root);
            frames.push(Frame { node: root, cursor: 0 });

            while let Some(frame) = frames.last_mut() {
                let node = frame.node;
                let next = graph.out_edges(node).get(frame.cursor).map(|edge| edge.peer);
                frame.cursor += 1;

                match next {
                    Some(next) => {
                        if let Some(pos) = path_pos[next] {
                            let length = path.len() - pos;
                            if (self.min_length..=self.max_length).contains(&length) {
                                cycles.push(path[pos..].to_vec());
                            }
                        } else if !visited[next] {
                            visited[next] = true;
                            path_pos[next] = Some(path.len());
                            path.push(next);
                            frames.push(Frame { node: next, cursor: 0 });
                        }
                    }
                    None => {
                        frames.pop();
                        path.pop();
                        path_pos[node] = None;
                    }
                }
            }
        }

        cycles
    }
}

/// Keep the first cycle seen for each distinct set of accounts
fn dedupe_by_node_set(raw: Vec<Vec<NodeId>>) -> Vec<Vec<NodeId>> {
    let mut seen: AHashSet<Vec<NodeId>> = AHashSet::with_capacity(raw.len());
    raw.into_iter()
        .filter(|cycle| {
            let mut key = cycle.clone();
            key.sort_unstable();
            seen.insert(key)
        })
        .collect()
}

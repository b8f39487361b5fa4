/// Shell-layering detection: chains of low-value single-in/single-out relays

use tracing::{debug, instrument};

use crate::config::ShellSettings;
use crate::graph::{NodeId, TransferGraph};

#[derive(Debug, Clone, Default)]
pub struct ShellReport {
    chains: Vec<Vec<NodeId>>,
    chain_of: Vec<Option<usize>>,
}

impl ShellReport {
    pub fn chains(&self) -> &[Vec<NodeId>] {
        &self.chains
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn chain_containing(&self, node: NodeId) -> Option<&[NodeId]> {
        self.chain_of
            .get(node)
            .copied()
            .flatten()
            .map(|idx| self.chains[idx].as_slice())
    }

    /// Length of the chain the account belongs to, zero if none
    pub fn depth(&self, node: NodeId) -> usize {
        self.chain_containing(node).map_or(0, <[NodeId]>::len)
    }
}

#[derive(Debug, Clone)]
pub struct ShellChainDetector {
    low_value_threshold: f64,
    min_chain_length: usize,
}

impl ShellChainDetector {
    pub fn new(low_value_threshold: f64, min_chain_length: usize) -> Self {
        Self {
            low_value_threshold,
            min_chain_length,
        }
    }

    pub fn from_settings(settings: &ShellSettings) -> Self {
        Self::new(settings.low_value_threshold, settings.min_chain_length)
    }

    /// Exactly one receiver, exactly one sender, and low average outflow
    pub fn is_intermediary(&self, graph: &TransferGraph, node: NodeId) -> bool {
        graph.out_degree(node) == 1
            && graph.in_degree(node) == 1
            && graph.avg_out_amount(node) < self.low_value_threshold
    }

    #[instrument(skip_all)]
    pub fn detect(&self, graph: &TransferGraph) -> ShellReport {
        let intermediary: Vec<bool> = graph
            .nodes()
            .map(|node| self.is_intermediary(graph, node))
            .collect();
        let mut visited = vec![false; graph.node_count()];
        let mut chain_of = vec![None; graph.node_count()];
        let mut chains = Vec::new();

        for start in graph.nodes() {
            if !intermediary[start] || visited[start] {
                continue;
            }

            let mut chain = vec![start];
            visited[start] = true;
            let mut current = start;

            // Intermediaries have exactly one out-edge
            while let Some(edge) = graph.out_edges(current).first() {
                let next = edge.peer;
                if !intermediary[next] || visited[next] {
                    break;
                }
                visited[next] = true;
                chain.push(next);
                current = next;
            }

            if chain.len() >= self.min_chain_length {
                let idx = chains.len();
                for &node in &chain {
                    chain_of[node] = Some(idx);
                }
                chains.push(chain);
            }
        }

        debug!("🐚 Shell scan found {} relay chains", chains.len());
        ShellReport { chains, chain_of }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Transfer;
    use chrono::Utc;

    fn path(accounts: &[&str], amount: f64) -> Vec<Transfer> {
        let now = Utc::now();
        accounts
            .windows(2)
            .enumerate()
            .map(|(i, w)| Transfer::new(format!("T{}", i), w[0], w[1], amount, now))
            .collect()
    }

    fn names(graph: &TransferGraph, chain: &[NodeId]) -> Vec<String> {
        chain.iter().map(|&n| graph.account(n).to_string()).collect()
    }

    #[test]
    fn test_three_relays_form_one_chain() {
        let graph = TransferGraph::from_transfers(&path(&["SRC", "I1", "I2", "I3", "DST"], 400.0));
        let report = ShellChainDetector::new(1_000.0, 2).detect(&graph);

        assert_eq!(report.chains().len(), 1);
        assert_eq!(names(&graph, &report.chains()[0]), vec!["I1", "I2", "I3"]);
        assert_eq!(report.depth(graph.node_id("I2").unwrap()), 3);
        assert_eq!(report.depth(graph.node_id("SRC").unwrap()), 0);
    }

    #[test]
    fn test_high_value_relays_ignored() {
        let graph = TransferGraph::from_transfers(&path(&["SRC", "I1", "I2", "DST"], 1_000.0));
        let report = ShellChainDetector::new(1_000.0, 2).detect(&graph);
        assert!(report.is_empty());
    }

    #[test]
    fn test_single_relay_discarded() {
        let graph = TransferGraph::from_transfers(&path(&["SRC", "I1", "DST"], 10.0));
        let report = ShellChainDetector::new(1_000.0, 2).detect(&graph);
        assert!(report.is_empty());
        assert_eq!(report.depth(graph.node_id("I1").unwrap()), 0);
    }

    #[test]
    fn test_branching_account_breaks_chain() {
        let mut transfers = path(&["SRC", "I1", "I2", "HUB", "I3", "I4", "DST"], 100.0);
        // HUB gets a second receiver, so it is no longer an intermediary
        transfers.push(Transfer::new("TX", "HUB", "OTHER", 100.0, Utc::now()));
        let graph = TransferGraph::from_transfers(&transfers);
        let report = ShellChainDetector::new(1_000.0, 2).detect(&graph);

        let chains: Vec<Vec<String>> = report.chains().iter().map(|c| names(&graph, c)).collect();
        assert_eq!(chains, vec![vec!["I1", "I2"], vec!["I3", "I4"]]);
    }

    #[test]
    fn test_each_relay_lands_in_one_chain() {
        // closed loop of intermediaries: walk stops on the visited start
        let graph = TransferGraph::from_transfers(&path(&["A", "B", "C", "A"], 10.0));
        let report = ShellChainDetector::new(1_000.0, 2).detect(&graph);
        assert_eq!(report.chains().len(), 1);
        assert_eq!(report.chains()[0].len(), 3);
    }
}

/// Mastermind selection by weighted degree centrality

use crate::core::{
    MASTERMIND_IN_WEIGHT, MASTERMIND_OUT_WEIGHT, MASTERMIND_SCALE, MAX_SUSPICION_SCORE,
};
use crate::graph::{NodeId, TransferGraph};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MastermindPick {
    pub node: NodeId,
    /// `3 x out + 2 x in` over the whole graph
    pub raw_score: usize,
    /// Raw score scaled into [0, 100]
    pub score: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MastermindSelector;

impl MastermindSelector {
    pub fn new() -> Self {
        Self
    }

    pub fn centrality(&self, graph: &TransferGraph, node: NodeId) -> usize {
        MASTERMIND_OUT_WEIGHT * graph.out_degree(node)
            + MASTERMIND_IN_WEIGHT * graph.in_degree(node)
    }

    /// Highest-centrality member; ties go to the earliest member
    pub fn select(&self, graph: &TransferGraph, members: &[NodeId]) -> Option<MastermindPick> {
        let mut best: Option<(NodeId, usize)> = None;
        for &node in members {
            let raw = self.centrality(graph, node);
            if best.map_or(true, |(_, top)| raw > top) {
                best = Some((node, raw));
            }
        }

        best.map(|(node, raw_score)| MastermindPick {
            node,
            raw_score,
            score: (raw_score as f64 * MASTERMIND_SCALE).round().min(MAX_SUSPICION_SCORE),
        })
    }
}

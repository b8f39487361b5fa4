/// Incremental construction of a [`TransferGraph`] from raw transfers

use ahash::AHashMap;

use super::{NodeId, TransferGraph, WeightedEdge};
use crate::core::Transfer;

#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: TransferGraph,
    /// (sender, receiver) -> (slot in sender's out list, slot in receiver's in list)
    edge_slots: AHashMap<(NodeId, NodeId), (usize, usize)>,
}

impl GraphBuilder {
    pub fn with_capacity(transfers: usize) -> Self {
        Self {
            graph: TransferGraph::default(),
            edge_slots: AHashMap::with_capacity(transfers),
        }
    }

    fn intern(&mut self, account: &str) -> NodeId {
        if let Some(&node) = self.graph.index.get(account) {
            return node;
        }

        let node = self.graph.accounts.len();
        self.graph.accounts.push(account.to_string());
        self.graph.index.insert(account.to_string(), node);
        self.graph.out_edges.push(Vec::new());
        self.graph.in_edges.push(Vec::new());
        self.graph.total_sent.push(0.0);
        self.graph.total_received.push(0.0);
        node
    }

    pub fn add_transfer(&mut self, transfer: &Transfer) {
        let from = self.intern(&transfer.sender);
        let to = self.intern(&transfer.receiver);
        let amount = transfer.amount;

        self.graph.total_sent[from] += amount;
        self.graph.total_received[to] += amount;

        match self.edge_slots.get(&(from, to)) {
            Some(&(out_slot, in_slot)) => {
                self.graph.out_edges[from][out_slot].amount += amount;
                self.graph.in_edges[to][in_slot].amount += amount;
            }
            None => {
                let out_slot = self.graph.out_edges[from].len();
                let in_slot = self.graph.in_edges[to].len();
                self.graph.out_edges[from].push(WeightedEdge { peer: to, amount });
                self.graph.in_edges[to].push(WeightedEdge { peer: from, amount });
                self.edge_slots.insert((from, to), (out_slot, in_slot));
            }
        }
    }

    pub fn build(self) -> TransferGraph {
        self.graph
    }
}

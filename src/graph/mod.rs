/// Directed, amount-weighted account graph
///
/// Accounts are addressed by dense `NodeId`s assigned in order of first
/// appearance in the transfer list, so every iteration over nodes or edges is
/// deterministic for a given input.

pub mod builder;

pub use builder::GraphBuilder;

use ahash::AHashMap;

use crate::core::Transfer;

pub type NodeId = usize;

/// Collapsed edge: all transfers between one ordered pair of accounts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedEdge {
    /// Account on the other end: receiver for out-edges, sender for in-edges
    pub peer: NodeId,
    pub amount: f64,
}

/// Read-only graph produced by [`GraphBuilder`]
#[derive(Debug, Clone, Default)]
pub struct TransferGraph {
    pub(crate) accounts: Vec<String>,
    pub(crate) index: AHashMap<String, NodeId>,
    pub(crate) out_edges: Vec<Vec<WeightedEdge>>,
    pub(crate) in_edges: Vec<Vec<WeightedEdge>>,
    pub(crate) total_sent: Vec<f64>,
    pub(crate) total_received: Vec<f64>,
}

impl TransferGraph {
    pub fn from_transfers(transfers: &[Transfer]) -> Self {
        let mut builder = GraphBuilder::with_capacity(transfers.len());
        for transfer in transfers {
            builder.add_transfer(transfer);
        }
        builder.build()
    }

    pub fn node_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Node ids in first-appearance order
    pub fn nodes(&self) -> std::ops::Range<NodeId> {
        0..self.accounts.len()
    }

    pub fn account(&self, node: NodeId) -> &str {
        &self.accounts[node]
    }

    pub fn node_id(&self, account: &str) -> Option<NodeId> {
        self.index.get(account).copied()
    }

    pub fn out_edges(&self, node: NodeId) -> &[WeightedEdge] {
        &self.out_edges[node]
    }

    pub fn in_edges(&self, node: NodeId) -> &[WeightedEdge] {
        &self.in_edges[node]
    }

    /// Distinct receivers this account has sent to
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out_edges[node].len()
    }

    /// Distinct senders this account has received from
    pub fn in_degree(&self, node: NodeId) -> usize {
        self.in_edges[node].len()
    }

    pub fn total_sent(&self, node: NodeId) -> f64 {
        self.total_sent[node]
    }

    pub fn total_received(&self, node: NodeId) -> f64 {
        self.total_received[node]
    }

    /// Total sent divided by distinct receivers, zero for pure sinks
    pub fn avg_out_amount(&self, node: NodeId) -> f64 {
        match self.out_degree(node) {
            0 => 0.0,
            degree => self.total_sent[node] / degree as f64,
        }
    }

    pub fn avg_in_amount(&self, node: NodeId) -> f64 {
        match self.in_degree(node) {
            0 => 0.0,
            degree => self.total_received[node] / degree as f64,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.out_edges.iter().map(Vec::len).sum()
    }
}

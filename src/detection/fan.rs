/// Fan-in / fan-out (smurfing) detection on distinct-neighbour degree

use tracing::{debug, instrument};

use crate::config::FanSettings;
use crate::core::FanStatus;
use crate::graph::{NodeId, TransferGraph};

#[derive(Debug, Clone, Default)]
pub struct FanReport {
    fan_in: Vec<bool>,
    fan_out: Vec<bool>,
}

impl FanReport {
    pub fn status(&self, node: NodeId) -> FanStatus {
        let fan_in = self.fan_in.get(node).copied().unwrap_or(false);
        let fan_out = self.fan_out.get(node).copied().unwrap_or(false);
        FanStatus::from_flags(fan_in, fan_out)
    }

    /// Aggregators in node order
    pub fn fan_in_accounts(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.fan_in
            .iter()
            .enumerate()
            .filter_map(|(node, &hit)| hit.then_some(node))
    }

    pub fn fan_out_accounts(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.fan_out
            .iter()
            .enumerate()
            .filter_map(|(node, &hit)| hit.then_some(node))
    }
}

#[derive(Debug, Clone)]
pub struct FanDetector {
    threshold: usize,
}

impl FanDetector {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn from_settings(settings: &FanSettings) -> Self {
        Self::new(settings.degree_threshold)
    }

    #[instrument(skip_all)]
    pub fn detect(&self, graph: &TransferGraph) -> FanReport {
        let fan_in: Vec<bool> = graph
            .nodes()
            .map(|node| graph.in_degree(node) >= self.threshold)
            .collect();
        let fan_out: Vec<bool> = graph
            .nodes()
            .map(|node| graph.out_degree(node) >= self.threshold)
            .collect();

        let report = FanReport { fan_in, fan_out };
        debug!(
            "🪭 Fan scan: {} fan-in, {} fan-out accounts",
            report.fan_in_accounts().count(),
            report.fan_out_accounts().count()
        );
        report
    }
}

/// Rapid-burst detection over each account's combined in/out activity

use chrono::Duration as ChronoDuration;
use tracing::{debug, instrument};

use crate::config::VelocitySettings;
use crate::core::Transfer;
use crate::graph::{NodeId, TransferGraph};
use crate::util::time_series::ActivitySeries;

#[derive(Debug, Clone, Default)]
pub struct VelocityReport {
    peak_counts: Vec<usize>,
    flagged: Vec<bool>,
}

impl VelocityReport {
    pub fn is_high_velocity(&self, node: NodeId) -> bool {
        self.flagged.get(node).copied().unwrap_or(false)
    }

    /// Densest window observed for the account
    pub fn peak_count(&self, node: NodeId) -> usize {
        self.peak_counts.get(node).copied().unwrap_or(0)
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged.iter().filter(|&&hit| hit).count()
    }
}

#[derive(Debug, Clone)]
pub struct VelocityDetector {
    window: ChronoDuration,
    min_transactions: usize,
}

impl VelocityDetector {
    pub fn new(window: ChronoDuration, min_transactions: usize) -> Self {
        Self { window, min_transactions }
    }

    pub fn from_settings(settings: &VelocitySettings) -> Self {
        // Unvalidated overflowing spans saturate instead of panicking
        let window = settings.window().unwrap_or(ChronoDuration::MAX);
        Self::new(window, settings.min_transactions)
    }

    #[instrument(skip_all, fields(transfers = transfers.len()))]
    pub fn detect(&self, graph: &TransferGraph, transfers: &[Transfer]) -> VelocityReport {
        let mut series = vec![ActivitySeries::new(); graph.node_count()];
        let mut unparsed = 0usize;

        for transfer in transfers {
            let Some(timestamp) = transfer.timestamp else {
                unparsed += 1;
                continue;
            };
            let (Some(sender), Some(receiver)) =
                (graph.node_id(&transfer.sender), graph.node_id(&transfer.receiver))
            else {
                continue;
            };

            series[sender].push(timestamp);
            if !transfer.is_self_transfer() {
                series[receiver].push(timestamp);
            }
        }

        if unparsed > 0 {
            debug!(
                "⏱️ {} transfers without a usable timestamp left out of velocity windows",
                unparsed
            );
        }

        let peak_counts: Vec<usize> = series
            .iter_mut()
            .map(|s| s.peak_window_count(self.window))
            .collect();
        let flagged = peak_counts
            .iter()
            .map(|&peak| peak >= self.min_transactions)
            .collect();

        VelocityReport { peak_counts, flagged }
    }
}

/// Ring assembly: turns detector output into named, non-overlapping rings
///
/// Passes run in fixed precedence (cycles, fan-in aggregators, shell chains).
/// The first ring to claim an account owns it for the rest of the run.

use rand::Rng;
use tracing::{debug, instrument};

use crate::config::FanSettings;
use crate::core::{
    FraudRing, RingPattern, Transfer, CYCLE_RISK_BASE, CYCLE_RISK_SPREAD, FAN_IN_RISK_BASE,
    FAN_IN_RISK_SPREAD, RING_ID_PREFIX, SHELL_RISK_BASE, SHELL_RISK_SPREAD,
};
use crate::graph::{NodeId, TransferGraph};
use crate::util::round_to;

use super::cycles::CycleReport;
use super::fan::FanReport;
use super::shell::ShellReport;

/// Rings in creation order plus the account -> owning ring map
#[derive(Debug, Clone, Default)]
pub struct RingAssembly {
    pub rings: Vec<FraudRing>,
    /// Member node ids, parallel to `rings`
    pub members: Vec<Vec<NodeId>>,
    owner: Vec<Option<usize>>,
}

impl RingAssembly {
    fn with_nodes(node_count: usize) -> Self {
        Self {
            rings: Vec::new(),
            members: Vec::new(),
            owner: vec![None; node_count],
        }
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Index of the ring that claimed the account first
    pub fn owner_of(&self, node: NodeId) -> Option<usize> {
        self.owner.get(node).copied().flatten()
    }

    pub fn is_claimed(&self, node: NodeId) -> bool {
        self.owner_of(node).is_some()
    }

    fn push(
        &mut self,
        graph: &TransferGraph,
        members: Vec<NodeId>,
        pattern_type: RingPattern,
        risk_score: f64,
    ) {
        let idx = self.rings.len();
        for &node in &members {
            if self.owner[node].is_none() {
                self.owner[node] = Some(idx);
            }
        }

        self.rings.push(FraudRing {
            ring_id: format_ring_id(idx + 1),
            member_accounts: members.iter().map(|&n| graph.account(n).to_string()).collect(),
            pattern_type,
            risk_score,
            mastermind_account: None,
            transaction_count: 0,
            total_amount: 0.0,
        });
        self.members.push(members);
    }

    /// Count and sum transfers with both endpoints inside each ring
    fn fill_transaction_stats(&mut self, graph: &TransferGraph, transfers: &[Transfer]) {
        let mut rings_of: Vec<Vec<usize>> = vec![Vec::new(); graph.node_count()];
        for (idx, members) in self.members.iter().enumerate() {
            for &node in members {
                rings_of[node].push(idx);
            }
        }

        let mut totals = vec![0.0f64; self.rings.len()];
        for transfer in transfers {
            let (Some(sender), Some(receiver)) =
                (graph.node_id(&transfer.sender), graph.node_id(&transfer.receiver))
            else {
                continue;
            };
            for &idx in &rings_of[sender] {
                if rings_of[receiver].contains(&idx) {
                    self.rings[idx].transaction_count += 1;
                    totals[idx] += transfer.amount;
                }
            }
        }

        for (ring, total) in self.rings.iter_mut().zip(totals) {
            ring.total_amount = round_to(total, 2);
        }
    }
}

pub fn format_ring_id(sequence: usize) -> String {
    format!("{}{:03}", RING_ID_PREFIX, sequence)
}

/// `base + U(0, spread)` at one decimal
fn jittered_risk<R: Rng + ?Sized>(rng: &mut R, base: f64, spread: f64) -> f64 {
    round_to(base + rng.gen_range(0.0..=spread), 1)
}

#[derive(Debug, Clone)]
pub struct RingAssembler {
    fan_min_senders: usize,
}

impl RingAssembler {
    pub fn new(fan_min_senders: usize) -> Self {
        Self { fan_min_senders }
    }

    pub fn from_settings(settings: &FanSettings) -> Self {
        Self::new(settings.min_ring_senders)
    }

    #[instrument(skip_all, fields(cycles = cycles.len(), chains = shells.chains().len()))]
    pub fn assemble<R: Rng + ?Sized>(
        &self,
        graph: &TransferGraph,
        transfers: &[Transfer],
        cycles: &CycleReport,
        fans: &FanReport,
        shells: &ShellReport,
        rng: &mut R,
    ) -> RingAssembly {
        let mut assembly = RingAssembly::with_nodes(graph.node_count());

        for cycle in cycles.cycles() {
            let Some(pattern) = RingPattern::cycle(cycle.len()) else {
                continue;
            };
            let risk = jittered_risk(rng, CYCLE_RISK_BASE, CYCLE_RISK_SPREAD);
            assembly.push(graph, cycle.clone(), pattern, risk);
        }
        let cycle_rings = assembly.len();

        for aggregator in fans.fan_in_accounts() {
            if assembly.is_claimed(aggregator) {
                continue;
            }
            // in-edges are already one per distinct sender
            let senders: Vec<NodeId> = graph
                .in_edges(aggregator)
                .iter()
                .map(|edge| edge.peer)
                .filter(|&sender| sender != aggregator)
                .collect();
            if senders.len() < self.fan_min_senders {
                continue;
            }

            let mut members = Vec::with_capacity(senders.len() + 1);
            members.push(aggregator);
            members.extend(senders);
            let risk = jittered_risk(rng, FAN_IN_RISK_BASE, FAN_IN_RISK_SPREAD);
            assembly.push(graph, members, RingPattern::FanIn, risk);
        }
        let fan_rings = assembly.len() - cycle_rings;

        for chain in shells.chains() {
            if chain.iter().any(|&node| assembly.is_claimed(node)) {
                continue;
            }
            let risk = jittered_risk(rng, SHELL_RISK_BASE, SHELL_RISK_SPREAD);
            assembly.push(graph, chain.clone(), RingPattern::ShellChain, risk);
        }

        assembly.fill_transaction_stats(graph, transfers);

        debug!(
            "💍 Assembled {} rings ({} cycle, {} fan-in, {} shell)",
            assembly.len(),
            cycle_rings,
            fan_rings,
            assembly.len() - cycle_rings - fan_rings
        );
        assembly
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::cycles::CycleFinder;
    use crate::detection::fan::FanDetector;
    use crate::detection::shell::ShellChainDetector;
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn transfers_of(edges: &[(&str, &str, f64)]) -> Vec<Transfer> {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        edges
            .iter()
            .enumerate()
            .map(|(i, (from, to, amount))| {
                Transfer::new(format!("T{}", i), *from, *to, *amount, ts)
            })
            .collect()
    }

    fn assemble(transfers: &[Transfer], fan_threshold: usize) -> (TransferGraph, RingAssembly) {
        let graph = TransferGraph::from_transfers(transfers);
        let cycles = CycleFinder::new(3, 5).find(&graph);
        let fans = FanDetector::new(fan_threshold).detect(&graph);
        let shells = ShellChainDetector::new(1_000.0, 2).detect(&graph);
        let mut rng = StdRng::seed_from_u64(7);
        let assembly =
            RingAssembler::new(3).assemble(&graph, transfers, &cycles, &fans, &shells, &mut rng);
        (graph, assembly)
    }

    #[test]
    fn test_ring_ids_are_zero_padded() {
        assert_eq!(format_ring_id(1), "RING_001");
        assert_eq!(format_ring_id(42), "RING_042");
        assert_eq!(format_ring_id(1234), "RING_1234");
    }

    #[test]
    fn test_cycle_ring_stats_and_risk_band() {
        let transfers = transfers_of(&[
            ("A", "B", 100.0),
            ("B", "C", 90.0),
            ("C", "A", 80.0),
            ("A", "B", 100.0),
            ("C", "X", 5_000.0),
        ]);
        let (_, assembly) = assemble(&transfers, 5);

        assert_eq!(assembly.len(), 1);
        let ring = &assembly.rings[0];
        assert_eq!(ring.ring_id, "RING_001");
        assert_eq!(ring.pattern_type, RingPattern::CycleLength3);
        assert_eq!(ring.member_accounts, vec!["A", "B", "C"]);
        assert_eq!(ring.transaction_count, 4);
        assert_eq!(ring.total_amount, 370.0);
        assert!((85.0..=95.0).contains(&ring.risk_score));
    }

    #[test]
    fn test_cycle_claim_beats_fan_in() {
        // HUB is on a triangle and also receives from three other senders
        let transfers = transfers_of(&[
            ("HUB", "B", 100.0),
            ("B", "C", 100.0),
            ("C", "HUB", 100.0),
            ("S1", "HUB", 100.0),
            ("S2", "HUB", 100.0),
            ("S3", "HUB", 100.0),
        ]);
        let (graph, assembly) = assemble(&transfers, 3);

        assert_eq!(assembly.len(), 1);
        assert_eq!(assembly.rings[0].pattern_type, RingPattern::CycleLength3);
        assert_eq!(assembly.owner_of(graph.node_id("HUB").unwrap()), Some(0));
        assert_eq!(assembly.owner_of(graph.node_id("S1").unwrap()), None);
    }

    #[test]
    fn test_fan_in_ring_lists_aggregator_first() {
        let transfers = transfers_of(&[
            ("S1", "AGG", 200.0),
            ("S2", "AGG", 200.0),
            ("S3", "AGG", 200.0),
        ]);
        let (_, assembly) = assemble(&transfers, 3);

        assert_eq!(assembly.len(), 1);
        let ring = &assembly.rings[0];
        assert_eq!(ring.pattern_type, RingPattern::FanIn);
        assert_eq!(ring.member_accounts, vec!["AGG", "S1", "S2", "S3"]);
        assert_eq!(ring.transaction_count, 3);
        assert!((65.0..=85.0).contains(&ring.risk_score));
    }

    #[test]
    fn test_two_senders_make_no_fan_ring() {
        let transfers = transfers_of(&[("S1", "AGG", 200.0), ("S2", "AGG", 200.0)]);
        let (_, assembly) = assemble(&transfers, 2);
        assert!(assembly.is_empty());
    }

    #[test]
    fn test_claimed_sender_keeps_first_owner() {
        // S1 sits on a triangle before it feeds the aggregator
        let transfers = transfers_of(&[
            ("S1", "P", 10.0),
            ("P", "Q", 10.0),
            ("Q", "S1", 10.0),
            ("S1", "AGG", 10.0),
            ("S2", "AGG", 10.0),
            ("S3", "AGG", 10.0),
        ]);
        let (graph, assembly) = assemble(&transfers, 3);

        assert_eq!(assembly.len(), 2);
        assert_eq!(assembly.rings[1].ring_id, "RING_002");
        assert!(assembly.rings[1].member_accounts.contains(&"S1".to_string()));
        assert_eq!(assembly.owner_of(graph.node_id("S1").unwrap()), Some(0));
        assert_eq!(assembly.owner_of(graph.node_id("S2").unwrap()), Some(1));
    }

    #[test]
    fn test_shell_ring_skipped_when_member_claimed() {
        // the triangle is also a relay chain, but its members already belong to the cycle ring
        let transfers = transfers_of(&[
            ("A", "B", 50.0),
            ("B", "C", 50.0),
            ("C", "A", 50.0),
            ("SRC", "I1", 50.0),
            ("I1", "I2", 50.0),
            ("I2", "DST", 50.0),
        ]);
        let (_, assembly) = assemble(&transfers, 5);

        let patterns: Vec<RingPattern> = assembly.rings.iter().map(|r| r.pattern_type).collect();
        assert_eq!(patterns, vec![RingPattern::CycleLength3, RingPattern::ShellChain]);
        let shell = &assembly.rings[1];
        assert_eq!(shell.ring_id, "RING_002");
        assert_eq!(shell.member_accounts, vec!["I1", "I2"]);
        assert!((50.0..=75.0).contains(&shell.risk_score));
    }

    #[test]
    fn test_seeded_rng_reproduces_risk() {
        let transfers = transfers_of(&[("A", "B", 1.0), ("B", "C", 1.0), ("C", "A", 1.0)]);
        let (_, first) = assemble(&transfers, 5);
        let (_, second) = assemble(&transfers, 5);
        assert_eq!(first.rings[0].risk_score, second.rings[0].risk_score);
    }
}

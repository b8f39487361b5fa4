/// Composite suspicion scoring from the four detector signals

use crate::core::{
    FanStatus, ScoreBreakdown, CYCLE_SCORE_LENGTH_3, CYCLE_SCORE_LENGTH_4, CYCLE_SCORE_LENGTH_5,
    FAN_RESIDUAL_CAP, FAN_RESIDUAL_MIN_DEGREE, FAN_RESIDUAL_PER_DEGREE, FAN_SCORE_BOTH,
    FAN_SCORE_SINGLE, SHELL_SCORE_DEEP, SHELL_SCORE_PAIR, SHELL_SCORE_SINGLE, VELOCITY_SCORE,
};

/// Everything the scorer needs to know about one account
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringInputs {
    /// Length of the shortest reportable cycle through the account
    pub shortest_cycle: Option<usize>,
    pub high_velocity: bool,
    pub fan_status: FanStatus,
    pub in_degree: usize,
    pub out_degree: usize,
    /// Length of the shell chain holding the account, zero if none
    pub shell_depth: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, inputs: &ScoringInputs) -> ScoreBreakdown {
        ScoreBreakdown {
            cycle_score: Self::cycle_component(inputs.shortest_cycle),
            velocity_score: if inputs.high_velocity { VELOCITY_SCORE } else { 0.0 },
            fan_score: Self::fan_component(inputs.fan_status, inputs.in_degree, inputs.out_degree),
            shell_score: Self::shell_component(inputs.shell_depth),
        }
    }

    fn cycle_component(shortest: Option<usize>) -> f64 {
        match shortest {
            None => 0.0,
            Some(len) if len <= 3 => CYCLE_SCORE_LENGTH_3,
            Some(4) => CYCLE_SCORE_LENGTH_4,
            Some(_) => CYCLE_SCORE_LENGTH_5,
        }
    }

    fn fan_component(status: FanStatus, in_degree: usize, out_degree: usize) -> f64 {
        match status {
            FanStatus::Both => FAN_SCORE_BOTH,
            FanStatus::FanIn | FanStatus::FanOut => FAN_SCORE_SINGLE,
            FanStatus::None => {
                // Sub-threshold hubs still earn a little
                let max_degree = in_degree.max(out_degree);
                if max_degree >= FAN_RESIDUAL_MIN_DEGREE {
                    (FAN_RESIDUAL_PER_DEGREE * max_degree as f64).min(FAN_RESIDUAL_CAP)
                } else {
                    0.0
                }
            }
        }
    }

    fn shell_component(depth: usize) -> f64 {
        match depth {
            0 => 0.0,
            1 => SHELL_SCORE_SINGLE,
            2 => SHELL_SCORE_PAIR,
            _ => SHELL_SCORE_DEEP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn score(inputs: ScoringInputs) -> ScoreBreakdown {
        ScoringEngine::new().score(&inputs)
    }

    #[test]
    fn test_every_signal_maxed_totals_exactly_100() {
        let breakdown = score(ScoringInputs {
            shortest_cycle: Some(3),
            high_velocity: true,
            fan_status: FanStatus::Both,
            in_degree: 9,
            out_degree: 9,
            shell_depth: 3,
        });
        assert_eq!(breakdown.cycle_score, 40.0);
        assert_eq!(breakdown.velocity_score, 25.0);
        assert_eq!(breakdown.fan_score, 20.0);
        assert_eq!(breakdown.shell_score, 15.0);
        assert_eq!(breakdown.total(), 100.0);
    }

    #[test]
    fn test_cycle_component_by_length() {
        let at = |len| score(ScoringInputs { shortest_cycle: Some(len), ..Default::default() });
        assert_eq!(at(3).cycle_score, 40.0);
        assert_eq!(at(4).cycle_score, 35.0);
        assert_eq!(at(5).cycle_score, 30.0);
        assert_eq!(score(ScoringInputs::default()).cycle_score, 0.0);
    }

    #[test]
    fn test_fan_residual_for_small_hubs() {
        let at = |in_degree, out_degree| {
            score(ScoringInputs { in_degree, out_degree, ..Default::default() }).fan_score
        };
        assert_eq!(at(2, 1), 0.0);
        assert_eq!(at(3, 0), 6.0);
        assert_eq!(at(1, 4), 8.0);
        assert_eq!(at(7, 0), 10.0);

        let single = score(ScoringInputs {
            fan_status: FanStatus::FanOut,
            out_degree: 5,
            ..Default::default()
        });
        assert_eq!(single.fan_score, 15.0);
    }

    #[test]
    fn test_shell_component_by_depth() {
        let at = |shell_depth| {
            score(ScoringInputs { shell_depth, ..Default::default() }).shell_score
        };
        assert_eq!(at(0), 0.0);
        assert_eq!(at(1), 5.0);
        assert_eq!(at(2), 10.0);
        assert_eq!(at(3), 15.0);
        assert_eq!(at(8), 15.0);
    }

    fn fan_status() -> impl Strategy<Value = FanStatus> {
        prop_oneof![
            Just(FanStatus::None),
            Just(FanStatus::FanIn),
            Just(FanStatus::FanOut),
            Just(FanStatus::Both),
        ]
    }

    proptest! {
        #[test]
        fn prop_score_stays_in_bounds(
            shortest_cycle in proptest::option::of(3usize..=5),
            high_velocity in any::<bool>(),
            fan_status in fan_status(),
            in_degree in 0usize..1_000,
            out_degree in 0usize..1_000,
            shell_depth in 0usize..50,
        ) {
            let breakdown = score(ScoringInputs {
                shortest_cycle,
                high_velocity,
                fan_status,
                in_degree,
                out_degree,
                shell_depth,
            });
            let total = breakdown.total();
            prop_assert!((0.0..=100.0).contains(&total));
            prop_assert!(breakdown.cycle_score >= 0.0 && breakdown.fan_score >= 0.0);
        }
    }
}

/// Detection constants: default thresholds, score weights and risk bands

// Cycle search bounds (inclusive)
pub const MIN_CYCLE_LENGTH: usize = 3;
pub const MAX_CYCLE_LENGTH: usize = 5;

// Velocity window
pub const VELOCITY_WINDOW_HOURS: i64 = 72;
pub const VELOCITY_MIN_TRANSACTIONS: usize = 8;

// Fan detection
pub const FAN_DEGREE_THRESHOLD: usize = 5;
pub const FAN_RING_MIN_SENDERS: usize = 3;

// Shell layering
pub const SHELL_LOW_VALUE_THRESHOLD: f64 = 1_000.0;
pub const SHELL_MIN_CHAIN_LENGTH: usize = 2;

// Score components
pub const CYCLE_SCORE_LENGTH_3: f64 = 40.0;
pub const CYCLE_SCORE_LENGTH_4: f64 = 35.0;
pub const CYCLE_SCORE_LENGTH_5: f64 = 30.0;
pub const VELOCITY_SCORE: f64 = 25.0;
pub const FAN_SCORE_BOTH: f64 = 20.0;
pub const FAN_SCORE_SINGLE: f64 = 15.0;
pub const FAN_RESIDUAL_MIN_DEGREE: usize = 3;
pub const FAN_RESIDUAL_PER_DEGREE: f64 = 2.0;
pub const FAN_RESIDUAL_CAP: f64 = 10.0;
pub const SHELL_SCORE_DEEP: f64 = 15.0;
pub const SHELL_SCORE_PAIR: f64 = 10.0;
pub const SHELL_SCORE_SINGLE: f64 = 5.0;
pub const MAX_SUSPICION_SCORE: f64 = 100.0;

// Ring risk bands: base + uniform(0, spread)
pub const CYCLE_RISK_BASE: f64 = 85.0;
pub const CYCLE_RISK_SPREAD: f64 = 10.0;
pub const FAN_IN_RISK_BASE: f64 = 65.0;
pub const FAN_IN_RISK_SPREAD: f64 = 20.0;
pub const SHELL_RISK_BASE: f64 = 50.0;
pub const SHELL_RISK_SPREAD: f64 = 25.0;

// Mastermind centrality weights
pub const MASTERMIND_OUT_WEIGHT: usize = 3;
pub const MASTERMIND_IN_WEIGHT: usize = 2;
pub const MASTERMIND_SCALE: f64 = 5.0;

pub const RING_ID_PREFIX: &str = "RING_";

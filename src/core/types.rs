/// Core data types shared by the detection pipeline and its collaborators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::constants::MAX_SUSPICION_SCORE;

/// A single ledger transfer as supplied by the ingestion layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    /// Transaction identifier (opaque)
    pub id: String,

    /// Sending account
    pub sender: String,

    /// Receiving account
    pub receiver: String,

    /// Non-negative amount in currency units
    pub amount: f64,

    /// Settlement instant; `None` when the source value could not be parsed
    pub timestamp: Option<DateTime<Utc>>,
}

impl Transfer {
    pub fn new(
        id: impl Into<String>,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
            timestamp: Some(timestamp),
        }
    }

    pub fn is_self_transfer(&self) -> bool {
        self.sender == self.receiver
    }
}

/// Structural pattern names as they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MulePattern {
    #[serde(rename = "cycle_length_3")]
    CycleLength3,
    #[serde(rename = "cycle_length_4")]
    CycleLength4,
    #[serde(rename = "cycle_length_5")]
    CycleLength5,
    #[serde(rename = "fan_in")]
    FanIn,
    #[serde(rename = "fan_out")]
    FanOut,
    #[serde(rename = "high_velocity")]
    HighVelocity,
    #[serde(rename = "shell_chain")]
    ShellChain,
    #[serde(rename = "low_transaction_intermediary")]
    LowTransactionIntermediary,
}

impl MulePattern {
    /// Pattern for a cycle of the given length, if that length is reportable
    pub fn cycle(length: usize) -> Option<Self> {
        match length {
            3 => Some(Self::CycleLength3),
            4 => Some(Self::CycleLength4),
            5 => Some(Self::CycleLength5),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CycleLength3 => "cycle_length_3",
            Self::CycleLength4 => "cycle_length_4",
            Self::CycleLength5 => "cycle_length_5",
            Self::FanIn => "fan_in",
            Self::FanOut => "fan_out",
            Self::HighVelocity => "high_velocity",
            Self::ShellChain => "shell_chain",
            Self::LowTransactionIntermediary => "low_transaction_intermediary",
        }
    }
}

impl fmt::Display for MulePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural pattern a ring was formed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RingPattern {
    #[serde(rename = "cycle_length_3")]
    CycleLength3,
    #[serde(rename = "cycle_length_4")]
    CycleLength4,
    #[serde(rename = "cycle_length_5")]
    CycleLength5,
    #[serde(rename = "fan_in")]
    FanIn,
    #[serde(rename = "shell_chain")]
    ShellChain,
}

impl RingPattern {
    pub fn cycle(length: usize) -> Option<Self> {
        match length {
            3 => Some(Self::CycleLength3),
            4 => Some(Self::CycleLength4),
            5 => Some(Self::CycleLength5),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        MulePattern::from(*self).as_str()
    }
}

impl From<RingPattern> for MulePattern {
    fn from(pattern: RingPattern) -> Self {
        match pattern {
            RingPattern::CycleLength3 => Self::CycleLength3,
            RingPattern::CycleLength4 => Self::CycleLength4,
            RingPattern::CycleLength5 => Self::CycleLength5,
            RingPattern::FanIn => Self::FanIn,
            RingPattern::ShellChain => Self::ShellChain,
        }
    }
}

impl fmt::Display for RingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fan classification of a single account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanStatus {
    #[default]
    None,
    FanIn,
    FanOut,
    Both,
}

impl FanStatus {
    pub fn from_flags(fan_in: bool, fan_out: bool) -> Self {
        match (fan_in, fan_out) {
            (true, true) => Self::Both,
            (true, false) => Self::FanIn,
            (false, true) => Self::FanOut,
            (false, false) => Self::None,
        }
    }

    pub fn is_fan_in(&self) -> bool {
        matches!(self, Self::FanIn | Self::Both)
    }

    pub fn is_fan_out(&self) -> bool {
        matches!(self, Self::FanOut | Self::Both)
    }
}

/// Per-signal contribution to an account's suspicion score
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub cycle_score: f64,
    pub velocity_score: f64,
    pub fan_score: f64,
    pub shell_score: f64,
}

impl ScoreBreakdown {
    /// Rounded sum of all components, capped at 100
    pub fn total(&self) -> f64 {
        let sum = self.cycle_score + self.velocity_score + self.fan_score + self.shell_score;
        sum.round().min(MAX_SUSPICION_SCORE)
    }
}

/// A named group of accounts sharing one structural pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudRing {
    /// Sequential identifier (`RING_001`, `RING_002`, ...)
    pub ring_id: String,

    /// Members in structural order (cycle order, aggregator first, chain order)
    pub member_accounts: Vec<String>,

    pub pattern_type: RingPattern,

    /// Risk score in [0, 100], one decimal
    pub risk_score: f64,

    /// Most central member, filled in after mastermind selection
    pub mastermind_account: Option<String>,

    /// Transfers whose sender and receiver are both members
    pub transaction_count: usize,

    /// Sum of those transfers, two decimals
    pub total_amount: f64,
}

/// An account with at least one detected pattern and a positive score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousAccount {
    pub account_id: String,
    pub suspicion_score: f64,
    pub detected_patterns: Vec<MulePattern>,
    pub ring_id: Option<String>,
    pub is_mastermind: bool,
    pub mastermind_score: Option<f64>,
    pub score_breakdown: ScoreBreakdown,
}

/// Counts and timing derived from a finished analysis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_accounts_analyzed: usize,
    pub suspicious_accounts_flagged: usize,
    pub fraud_rings_detected: usize,
    pub mastermind_accounts_identified: usize,
    pub processing_time_seconds: f64,
    /// Always zero: no false-positive filter runs in this engine
    pub false_positives_filtered: usize,
}

/// Complete output of one engine invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_id: String,
    pub timestamp: DateTime<Utc>,
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    pub fraud_rings: Vec<FraudRing>,
    pub summary: AnalysisSummary,
}

impl AnalysisResult {
    pub fn account(&self, account_id: &str) -> Option<&SuspiciousAccount> {
        self.suspicious_accounts
            .iter()
            .find(|a| a.account_id == account_id)
    }

    pub fn ring(&self, ring_id: &str) -> Option<&FraudRing> {
        self.fraud_rings.iter().find(|r| r.ring_id == ring_id)
    }
}

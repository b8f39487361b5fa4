/// Detection threshold configuration

use chrono::Duration as ChronoDuration;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::constants::*;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub cycles: CycleSettings,
    pub velocity: VelocitySettings,
    pub fan: FanSettings,
    pub shell: ShellSettings,
    pub risk: RiskSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CycleSettings {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            min_length: MIN_CYCLE_LENGTH,
            max_length: MAX_CYCLE_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VelocitySettings {
    pub window_hours: i64,
    pub min_transactions: usize,
}

impl Default for VelocitySettings {
    fn default() -> Self {
        Self {
            window_hours: VELOCITY_WINDOW_HOURS,
            min_transactions: VELOCITY_MIN_TRANSACTIONS,
        }
    }
}

impl VelocitySettings {
    /// Window as a duration, `None` when the hour count overflows it
    pub fn window(&self) -> Option<ChronoDuration> {
        ChronoDuration::try_hours(self.window_hours)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FanSettings {
    /// Distinct-neighbour count at which fan-in / fan-out is flagged
    pub degree_threshold: usize,
    /// Distinct senders an aggregator needs before a fan-in ring is formed
    pub min_ring_senders: usize,
}

impl Default for FanSettings {
    fn default() -> Self {
        Self {
            degree_threshold: FAN_DEGREE_THRESHOLD,
            min_ring_senders: FAN_RING_MIN_SENDERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ShellSettings {
    pub low_value_threshold: f64,
    pub min_chain_length: usize,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            low_value_threshold: SHELL_LOW_VALUE_THRESHOLD,
            min_chain_length: SHELL_MIN_CHAIN_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RiskSettings {
    /// Seed for the ring risk jitter; unset draws from the thread RNG
    pub seed: Option<u64>,
}

impl DetectionConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Only cycle lengths with a named pattern can be reported
        let reportable = MIN_CYCLE_LENGTH..=MAX_CYCLE_LENGTH;
        if !reportable.contains(&self.cycles.min_length)
            || !reportable.contains(&self.cycles.max_length)
            || self.cycles.min_length > self.cycles.max_length
        {
            return Err(ConfigError::Invalid(format!(
                "cycle bounds {}..={} must be a range within {}..={}",
                self.cycles.min_length, self.cycles.max_length, MIN_CYCLE_LENGTH, MAX_CYCLE_LENGTH
            )));
        }
        let window_ok = self
            .velocity
            .window()
            .is_some_and(|window| window > ChronoDuration::zero());
        if !window_ok {
            return Err(ConfigError::Invalid(format!(
                "velocity window must be a positive, representable span, got {}h",
                self.velocity.window_hours
            )));
        }
        if self.velocity.min_transactions == 0 || self.fan.degree_threshold == 0 {
            return Err(ConfigError::Invalid(
                "velocity and fan thresholds must be at least 1".to_string(),
            ));
        }
        let low_value = self.shell.low_value_threshold;
        if low_value.is_nan() || low_value <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "shell low-value threshold must be positive, got {}",
                low_value
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_constants() {
        let config = DetectionConfig::default();
        assert_eq!(config.cycles.min_length, 3);
        assert_eq!(config.cycles.max_length, 5);
        assert_eq!(config.velocity.window_hours, 72);
        assert_eq!(config.velocity.min_transactions, 8);
        assert_eq!(config.fan.degree_threshold, 5);
        assert_eq!(config.fan.min_ring_senders, 3);
        assert_eq!(config.shell.low_value_threshold, 1_000.0);
        assert_eq!(config.risk.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DetectionConfig::from_toml_str(
            r#"
            [fan]
            degree_threshold = 3

            [risk]
            seed = 42
            "#,
        )
        .unwrap();

        assert_eq!(config.fan.degree_threshold, 3);
        assert_eq!(config.fan.min_ring_senders, 3);
        assert_eq!(config.velocity.min_transactions, 8);
        assert_eq!(config.risk.seed, Some(42));
    }

    #[test]
    fn test_inverted_cycle_bounds_rejected() {
        let err = DetectionConfig::from_toml_str("[cycles]\nmin_length = 5\nmax_length = 3\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = DetectionConfig::from_toml_str("[cycles]\nmax_length = 6\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let narrowed = DetectionConfig::from_toml_str("[cycles]\nmax_length = 4\n").unwrap();
        assert_eq!(narrowed.cycles.max_length, 4);
    }

    #[test]
    fn test_unrepresentable_window_rejected() {
        for hours in ["0", "-5", "9223372036854775807"] {
            let toml = format!("[velocity]\nwindow_hours = {}\n", hours);
            let err = DetectionConfig::from_toml_str(&toml).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "accepted {}h", hours);
        }

        let year = DetectionConfig::from_toml_str("[velocity]\nwindow_hours = 8760\n").unwrap();
        assert_eq!(year.velocity.window(), Some(ChronoDuration::hours(8760)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[velocity]\nwindow_hours = 24").unwrap();

        let config = DetectionConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.velocity.window_hours, 24);

        let missing = DetectionConfig::load_from_file("/nonexistent/mulewatch.toml");
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}

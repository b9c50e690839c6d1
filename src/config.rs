// src/config.rs
//
// Central configuration for an evaluation run.
//
// PlayConfig is built once, validated once, and passed by reference into
// the loop. There is no config-by-mutation after construction: anything
// run-specific goes through the builder methods before `validate()`.

use serde::{Deserialize, Serialize};

use crate::command::CommandRanges;

/// Errors raised during startup configuration validation.
///
/// Configuration errors abort the run before the loop starts; nothing in
/// this taxonomy is recoverable mid-run.
#[derive(Debug, Clone)]
pub enum ConfigError {
    InvalidAxisRange {
        axis: &'static str,
        message: String,
    },
    InvalidWindow {
        message: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidAxisRange { axis, message } => {
                write!(f, "invalid axis range '{}': {}", axis, message)
            }
            ConfigError::InvalidWindow { message } => {
                write!(f, "invalid window configuration: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Immutable configuration for one evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayConfig {
    /// Human-readable config / release version.
    pub version: String,
    /// Nominal episode length in ticks. The run executes
    /// `2 * episode_length + 1` ticks total.
    pub episode_length: u64,
    /// Number of leading ticks for which full per-step telemetry is
    /// retained. Memory for the state log is bounded by this regardless
    /// of run length.
    pub window_length: u64,
    /// Tick at which the one-shot episode-reward summary is printed.
    pub reward_log_tick: u64,
    /// Agent index whose signals feed the state log.
    pub robot_index: usize,
    /// Joint index whose signals feed the state log.
    pub joint_index: usize,
    /// Multiplier from policy action to joint position target.
    pub action_scale: f64,
    /// Per-axis command scaling for live operator input.
    pub command_ranges: CommandRanges,
    /// Whether live operator commands overwrite the observation's
    /// command slice each tick.
    pub live_commands: bool,
}

impl Default for PlayConfig {
    fn default() -> Self {
        let episode_length = 1000;
        Self {
            version: "locoplay-v0.1".to_string(),
            episode_length,
            window_length: 200,
            reward_log_tick: episode_length,
            robot_index: 0,
            joint_index: 1,
            action_scale: 0.5,
            command_ranges: CommandRanges::default(),
            live_commands: false,
        }
    }
}

impl PlayConfig {
    pub fn with_episode_length(mut self, episode_length: u64) -> Self {
        self.episode_length = episode_length;
        self.reward_log_tick = episode_length;
        self
    }

    pub fn with_window_length(mut self, window_length: u64) -> Self {
        self.window_length = window_length;
        self
    }

    pub fn with_reward_log_tick(mut self, reward_log_tick: u64) -> Self {
        self.reward_log_tick = reward_log_tick;
        self
    }

    pub fn with_robot_index(mut self, robot_index: usize) -> Self {
        self.robot_index = robot_index;
        self
    }

    pub fn with_joint_index(mut self, joint_index: usize) -> Self {
        self.joint_index = joint_index;
        self
    }

    pub fn with_command_ranges(mut self, ranges: CommandRanges) -> Self {
        self.command_ranges = ranges;
        self
    }

    pub fn with_live_commands(mut self, enabled: bool) -> Self {
        self.live_commands = enabled;
        self
    }

    /// Total number of ticks the loop executes.
    pub fn total_ticks(&self) -> u64 {
        2 * self.episode_length + 1
    }

    /// Fail fast on malformed configuration before the loop starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.command_ranges.validate()?;

        if self.episode_length == 0 {
            return Err(ConfigError::InvalidWindow {
                message: "episode_length must be >= 1".to_string(),
            });
        }
        if !self.action_scale.is_finite() {
            return Err(ConfigError::InvalidWindow {
                message: format!("action_scale must be finite, got {}", self.action_scale),
            });
        }
        // A summary tick past the end of the run would silently never fire.
        if self.reward_log_tick >= self.total_ticks() {
            return Err(ConfigError::InvalidWindow {
                message: format!(
                    "reward_log_tick {} is beyond the run of {} ticks",
                    self.reward_log_tick,
                    self.total_ticks()
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::AxisRange;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = PlayConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.reward_log_tick, cfg.episode_length);
        assert_eq!(cfg.total_ticks(), 2001);
    }

    #[test]
    fn test_builder_keeps_reward_log_tick_in_sync() {
        let cfg = PlayConfig::default().with_episode_length(50);
        assert_eq!(cfg.reward_log_tick, 50);
        assert_eq!(cfg.total_ticks(), 101);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_axis_range() {
        let mut cfg = PlayConfig::default();
        cfg.command_ranges.vel_x = AxisRange::new(f64::NAN, 3.0);
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAxisRange { axis: "vel_x", .. }));
    }

    #[test]
    fn test_validate_rejects_unreachable_summary_tick() {
        let cfg = PlayConfig::default()
            .with_episode_length(10)
            .with_reward_log_tick(21);
        assert!(cfg.validate().is_err());

        let cfg = PlayConfig::default()
            .with_episode_length(10)
            .with_reward_log_tick(20);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_episode_length() {
        let cfg = PlayConfig::default().with_episode_length(0);
        assert!(cfg.validate().is_err());
    }
}

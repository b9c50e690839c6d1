// src/types.rs
//
// Common shared types for the locoplay evaluation harness.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One observation vector per agent, in agent-index order.
pub type ObservationBatch = Vec<Vec<f64>>;

/// One action vector per agent, in agent-index order.
pub type ActionBatch = Vec<Vec<f64>>;

/// Named per-step scalar signals for one selected agent/joint.
///
/// BTreeMap keeps signal ordering deterministic for serialization
/// and test comparisons.
pub type StepRecord = BTreeMap<String, f64>;

/// Raw 3-component sample from an input device.
///
/// Components are device-native normalized values, nominally in [-1, 1].
/// The mapper is total over all reals; clamping device noise outside the
/// nominal range is the reader's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Forward/backward stick deflection.
    pub forward: f64,
    /// Left/right stick deflection.
    pub lateral: f64,
    /// Yaw stick deflection.
    pub yaw: f64,
}

impl RawSample {
    pub const ZERO: RawSample = RawSample {
        forward: 0.0,
        lateral: 0.0,
        yaw: 0.0,
    };

    pub fn new(forward: f64, lateral: f64, yaw: f64) -> Self {
        Self {
            forward,
            lateral,
            yaw,
        }
    }

    /// Euclidean norm of the raw 3-vector.
    pub fn norm(&self) -> f64 {
        (self.forward * self.forward + self.lateral * self.lateral + self.yaw * self.yaw).sqrt()
    }
}

/// Scaled command vector in the policy's command frame.
///
/// Produced fresh every tick from a raw sample; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommandVector {
    /// Commanded forward velocity (m/s).
    pub vel_x: f64,
    /// Commanded lateral velocity (m/s).
    pub vel_y: f64,
    /// Commanded yaw rate (rad/s).
    pub yaw_rate: f64,
    /// Dead-zone flag: raw input magnitude below threshold, meaning
    /// "no commanded motion" / hold-position intent.
    pub centered: bool,
}

impl CommandVector {
    /// Overwrite the command slice of one agent's observation vector.
    ///
    /// The command occupies slots [0..3); the centered flag is encoded as
    /// 1.0/0.0 in the last slot. Observations shorter than 4 slots are
    /// left untouched.
    pub fn inject(&self, obs: &mut [f64]) {
        if obs.len() < 4 {
            return;
        }
        obs[0] = self.vel_x;
        obs[1] = self.vel_y;
        obs[2] = self.yaw_rate;
        let last = obs.len() - 1;
        obs[last] = if self.centered { 1.0 } else { 0.0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_sample_norm() {
        let s = RawSample::new(3.0, 4.0, 0.0);
        assert!((s.norm() - 5.0).abs() < 1e-12);
        assert_eq!(RawSample::ZERO.norm(), 0.0);
    }

    #[test]
    fn test_inject_writes_command_slice_and_flag() {
        let cmd = CommandVector {
            vel_x: 1.5,
            vel_y: -0.5,
            yaw_rate: 0.25,
            centered: true,
        };
        let mut obs = vec![9.0; 8];
        cmd.inject(&mut obs);
        assert_eq!(&obs[0..3], &[1.5, -0.5, 0.25]);
        assert_eq!(obs[7], 1.0);
        // middle slots untouched
        assert_eq!(obs[3], 9.0);
        assert_eq!(obs[6], 9.0);
    }

    #[test]
    fn test_inject_skips_short_observation() {
        let cmd = CommandVector {
            vel_x: 1.0,
            vel_y: 2.0,
            yaw_rate: 3.0,
            centered: false,
        };
        let mut obs = vec![7.0; 3];
        cmd.inject(&mut obs);
        assert_eq!(obs, vec![7.0; 3]);
    }
}

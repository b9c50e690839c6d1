// src/policy.rs
//
// Policy seam. The trained network is an external collaborator; the
// harness only needs `infer`. The implementations here are stand-ins for
// tests and the demo binary.

use crate::types::{ActionBatch, ObservationBatch};

/// Locomotion control policy.
///
/// Side-effect-free from the caller's perspective: same observation batch,
/// same action batch.
pub trait Policy {
    /// Stable version string for run headers and logs.
    fn version(&self) -> &str;

    /// Map an observation batch to an action batch, one action vector per
    /// agent.
    fn infer(&self, observations: &ObservationBatch) -> ActionBatch;
}

/// Policy that always outputs zero actions (hold posture).
pub struct ZeroPolicy {
    action_dim: usize,
}

impl ZeroPolicy {
    pub fn new(action_dim: usize) -> Self {
        Self { action_dim }
    }
}

impl Policy for ZeroPolicy {
    fn version(&self) -> &str {
        "zero-v1"
    }

    fn infer(&self, observations: &ObservationBatch) -> ActionBatch {
        observations
            .iter()
            .map(|_| vec![0.0; self.action_dim])
            .collect()
    }
}

/// Policy that feeds back a scaled slice of the observation.
///
/// Crude damping controller; enough to exercise action-dependent
/// telemetry paths without a real network.
pub struct ProportionalPolicy {
    action_dim: usize,
    gain: f64,
}

impl ProportionalPolicy {
    pub fn new(action_dim: usize, gain: f64) -> Self {
        Self { action_dim, gain }
    }
}

impl Policy for ProportionalPolicy {
    fn version(&self) -> &str {
        "proportional-v1"
    }

    fn infer(&self, observations: &ObservationBatch) -> ActionBatch {
        observations
            .iter()
            .map(|obs| {
                (0..self.action_dim)
                    .map(|i| {
                        let x = obs.get(i).copied().unwrap_or(0.0);
                        (-self.gain * x).clamp(-1.0, 1.0)
                    })
                    .collect()
            })
            .collect()
    }
}

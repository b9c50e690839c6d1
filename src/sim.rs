// src/sim.rs
//
// Simulation backend seam.
//
// The physics engine is an external collaborator; the harness only sees
// the `Simulation` trait. `StubSim` is the in-crate stand-in: a
// deterministic synthetic backend (ChaCha8-seeded) used by tests and the
// demo binary, with a schedulable episode-termination table.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::types::{ActionBatch, ObservationBatch};

/// Result of stepping every agent's simulation by one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimStep {
    /// Post-step observation per agent.
    pub observations: ObservationBatch,
    /// Step reward per agent.
    pub rewards: Vec<f64>,
    /// Episode-termination flag per agent.
    pub dones: Vec<bool>,
    /// Per-episode reward summary, present only on ticks where at least
    /// one agent's episode ended. Values are per-episode means over the
    /// agents that terminated this tick.
    pub episode_rewards: Option<BTreeMap<String, f64>>,
}

impl SimStep {
    /// Number of agents whose episode ended this tick.
    pub fn num_terminations(&self) -> u64 {
        self.dones.iter().filter(|d| **d).count() as u64
    }
}

/// Per-agent scalar signals exposed for telemetry, addressed by agent
/// index and joint index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentSignals {
    pub dof_pos: f64,
    pub dof_vel: f64,
    pub dof_torque: f64,
    pub command_x: f64,
    pub command_y: f64,
    pub command_yaw: f64,
    pub base_vel_x: f64,
    pub base_vel_y: f64,
    pub base_vel_z: f64,
    pub base_vel_yaw: f64,
    pub contact_force_z: f64,
}

/// Abstract simulation backend.
///
/// One `step` per tick; both it and the signal accessors are expected to
/// always terminate (no timeout is modeled).
pub trait Simulation {
    fn num_agents(&self) -> usize;

    /// Current observation batch without stepping.
    fn observations(&self) -> ObservationBatch;

    /// Advance every agent by one tick under the given actions.
    fn step(&mut self, actions: &ActionBatch) -> SimStep;

    /// Telemetry signals for one agent/joint after the latest step.
    fn agent_signals(&self, agent: usize, joint: usize) -> AgentSignals;
}

/// Scheduled episode termination for the stub backend.
#[derive(Debug, Clone, Copy)]
struct ScheduledTermination {
    tick: u64,
    agent: usize,
    reward: f64,
}

/// Deterministic synthetic simulation backend.
///
/// Observations and signals are smooth noise from a seeded ChaCha8 stream,
/// so same seed + same actions reproduce a run exactly. Episode ends are
/// injected from a schedule rather than modeled physics.
pub struct StubSim {
    num_agents: usize,
    rng: ChaCha8Rng,
    tick: u64,
    observations: ObservationBatch,
    terminations: Vec<ScheduledTermination>,
    /// Standard deviation of the per-step reward noise.
    reward_noise: f64,
}

impl StubSim {
    pub fn new(num_agents: usize, obs_dim: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let observations = (0..num_agents)
            .map(|_| (0..obs_dim).map(|_| rng.gen_range(-0.1..0.1)).collect())
            .collect();
        Self {
            num_agents,
            rng,
            tick: 0,
            observations,
            terminations: Vec::new(),
            reward_noise: 0.0,
        }
    }

    /// Schedule an episode end for `agent` at `tick` with the given
    /// per-episode total reward.
    pub fn with_termination(mut self, tick: u64, agent: usize, reward: f64) -> Self {
        self.terminations.push(ScheduledTermination {
            tick,
            agent,
            reward,
        });
        self
    }

    /// Enable small random per-step rewards (default: zero).
    pub fn with_reward_noise(mut self, sigma: f64) -> Self {
        self.reward_noise = sigma;
        self
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }
}

impl Simulation for StubSim {
    fn num_agents(&self) -> usize {
        self.num_agents
    }

    fn observations(&self) -> ObservationBatch {
        self.observations.clone()
    }

    fn step(&mut self, _actions: &ActionBatch) -> SimStep {
        self.tick += 1;

        // Drift observations with bounded noise.
        for obs in &mut self.observations {
            for v in obs.iter_mut() {
                *v = (*v + self.rng.gen_range(-0.01..0.01)).clamp(-1.0, 1.0);
            }
        }

        let rewards: Vec<f64> = (0..self.num_agents)
            .map(|_| {
                if self.reward_noise > 0.0 {
                    self.rng.gen_range(0.0..self.reward_noise)
                } else {
                    0.0
                }
            })
            .collect();

        let mut dones = vec![false; self.num_agents];
        let mut ended: Vec<f64> = Vec::new();
        for t in &self.terminations {
            if t.tick == self.tick && t.agent < self.num_agents {
                dones[t.agent] = true;
                ended.push(t.reward);
            }
        }

        let episode_rewards = if ended.is_empty() {
            None
        } else {
            let mean = ended.iter().sum::<f64>() / ended.len() as f64;
            let mut map = BTreeMap::new();
            map.insert("total".to_string(), mean);
            Some(map)
        };

        SimStep {
            observations: self.observations.clone(),
            rewards,
            dones,
            episode_rewards,
        }
    }

    fn agent_signals(&self, agent: usize, joint: usize) -> AgentSignals {
        // Deterministic pseudo-signals derived from the observation state,
        // not the RNG, so repeated reads within a tick agree.
        let obs = match self.observations.get(agent) {
            Some(o) if !o.is_empty() => o,
            _ => return AgentSignals::default(),
        };
        let at = |i: usize| obs[i % obs.len()];
        let j = joint;

        AgentSignals {
            dof_pos: at(j),
            dof_vel: at(j + 1) * 10.0,
            dof_torque: at(j + 2) * 30.0,
            command_x: at(0),
            command_y: at(1),
            command_yaw: at(2),
            base_vel_x: at(3),
            base_vel_y: at(4),
            base_vel_z: at(5),
            base_vel_yaw: at(6),
            contact_force_z: at(j + 3).abs() * 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_sim_determinism() {
        let actions: ActionBatch = vec![vec![0.0; 12]; 2];

        let mut sim1 = StubSim::new(2, 48, 42).with_reward_noise(0.01);
        let mut sim2 = StubSim::new(2, 48, 42).with_reward_noise(0.01);

        for _ in 0..20 {
            let s1 = sim1.step(&actions);
            let s2 = sim2.step(&actions);
            assert_eq!(s1.observations, s2.observations);
            assert_eq!(s1.rewards, s2.rewards);
        }
        assert_eq!(sim1.agent_signals(0, 1), sim2.agent_signals(0, 1));
    }

    #[test]
    fn test_scheduled_termination_fires_once() {
        let actions: ActionBatch = vec![vec![0.0; 4]];
        let mut sim = StubSim::new(1, 8, 7).with_termination(3, 0, 5.0);

        for tick in 1..=5u64 {
            let step = sim.step(&actions);
            if tick == 3 {
                assert_eq!(step.num_terminations(), 1);
                let rewards = step.episode_rewards.unwrap();
                assert_eq!(rewards["total"], 5.0);
            } else {
                assert_eq!(step.num_terminations(), 0);
                assert!(step.episode_rewards.is_none());
            }
        }
    }

    #[test]
    fn test_simultaneous_terminations_report_mean() {
        let actions: ActionBatch = vec![vec![0.0; 4]; 3];
        let mut sim = StubSim::new(3, 8, 7)
            .with_termination(2, 0, 2.0)
            .with_termination(2, 1, 4.0);

        sim.step(&actions);
        let step = sim.step(&actions);
        assert_eq!(step.num_terminations(), 2);
        assert_eq!(step.episode_rewards.unwrap()["total"], 3.0);
    }

    #[test]
    fn test_out_of_range_agent_schedule_is_ignored() {
        let actions: ActionBatch = vec![vec![0.0; 4]];
        let mut sim = StubSim::new(1, 8, 7).with_termination(1, 5, 5.0);
        let step = sim.step(&actions);
        assert_eq!(step.num_terminations(), 0);
    }
}

// src/runner.rs
//
// Evaluation loop: drives the policy against the simulation for a fixed
// number of ticks, with optional live command injection and bounded
// telemetry.
//
// Per-tick ordering:
// 1) policy action from the current observation
// 2) simulation step
// 3) live command overwrite of the observation's command slice
// 4) per-agent running reward totals (end-of-run diagnostic)
// 5) state logging while the window is open
// 6) per-episode reward aggregation on termination flags
// 7) one-shot summary print at the reward log tick
//
// State logging is purely tick-index driven; reward aggregation is
// event-driven and independent of the logging window.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::command::map_command;
use crate::config::PlayConfig;
use crate::input::CommandSource;
use crate::logger::{EpisodeLogger, SummaryEntry};
use crate::logging::TickSink;
use crate::policy::Policy;
use crate::sim::Simulation;
use crate::types::{ObservationBatch, StepRecord};

/// Summary of a completed evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Ticks executed (always `2 * episode_length + 1`).
    pub total_ticks: u64,
    /// Mean of the per-agent running reward totals at the end of the run.
    pub mean_total_reward: f64,
    /// Records retained in the state-log window.
    pub window_len: usize,
    /// Per-component episode reward means.
    pub reward_summary: BTreeMap<String, SummaryEntry>,
}

/// Tick-locked evaluation loop.
///
/// Owns the simulation handle, the policy, the telemetry logger, and (in
/// live-command mode) the device reader handle. Single-threaded: each tick
/// blocks until the step and inference complete.
pub struct EvaluationLoop<'a, G, S>
where
    G: Simulation,
    S: TickSink,
{
    cfg: &'a PlayConfig,
    sim: G,
    policy: Box<dyn Policy>,
    /// Injected device reader; present only in live-command mode.
    command_source: Option<Box<dyn CommandSource>>,
    sink: S,
    logger: EpisodeLogger,
    /// Running step-reward total per agent (diagnostic, not per-episode).
    reward_totals: Vec<f64>,
    verbosity: u8,
}

impl<'a, G, S> EvaluationLoop<'a, G, S>
where
    G: Simulation,
    S: TickSink,
{
    pub fn new(cfg: &'a PlayConfig, sim: G, policy: Box<dyn Policy>, sink: S) -> Self {
        let num_agents = sim.num_agents();
        Self {
            cfg,
            sim,
            policy,
            command_source: None,
            sink,
            logger: EpisodeLogger::new(cfg.window_length as usize),
            reward_totals: vec![0.0; num_agents],
            verbosity: 0,
        }
    }

    /// Attach a device reader, enabling live command injection.
    pub fn with_command_source(mut self, source: Box<dyn CommandSource>) -> Self {
        self.command_source = Some(source);
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Run the full evaluation and return the aggregated summary.
    pub fn run(&mut self) -> RunSummary {
        let total_ticks = self.cfg.total_ticks();

        let mut obs = self.sim.observations();
        self.inject_live_command(&mut obs);

        for tick in 0..total_ticks {
            let actions = self.policy.infer(&obs);
            let step = self.sim.step(&actions);
            obs = step.observations.clone();

            self.inject_live_command(&mut obs);

            for (total, reward) in self.reward_totals.iter_mut().zip(&step.rewards) {
                *total += reward;
            }

            let record = self.build_record(&actions);
            self.sink.log_tick(tick, &record);
            if tick < self.cfg.window_length {
                self.logger.log_step(record);
            }

            let num_episodes = step.num_terminations();
            if num_episodes > 0 {
                if let Some(fragment) = &step.episode_rewards {
                    self.logger.log_episode_rewards(fragment, num_episodes);
                }
            }

            if tick == self.cfg.reward_log_tick {
                self.logger.print_summary();
            }

            if self.verbosity >= 2 {
                println!(
                    "tick {}: rewards={:?} terminations={}",
                    tick, step.rewards, num_episodes
                );
            }
        }

        let mean_total_reward = if self.reward_totals.is_empty() {
            0.0
        } else {
            self.reward_totals.iter().sum::<f64>() / self.reward_totals.len() as f64
        };

        println!(
            "mean total reward over {} ticks: {:.4}",
            self.cfg.episode_length + 1,
            mean_total_reward
        );

        RunSummary {
            total_ticks,
            mean_total_reward,
            window_len: self.logger.state_log().len(),
            reward_summary: self.logger.summary(),
        }
    }

    /// Overwrite the command slice of every agent's observation from the
    /// latest device sample, if a reader is attached.
    fn inject_live_command(&mut self, obs: &mut ObservationBatch) {
        let Some(source) = self.command_source.as_mut() else {
            return;
        };
        let sample = source.read_command();
        let cmd = map_command(sample, &self.cfg.command_ranges);
        if self.verbosity >= 1 {
            println!(
                "velx, vely, w: [{:.3}, {:.3}, {:.3}] centered={}",
                cmd.vel_x, cmd.vel_y, cmd.yaw_rate, cmd.centered
            );
        }
        for agent_obs in obs.iter_mut() {
            cmd.inject(agent_obs);
        }
    }

    /// Assemble the per-tick signal record for the selected agent/joint.
    fn build_record(&self, actions: &[Vec<f64>]) -> StepRecord {
        let robot = self.cfg.robot_index;
        let joint = self.cfg.joint_index;
        let signals = self.sim.agent_signals(robot, joint);

        let mut record = StepRecord::new();
        // Partial records are tolerated downstream: a missing action slot
        // drops the target key instead of failing the tick.
        if let Some(target) = actions.get(robot).and_then(|a| a.get(joint)) {
            record.insert(
                "dof_pos_target".to_string(),
                target * self.cfg.action_scale,
            );
        }
        record.insert("dof_pos".to_string(), signals.dof_pos);
        record.insert("dof_vel".to_string(), signals.dof_vel);
        record.insert("dof_torque".to_string(), signals.dof_torque);
        record.insert("command_x".to_string(), signals.command_x);
        record.insert("command_y".to_string(), signals.command_y);
        record.insert("command_yaw".to_string(), signals.command_yaw);
        record.insert("base_vel_x".to_string(), signals.base_vel_x);
        record.insert("base_vel_y".to_string(), signals.base_vel_y);
        record.insert("base_vel_z".to_string(), signals.base_vel_z);
        record.insert("base_vel_yaw".to_string(), signals.base_vel_yaw);
        record.insert("contact_forces_z".to_string(), signals.contact_force_z);
        record
    }

    /// Telemetry collected so far (for tests and post-run inspection).
    pub fn logger(&self) -> &EpisodeLogger {
        &self.logger
    }

    pub fn reward_totals(&self) -> &[f64] {
        &self.reward_totals
    }

    pub fn policy_version(&self) -> &str {
        self.policy.version()
    }
}

// src/logger.rs
//
// Bounded live telemetry collector.
//
// Two independent concerns live here:
// - StateLog: the first `window_length` StepRecords of a run, append-only.
//   Once full, further appends are silent no-ops, so memory stays bounded
//   regardless of run length and the window always captures the run's
//   opening ticks.
// - Reward accumulation: per-episode reward summaries keyed by component
//   name, aggregated by episode count (not step count) whenever the loop
//   reports terminations.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::StepRecord;

/// Running total and episode count for one reward component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardAccumulator {
    pub total: f64,
    pub episodes: u64,
}

/// Read-only summary entry for one reward component.
///
/// `mean` is None when no episode has contributed yet; callers print the
/// "no data" sentinel instead of dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub mean: Option<f64>,
    pub episodes: u64,
}

/// Stateful collector for per-step signals and per-episode reward stats.
///
/// Single-writer: exactly one loop thread calls into the logger.
#[derive(Debug, Clone)]
pub struct EpisodeLogger {
    window_length: usize,
    state_log: Vec<StepRecord>,
    reward_totals: BTreeMap<String, RewardAccumulator>,
    /// Signal names observed so far, for missing-signal diagnostics.
    seen_signals: BTreeSet<String>,
    /// Signals already reported missing (diagnostic fires once per name).
    missing_reported: BTreeSet<String>,
}

impl EpisodeLogger {
    pub fn new(window_length: usize) -> Self {
        Self {
            window_length,
            state_log: Vec::with_capacity(window_length),
            reward_totals: BTreeMap::new(),
            seen_signals: BTreeSet::new(),
            missing_reported: BTreeSet::new(),
        }
    }

    /// Append one tick's signals to the state log.
    ///
    /// No-op (not an error) once the window is full. A record missing a
    /// previously-seen signal name is still accepted; the gap is surfaced
    /// once per name on stderr and never aborts the run.
    pub fn log_step(&mut self, record: StepRecord) {
        for name in self.seen_signals.iter() {
            if !record.contains_key(name) && self.missing_reported.insert(name.clone()) {
                eprintln!(
                    "locoplay: signal '{}' missing from step record (reported once)",
                    name
                );
            }
        }
        for name in record.keys() {
            if !self.seen_signals.contains(name) {
                self.seen_signals.insert(name.clone());
            }
        }

        if self.state_log.len() < self.window_length {
            self.state_log.push(record);
        }
    }

    /// Accumulate per-episode reward summaries.
    ///
    /// `num_episodes` is the number of agents whose episode ended
    /// simultaneously this tick; each component value is the per-episode
    /// mean over those agents, so the running total gains
    /// `value * num_episodes` and the count gains `num_episodes`.
    pub fn log_episode_rewards(&mut self, fragment: &BTreeMap<String, f64>, num_episodes: u64) {
        for (name, value) in fragment {
            let acc = self.reward_totals.entry(name.clone()).or_default();
            // num_episodes == 0 registers the component without data;
            // summary() reports the sentinel instead of dividing.
            acc.total += value * num_episodes as f64;
            acc.episodes += num_episodes;
        }
    }

    /// Per-component means. Idempotent; never divides by a zero count.
    pub fn summary(&self) -> BTreeMap<String, SummaryEntry> {
        self.reward_totals
            .iter()
            .map(|(name, acc)| {
                let mean = if acc.episodes > 0 {
                    Some(acc.total / acc.episodes as f64)
                } else {
                    None
                };
                (
                    name.clone(),
                    SummaryEntry {
                        mean,
                        episodes: acc.episodes,
                    },
                )
            })
            .collect()
    }

    /// Print the mean of each accumulated reward component.
    ///
    /// Does not mutate state; safe to call repeatedly.
    pub fn print_summary(&self) {
        println!("Average rewards per episode:");
        for (name, entry) in self.summary() {
            match entry.mean {
                Some(mean) => {
                    println!("  {}: {:.4} (episodes: {})", name, mean, entry.episodes)
                }
                None => println!("  {}: no data", name),
            }
        }
    }

    pub fn state_log(&self) -> &[StepRecord] {
        &self.state_log
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }

    pub fn is_window_full(&self) -> bool {
        self.state_log.len() >= self.window_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StepRecord;

    fn record(pairs: &[(&str, f64)]) -> StepRecord {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_window_cap_is_enforced() {
        let mut logger = EpisodeLogger::new(5);
        for i in 0..6 {
            logger.log_step(record(&[("dof_pos", i as f64)]));
        }
        assert_eq!(logger.state_log().len(), 5);
        // first N ticks retained, no overwrite
        assert_eq!(logger.state_log()[0]["dof_pos"], 0.0);
        assert_eq!(logger.state_log()[4]["dof_pos"], 4.0);
        assert!(logger.is_window_full());
    }

    #[test]
    fn test_reward_accumulation_keyed_by_episode_count() {
        let mut logger = EpisodeLogger::new(0);

        let mut frag = BTreeMap::new();
        frag.insert("tracking".to_string(), 2.0);
        logger.log_episode_rewards(&frag, 3);

        frag.insert("tracking".to_string(), 4.0);
        logger.log_episode_rewards(&frag, 1);

        let summary = logger.summary();
        let entry = summary["tracking"];
        assert_eq!(entry.episodes, 4);
        assert!((entry.mean.unwrap() - 2.5).abs() < 1e-12); // (2*3 + 4*1) / 4
    }

    #[test]
    fn test_zero_count_component_yields_sentinel() {
        let mut logger = EpisodeLogger::new(0);
        let mut frag = BTreeMap::new();
        frag.insert("tracking".to_string(), 2.0);
        logger.log_episode_rewards(&frag, 0);

        let summary = logger.summary();
        let entry = summary["tracking"];
        assert_eq!(entry.episodes, 0);
        assert_eq!(entry.mean, None);
        // must not panic on the zero-count component
        logger.print_summary();
    }

    #[test]
    fn test_summary_is_idempotent() {
        let mut logger = EpisodeLogger::new(0);
        let mut frag = BTreeMap::new();
        frag.insert("total".to_string(), 5.0);
        logger.log_episode_rewards(&frag, 1);

        let s1 = logger.summary();
        let s2 = logger.summary();
        assert_eq!(s1, s2);
        // print_summary must not mutate either
        logger.print_summary();
        logger.print_summary();
        assert_eq!(logger.summary(), s1);
    }

    #[test]
    fn test_missing_signal_is_tolerated() {
        let mut logger = EpisodeLogger::new(10);
        logger.log_step(record(&[("dof_pos", 1.0), ("dof_vel", 2.0)]));
        // second record drops dof_vel; accepted as a partial record
        logger.log_step(record(&[("dof_pos", 1.5)]));
        assert_eq!(logger.state_log().len(), 2);
        assert!(!logger.state_log()[1].contains_key("dof_vel"));
    }

    #[test]
    fn test_counts_are_monotone() {
        let mut logger = EpisodeLogger::new(0);
        let mut frag = BTreeMap::new();
        frag.insert("total".to_string(), 1.0);

        let mut prev = 0;
        for n in [1u64, 2, 5] {
            logger.log_episode_rewards(&frag, n);
            let count = logger.summary()["total"].episodes;
            assert!(count >= prev);
            prev = count;
        }
        assert_eq!(prev, 8);
    }
}

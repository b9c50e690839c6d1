//! locoplay core library.
//!
//! Evaluation harness for a pre-trained locomotion control policy. The
//! binary (`src/main.rs`) is a thin CLI around these components:
//!
//! - **Command mapping** (`command`): pure transform from raw joystick
//!   samples into the policy's command frame, with asymmetric per-axis
//!   scaling and a dead-zone flag.
//!
//! - **Episode logging** (`logger`): bounded window of per-step signals
//!   plus running per-episode reward statistics keyed by component name.
//!
//! - **Evaluation loop** (`runner`): tick-locked orchestrator wiring the
//!   policy, the simulation backend, live command injection, and the
//!   logger.
//!
//! The physics backend, the policy network, and the physical input device
//! are external collaborators behind the `Simulation`, `Policy`, and
//! `CommandSource` traits; the crate ships a deterministic `StubSim` and
//! simple stand-ins for tests and demos.

pub mod command;
pub mod config;
pub mod input;
pub mod logger;
pub mod logging;
pub mod policy;
pub mod runner;
pub mod sim;
pub mod types;

// --- Re-exports for ergonomic external use ---------------------------------

pub use command::{map_command, AxisRange, CommandRanges, CENTERED_NORM_THRESHOLD};
pub use config::{ConfigError, PlayConfig};
pub use input::{
    CommandSource, FixedCommandSource, ScriptedCommandSource, SharedCommandHandle,
    SharedCommandSource,
};
pub use logger::{EpisodeLogger, RewardAccumulator, SummaryEntry};
pub use logging::{FileSink, NoopSink, TickSink};
pub use policy::{Policy, ProportionalPolicy, ZeroPolicy};
pub use runner::{EvaluationLoop, RunSummary};
pub use sim::{AgentSignals, SimStep, Simulation, StubSim};
pub use types::{ActionBatch, CommandVector, ObservationBatch, RawSample, StepRecord};

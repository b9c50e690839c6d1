// src/main.rs
//
// CLI entrypoint for the locoplay evaluation harness.
//
// Drives the deterministic stub backend with a stand-in policy; the real
// simulation and checkpointed policy plug in behind the same traits.
// Configuration is resolved once, validated, and never mutated after.

use anyhow::Context;
use clap::{ArgAction, Parser};

use locoplay::{
    EvaluationLoop, FileSink, FixedCommandSource, NoopSink, PlayConfig, ProportionalPolicy,
    RawSample, StubSim, TickSink,
};

#[derive(Debug, Parser)]
#[command(
    name = "locoplay",
    about = "Locomotion policy evaluation harness (stub backend)",
    version
)]
struct Args {
    /// Nominal episode length in ticks; the run executes 2*N+1 ticks.
    #[arg(long, default_value_t = 1000)]
    episode_length: u64,

    /// Number of leading ticks with full per-step telemetry.
    #[arg(long, default_value_t = 200)]
    window_length: u64,

    /// Tick of the one-shot episode-reward summary (default: episode length).
    #[arg(long)]
    reward_log_tick: Option<u64>,

    /// Agent index used for state logging.
    #[arg(long, default_value_t = 0)]
    robot_index: usize,

    /// Joint index used for state logging.
    #[arg(long, default_value_t = 1)]
    joint_index: usize,

    /// Number of simulated agents.
    #[arg(long, default_value_t = 4)]
    num_agents: usize,

    /// Deterministic seed for the stub backend.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Enable live command injection (fixed sample from --cmd-* flags).
    #[arg(long)]
    gamepad: bool,

    /// Forward stick deflection for --gamepad mode, in [-1, 1].
    #[arg(long, default_value_t = 0.0)]
    cmd_x: f64,

    /// Lateral stick deflection for --gamepad mode, in [-1, 1].
    #[arg(long, default_value_t = 0.0)]
    cmd_y: f64,

    /// Yaw stick deflection for --gamepad mode, in [-1, 1].
    #[arg(long, default_value_t = 0.0)]
    cmd_yaw: f64,

    /// Write one JSON line per tick to this path.
    #[arg(long)]
    jsonl: Option<String>,

    /// Verbosity: -v, -vv
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn fnv1a64(s: &str) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;
    let mut h = FNV_OFFSET;
    for b in s.as_bytes() {
        h ^= *b as u64;
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

fn run<S: TickSink>(args: &Args, cfg: &PlayConfig, sink: S) -> anyhow::Result<()> {
    const OBS_DIM: usize = 48;
    const ACTION_DIM: usize = 12;

    let sim = StubSim::new(args.num_agents, OBS_DIM, args.seed).with_reward_noise(0.01);
    let policy = Box::new(ProportionalPolicy::new(ACTION_DIM, 0.5));

    let mut runner =
        EvaluationLoop::new(cfg, sim, policy, sink).with_verbosity(args.verbose);
    if cfg.live_commands {
        let sample = RawSample::new(args.cmd_x, args.cmd_y, args.cmd_yaw);
        runner = runner.with_command_source(Box::new(FixedCommandSource::new(sample)));
    }

    let summary = runner.run();
    println!(
        "run complete | ticks={} | window={} | mean_total_reward={:.4}",
        summary.total_ticks, summary.window_len, summary.mean_total_reward
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut cfg = PlayConfig::default()
        .with_episode_length(args.episode_length)
        .with_window_length(args.window_length)
        .with_robot_index(args.robot_index)
        .with_joint_index(args.joint_index)
        .with_live_commands(args.gamepad);
    if let Some(tick) = args.reward_log_tick {
        cfg = cfg.with_reward_log_tick(tick);
    }

    // Fail fast: configuration errors abort before the loop starts.
    cfg.validate().context("invalid configuration")?;

    let cfg_hash = fnv1a64(&format!("{cfg:?}"));
    println!(
        "locoplay | cfg={} | cfg_hash=0x{:016x} | ticks={} | window={} | seed={} | gamepad={}",
        cfg.version,
        cfg_hash,
        cfg.total_ticks(),
        cfg.window_length,
        args.seed,
        args.gamepad,
    );

    match &args.jsonl {
        Some(path) => {
            let sink = FileSink::create(path)
                .with_context(|| format!("failed to create JSONL sink at '{}'", path))?;
            run(&args, &cfg, sink)
        }
        None => run(&args, &cfg, NoopSink),
    }
}

// tests/tick_sink_tests.rs
//
// JSONL sink contract: one parseable JSON object per tick, independent of
// the in-memory window state.

use std::fs;
use std::io::{BufRead, BufReader};

use locoplay::{EvaluationLoop, FileSink, PlayConfig, StepRecord, StubSim, TickSink, ZeroPolicy};

#[test]
fn file_sink_writes_one_json_line_per_tick() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ticks.jsonl");

    let mut sink = FileSink::create(&path).unwrap();
    for tick in 0..5u64 {
        let mut record = StepRecord::new();
        record.insert("dof_pos".to_string(), tick as f64);
        record.insert("dof_vel".to_string(), tick as f64 * 2.0);
        sink.log_tick(tick, &record);
    }
    drop(sink);

    let reader = BufReader::new(fs::File::open(&path).unwrap());
    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    assert_eq!(lines.len(), 5);

    for (i, line) in lines.iter().enumerate() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["tick"], i as u64);
        assert_eq!(value["signals"]["dof_pos"], i as f64);
    }
}

#[test]
fn loop_forwards_every_tick_to_the_sink() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.jsonl");

    let cfg = PlayConfig::default()
        .with_episode_length(10)
        .with_window_length(4);
    let sim = StubSim::new(1, 48, 5);
    let sink = FileSink::create(&path).unwrap();
    let mut runner = EvaluationLoop::new(&cfg, sim, Box::new(ZeroPolicy::new(12)), sink);
    let summary = runner.run();

    // The sink sees all ticks even though the window keeps only 4.
    assert_eq!(summary.window_len, 4);
    let reader = BufReader::new(fs::File::open(&path).unwrap());
    let count = reader.lines().count();
    assert_eq!(count as u64, summary.total_ticks);
}

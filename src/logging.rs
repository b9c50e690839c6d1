// src/logging.rs
//
// Tick sinks for locoplay.
// - TickSink: trait used by the evaluation loop
// - NoopSink: discards all ticks
// - FileSink: writes one JSON line per tick for offline analysis

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::types::StepRecord;

/// Abstract sink for per-tick telemetry.
///
/// Persistence of the state log is an external concern; the loop forwards
/// every tick's record here regardless of the in-memory window state.
pub trait TickSink {
    fn log_tick(&mut self, tick: u64, record: &StepRecord);
}

/// Sink that discards all ticks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl TickSink for NoopSink {
    fn log_tick(&mut self, _tick: u64, _record: &StepRecord) {
        // intentionally no-op
    }
}

#[derive(Serialize)]
struct TickLine<'a> {
    tick: u64,
    signals: &'a StepRecord,
}

/// JSONL file sink: one JSON object per tick on its own line.
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create a new sink writing to `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl TickSink for FileSink {
    fn log_tick(&mut self, tick: u64, record: &StepRecord) {
        let line = TickLine {
            tick,
            signals: record,
        };
        // Telemetry must never abort an in-progress run, so encoding or
        // I/O failures are swallowed here.
        let Ok(json) = serde_json::to_string(&line) else {
            return;
        };
        let _ = writeln!(self.writer, "{}", json);
        let _ = self.writer.flush();
    }
}

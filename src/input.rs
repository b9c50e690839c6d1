// src/input.rs
//
// Input device seam.
//
// The physical device reader is an external collaborator. The loop holds
// an explicit CommandSource handle (no global mutable reader state) and
// threads each sample into the pure command mapper.

use std::sync::{Arc, Mutex};

use crate::types::RawSample;

/// Non-blocking reader returning the most recent device sample.
///
/// When no fresh sample exists, implementations return the previous one,
/// so the mapped command persists across ticks.
pub trait CommandSource {
    fn read_command(&mut self) -> RawSample;
}

/// Source that always returns the same sample.
#[derive(Debug, Clone, Copy)]
pub struct FixedCommandSource {
    sample: RawSample,
}

impl FixedCommandSource {
    pub fn new(sample: RawSample) -> Self {
        Self { sample }
    }
}

impl CommandSource for FixedCommandSource {
    fn read_command(&mut self) -> RawSample {
        self.sample
    }
}

/// Source that replays a fixed sequence, then holds the last sample.
///
/// The hold models "no fresh sample available" ticks.
#[derive(Debug, Clone)]
pub struct ScriptedCommandSource {
    samples: Vec<RawSample>,
    next: usize,
}

impl ScriptedCommandSource {
    pub fn new(samples: Vec<RawSample>) -> Self {
        Self { samples, next: 0 }
    }
}

impl CommandSource for ScriptedCommandSource {
    fn read_command(&mut self) -> RawSample {
        if self.samples.is_empty() {
            return RawSample::ZERO;
        }
        let idx = self.next.min(self.samples.len() - 1);
        if self.next < self.samples.len() {
            self.next += 1;
        }
        self.samples[idx]
    }
}

/// Latest-sample bridge between a device reader thread and the loop.
///
/// The reader thread overwrites the shared slot via `SharedCommandHandle`;
/// the loop's `read_command` is a non-blocking copy of whatever is there.
#[derive(Debug, Clone)]
pub struct SharedCommandSource {
    latest: Arc<Mutex<RawSample>>,
}

/// Writer half of a `SharedCommandSource`.
#[derive(Debug, Clone)]
pub struct SharedCommandHandle {
    latest: Arc<Mutex<RawSample>>,
}

impl SharedCommandSource {
    pub fn new() -> (Self, SharedCommandHandle) {
        let latest = Arc::new(Mutex::new(RawSample::ZERO));
        (
            Self {
                latest: Arc::clone(&latest),
            },
            SharedCommandHandle { latest },
        )
    }
}

impl SharedCommandHandle {
    /// Publish a fresh device sample, replacing the previous one.
    pub fn publish(&self, sample: RawSample) {
        if let Ok(mut slot) = self.latest.lock() {
            *slot = sample;
        }
    }
}

impl CommandSource for SharedCommandSource {
    fn read_command(&mut self) -> RawSample {
        self.latest.lock().map(|s| *s).unwrap_or(RawSample::ZERO)
    }
}

//! Mock counter source for unit testing.
//!
//! CPU readings are a queue: each `cpu_totals` call pops the next queued
//! value and, once the queue is drained, keeps repeating the last one.  That
//! lets a test script an exact counter progression and then let a long-lived
//! consumer keep sampling.  Failure injection is a flag flipped by
//! `fail_cpu` and cleared by `recover`.
//!
//! All methods take `&self` to satisfy the source trait, so state lives
//! behind a `Mutex`.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::application::sampler::{CounterSource, CpuTotals, MemoryCounters, SampleError};

struct State {
    queued: VecDeque<CpuTotals>,
    last: Option<CpuTotals>,
    memory: MemoryCounters,
    fail_cpu: bool,
}

/// A counter source with scripted readings.
pub struct MockCounterSource {
    state: Mutex<State>,
}

impl MockCounterSource {
    /// Starts with no CPU readings and 4 GiB total / 2 GiB available memory.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                queued: VecDeque::new(),
                last: None,
                memory: MemoryCounters {
                    total_kb: 4 * 1024 * 1024,
                    available_kb: 2 * 1024 * 1024,
                },
                fail_cpu: false,
            }),
        }
    }

    /// Appends one CPU reading to the script.
    pub fn push_cpu(&self, totals: CpuTotals) {
        self.state.lock().unwrap().queued.push_back(totals);
    }

    /// Replaces the memory counters returned by every `memory` call.
    pub fn set_memory(&self, memory: MemoryCounters) {
        self.state.lock().unwrap().memory = memory;
    }

    /// Makes subsequent CPU reads fail until `recover` is called.
    pub fn fail_cpu(&self) {
        self.state.lock().unwrap().fail_cpu = true;
    }

    /// Clears the failure flag.
    pub fn recover(&self) {
        self.state.lock().unwrap().fail_cpu = false;
    }
}

impl Default for MockCounterSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for MockCounterSource {
    fn cpu_totals(&self) -> Result<CpuTotals, SampleError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_cpu {
            return Err(SampleError("mock cpu failure".to_string()));
        }
        if let Some(next) = state.queued.pop_front() {
            state.last = Some(next);
        }
        state
            .last
            .ok_or_else(|| SampleError("no cpu readings scripted".to_string()))
    }

    fn memory(&self) -> Result<MemoryCounters, SampleError> {
        Ok(self.state.lock().unwrap().memory)
    }
}

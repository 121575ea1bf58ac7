//! Resource sampler: point-in-time CPU/RAM utilization from cumulative
//! counters.
//!
//! CPU usage is a delta between two reads of the kernel's cumulative time
//! counters, so the sampler carries `{previous idle, previous total}` between
//! calls.  That carry-state is read-modify-write without its own lock: the
//! sampler has a single logical owner (the hub's resource producer serializes
//! calls behind a mutex) and must not be shared beyond that.
//!
//! The first call after construction has no previous counters and reports 0%
//! while seeding the carry-state.  A counter-source failure yields a zeroed
//! sample with the error flag set — telemetry absence is itself informative,
//! so the tick is still published.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use rdesk_core::protocol::messages::StreamMessage;

// ── Counter source boundary ───────────────────────────────────────────────────

/// Cumulative CPU time counters since boot, in clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTotals {
    /// Idle plus I/O-wait time.
    pub idle: u64,
    /// All categories: user, nice, system, idle, iowait, irq, softirq, steal.
    pub total: u64,
}

/// Memory counters in kilobytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryCounters {
    pub total_kb: u64,
    /// Free plus reclaimable cache/buffer pages.
    pub available_kb: u64,
}

#[derive(Debug, Error)]
#[error("resource counters unavailable: {0}")]
pub struct SampleError(pub String);

/// Provider of the kernel's cumulative counters.
/// Implementations live in `infrastructure::telemetry`.
pub trait CounterSource: Send + Sync {
    fn cpu_totals(&self) -> Result<CpuTotals, SampleError>;
    fn memory(&self) -> Result<MemoryCounters, SampleError>;
}

// ── Sample ────────────────────────────────────────────────────────────────────

/// One point-in-time utilization reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSample {
    /// CPU utilization in [0, 100].
    pub cpu_usage_percent: u8,
    /// RAM utilization in [0, 100].
    pub ram_usage_percent: u8,
    pub total_ram_mb: u64,
    pub used_ram_mb: u64,
    pub free_ram_mb: u64,
    /// Set when the counter source failed and the numbers are zeroed.
    pub error: Option<String>,
}

impl ResourceSample {
    fn zeroed(reason: String) -> Self {
        Self {
            cpu_usage_percent: 0,
            ram_usage_percent: 0,
            total_ram_mb: 0,
            used_ram_mb: 0,
            free_ram_mb: 0,
            error: Some(reason),
        }
    }

    /// Converts the sample to its wire frame.
    pub fn to_stream_message(&self) -> StreamMessage {
        StreamMessage::Resources {
            cpu_usage: self.cpu_usage_percent,
            ram_usage: self.ram_usage_percent,
            ram_total: self.total_ram_mb,
            ram_free: self.free_ram_mb,
            error: self.error.clone(),
        }
    }
}

// ── Sampler ───────────────────────────────────────────────────────────────────

/// Computes utilization samples, carrying previous CPU counters between
/// calls.
pub struct ResourceSampler {
    source: Arc<dyn CounterSource>,
    prev: Option<CpuTotals>,
}

impl ResourceSampler {
    pub fn new(source: Arc<dyn CounterSource>) -> Self {
        Self { source, prev: None }
    }

    /// Takes one sample.  Never fails: source errors degrade to a zeroed
    /// sample with the error flag set.
    pub fn sample(&mut self) -> ResourceSample {
        let cpu = match self.source.cpu_totals() {
            Ok(cpu) => cpu,
            Err(e) => {
                warn!("cpu counter read failed: {e}");
                // Drop the carry-state: the next good read must re-seed
                // rather than compute a delta across the gap.
                self.prev = None;
                return ResourceSample::zeroed(e.to_string());
            }
        };
        let cpu_usage_percent = self.cpu_percent(cpu);

        let mem = match self.source.memory() {
            Ok(mem) => mem,
            Err(e) => {
                warn!("memory counter read failed: {e}");
                return ResourceSample::zeroed(e.to_string());
            }
        };

        let total_mb = mem.total_kb / 1024;
        let free_mb = mem.available_kb / 1024;
        let used_mb = total_mb.saturating_sub(free_mb);
        let ram_usage_percent = if mem.total_kb == 0 {
            0
        } else {
            let used_kb = mem.total_kb.saturating_sub(mem.available_kb);
            (used_kb * 100 / mem.total_kb).min(100) as u8
        };

        ResourceSample {
            cpu_usage_percent,
            ram_usage_percent,
            total_ram_mb: total_mb,
            used_ram_mb: used_mb,
            free_ram_mb: free_mb,
            error: None,
        }
    }

    /// Delta-based CPU usage; 0% on the first call while the carry-state is
    /// seeded, and 0% when the counters have not advanced.
    fn cpu_percent(&mut self, cpu: CpuTotals) -> u8 {
        let prev = self.prev.replace(cpu);
        let Some(prev) = prev else {
            return 0;
        };
        let total_delta = cpu.total.saturating_sub(prev.total);
        if total_delta == 0 {
            return 0;
        }
        let idle_delta = cpu.idle.saturating_sub(prev.idle);
        let active_delta = total_delta.saturating_sub(idle_delta);
        (active_delta * 100 / total_delta).min(100) as u8
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

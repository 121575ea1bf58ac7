//! Linux procfs counter source.
//!
//! Reads the kernel's cumulative counters from `/proc/stat` and
//! `/proc/meminfo` on every call.  The aggregate `cpu ` line carries eight
//! cumulative tick counters:
//!
//! ```text
//! cpu  user nice system idle iowait irq softirq steal
//! ```
//!
//! Idle time is `idle + iowait` (a core waiting on I/O is not doing work),
//! and the total is the sum of all eight fields.  Memory uses `MemTotal` and
//! `MemAvailable`; `MemAvailable` is the kernel's own estimate of
//! reclaimable memory and is more honest than `MemFree`, which excludes
//! cache the kernel would drop on demand.

use std::path::{Path, PathBuf};

use crate::application::sampler::{CounterSource, CpuTotals, MemoryCounters, SampleError};

/// Counter source backed by the proc filesystem.
pub struct ProcCounterSource {
    stat_path: PathBuf,
    meminfo_path: PathBuf,
}

impl ProcCounterSource {
    pub fn new() -> Self {
        Self {
            stat_path: PathBuf::from("/proc/stat"),
            meminfo_path: PathBuf::from("/proc/meminfo"),
        }
    }

    /// Reads from alternate paths.  Used by tests with fixture files.
    pub fn with_paths(stat_path: impl Into<PathBuf>, meminfo_path: impl Into<PathBuf>) -> Self {
        Self {
            stat_path: stat_path.into(),
            meminfo_path: meminfo_path.into(),
        }
    }
}

impl Default for ProcCounterSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for ProcCounterSource {
    fn cpu_totals(&self) -> Result<CpuTotals, SampleError> {
        let content = read(&self.stat_path)?;
        parse_cpu_line(&content)
    }

    fn memory(&self) -> Result<MemoryCounters, SampleError> {
        let content = read(&self.meminfo_path)?;
        parse_meminfo(&content)
    }
}

fn read(path: &Path) -> Result<String, SampleError> {
    std::fs::read_to_string(path)
        .map_err(|e| SampleError(format!("reading {}: {e}", path.display())))
}

/// Parses the aggregate `cpu ` line (the first line of `/proc/stat`).
fn parse_cpu_line(content: &str) -> Result<CpuTotals, SampleError> {
    let line = content
        .lines()
        .find(|l| l.starts_with("cpu "))
        .ok_or_else(|| SampleError("no aggregate cpu line".to_string()))?;

    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(8)
        .map(|f| f.parse::<u64>())
        .collect::<Result<_, _>>()
        .map_err(|e| SampleError(format!("malformed cpu line: {e}")))?;
    if fields.len() < 8 {
        return Err(SampleError(format!(
            "cpu line has {} fields, expected 8",
            fields.len()
        )));
    }

    let idle = fields[3] + fields[4];
    let total = fields.iter().sum();
    Ok(CpuTotals { idle, total })
}

/// Pulls `MemTotal` and `MemAvailable` (both reported in kB) out of a
/// meminfo dump.
fn parse_meminfo(content: &str) -> Result<MemoryCounters, SampleError> {
    let mut total_kb = None;
    let mut available_kb = None;
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            total_kb = parse_kb(rest);
        } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
            available_kb = parse_kb(rest);
        }
        if total_kb.is_some() && available_kb.is_some() {
            break;
        }
    }
    match (total_kb, available_kb) {
        (Some(total_kb), Some(available_kb)) => Ok(MemoryCounters { total_kb, available_kb }),
        _ => Err(SampleError("meminfo missing MemTotal or MemAvailable".to_string())),
    }
}

fn parse_kb(rest: &str) -> Option<u64> {
    rest.split_whitespace().next()?.parse().ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

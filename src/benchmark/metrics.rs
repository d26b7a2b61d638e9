//! Result and comparison types for benchmark runs.

use std::time::Duration;

/// Result of a benchmark run.
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub label: String,
    pub steps: usize,
    pub duration: Duration,
    pub total_cells: usize,
    pub live_cells: usize,
    pub cells_per_second: f64,
}

impl BenchmarkResult {
    pub fn time_per_step(&self) -> Duration {
        self.duration / self.steps as u32
    }

    pub fn mcells_per_second(&self) -> f64 {
        self.cells_per_second / 1_000_000.0
    }

    pub fn speedup_vs(&self, baseline: &BenchmarkResult) -> f64 {
        baseline.duration.as_secs_f64() / self.duration.as_secs_f64()
    }
}

/// Memory footprint metrics, separate from timing.
#[derive(Debug, Clone)]
pub struct PerformanceMetrics {
    pub memory_usage_bytes: usize,
    pub memory_per_cell_bytes: f64,
}

impl PerformanceMetrics {
    pub fn from_memory(total_memory: usize, total_cells: usize) -> Self {
        Self {
            memory_usage_bytes: total_memory,
            memory_per_cell_bytes: total_memory as f64 / total_cells as f64,
        }
    }
}

/// A before/after comparison between two runs of the same workload.
#[derive(Debug)]
pub struct BenchmarkComparison {
    pub baseline: BenchmarkResult,
    pub candidate: BenchmarkResult,
    pub speedup: f64,
}

impl BenchmarkComparison {
    pub fn new(baseline: BenchmarkResult, candidate: BenchmarkResult) -> Self {
        let speedup = candidate.speedup_vs(&baseline);
        Self { baseline, candidate, speedup }
    }
}

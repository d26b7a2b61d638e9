//! Throughput benchmarking for `SimulationEngine` implementations.

pub mod metrics;
pub mod suite;

pub use metrics::{BenchmarkComparison, BenchmarkResult, PerformanceMetrics};
pub use suite::BenchmarkSuite;

use crate::engine::SimulationEngine;
use std::time::Instant;

/// Runs `steps` ticks on `engine` and reports simple throughput.
pub fn benchmark_engine(engine: &mut dyn SimulationEngine, label: &str, steps: usize) -> BenchmarkResult {
    let total_cells = engine.rows() * engine.cols();

    let start = Instant::now();
    engine.run_steps(steps);
    let duration = start.elapsed();

    BenchmarkResult {
        label: label.to_string(),
        steps,
        duration,
        total_cells,
        live_cells: engine.count_alive(),
        cells_per_second: (total_cells as f64 * steps as f64) / duration.as_secs_f64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LifeEngine;

    #[test]
    fn benchmark_engine_reports_steps_and_live_cells() {
        let mut engine = LifeEngine::new(5, 5);
        engine.init(&[(1, 1), (1, 2), (2, 1), (2, 2)]);
        let result = benchmark_engine(&mut engine, "block", 3);
        assert_eq!(result.steps, 3);
        assert_eq!(result.live_cells, 4);
    }
}

//! A sweep of grid sizes, step counts, and seed patterns for measuring
//! `SimulationEngine::tick` throughput.

use super::metrics::{BenchmarkComparison, BenchmarkResult};
use crate::engine::SimulationEngine;
use crate::grid::PackedGrid;
use std::time::Instant;

pub struct BenchmarkSuite {
    test_patterns: Vec<TestPattern>,
    grid_sizes: Vec<(usize, usize)>,
    step_counts: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct TestPattern {
    pub name: String,
    pub pattern: Vec<String>,
}

impl BenchmarkSuite {
    pub fn new() -> Self {
        Self {
            test_patterns: Self::default_patterns(),
            grid_sizes: vec![(50, 50), (100, 100), (200, 200), (500, 500)],
            step_counts: vec![10, 50, 100, 500],
        }
    }

    /// A small suite for quick, CI-friendly runs.
    pub fn minimal() -> Self {
        Self {
            test_patterns: vec![Self::blinker_pattern()],
            grid_sizes: vec![(10, 10), (50, 50)],
            step_counts: vec![10, 100],
        }
    }

    pub fn benchmark_engine(&self, engine: &mut dyn SimulationEngine) -> Vec<BenchmarkResult> {
        let mut results = Vec::new();

        for &(rows, cols) in &self.grid_sizes {
            for &steps in &self.step_counts {
                for pattern in &self.test_patterns {
                    let grid = self.seed_grid(pattern, rows, cols);
                    engine.set_grid(&grid);

                    let start = Instant::now();
                    engine.run_steps(steps);
                    let duration = start.elapsed();

                    let total_cells = engine.rows() * engine.cols();
                    results.push(BenchmarkResult {
                        label: format!("{}-{rows}x{cols}-{steps}", pattern.name),
                        steps,
                        duration,
                        total_cells,
                        live_cells: engine.count_alive(),
                        cells_per_second: (total_cells as f64 * steps as f64) / duration.as_secs_f64(),
                    });
                }
            }
        }

        results
    }

    pub fn compare_engines(
        &self,
        baseline: &mut dyn SimulationEngine,
        candidate: &mut dyn SimulationEngine,
    ) -> Vec<BenchmarkComparison> {
        self.benchmark_engine(baseline)
            .into_iter()
            .zip(self.benchmark_engine(candidate))
            .map(|(base, cand)| BenchmarkComparison::new(base, cand))
            .collect()
    }

    /// Centers `pattern` inside a fresh `rows x cols` grid.
    fn seed_grid(&self, pattern: &TestPattern, rows: usize, cols: usize) -> PackedGrid {
        let mut grid = PackedGrid::new(rows, cols);

        let pattern_rows = pattern.pattern.len();
        if pattern_rows == 0 {
            return grid;
        }
        let pattern_cols = pattern.pattern[0].len();
        if pattern_cols == 0 {
            return grid;
        }

        let start_row = rows.saturating_sub(pattern_rows) / 2;
        let start_col = cols.saturating_sub(pattern_cols) / 2;

        for (dr, line) in pattern.pattern.iter().enumerate() {
            for (dc, ch) in line.chars().enumerate() {
                let r = start_row + dr;
                let c = start_col + dc;
                if r < rows && c < cols && ch == '#' {
                    grid.set(r as isize, c as isize, true);
                }
            }
        }

        grid
    }

    fn default_patterns() -> Vec<TestPattern> {
        vec![
            Self::blinker_pattern(),
            Self::block_pattern(),
            Self::glider_pattern(),
            Self::dense_pattern(),
        ]
    }

    fn blinker_pattern() -> TestPattern {
        TestPattern {
            name: "blinker".to_string(),
            pattern: vec!["...".to_string(), "###".to_string(), "...".to_string()],
        }
    }

    fn block_pattern() -> TestPattern {
        TestPattern {
            name: "block".to_string(),
            pattern: vec![
                "....".to_string(),
                ".##.".to_string(),
                ".##.".to_string(),
                "....".to_string(),
            ],
        }
    }

    fn glider_pattern() -> TestPattern {
        TestPattern {
            name: "glider".to_string(),
            pattern: vec![
                ".....".to_string(),
                "..#..".to_string(),
                "...#.".to_string(),
                ".###.".to_string(),
                ".....".to_string(),
            ],
        }
    }

    /// A dense, fixed checkerboard-ish pattern for stress testing; not
    /// actually randomized, just irregular enough to avoid degenerate
    /// all-dead or all-alive runs.
    fn dense_pattern() -> TestPattern {
        TestPattern {
            name: "dense".to_string(),
            pattern: vec![
                "##.#.##.#".to_string(),
                ".#..#..#.".to_string(),
                "#.#.#.#.#".to_string(),
                "..#...#..".to_string(),
                "#.#.#.#.#".to_string(),
                ".#..#..#.".to_string(),
                "##.#.##.#".to_string(),
            ],
        }
    }
}

impl Default for BenchmarkSuite {
    fn default() -> Self {
        Self::new()
    }
}

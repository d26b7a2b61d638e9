//! `LifeEngine`: owns `(state, scratch)` and applies Conway's B3/S23 rule.
//!
//! Because `PackedGrid::get` already wraps toroidally, a `LifeEngine` is
//! correct at any shape, including the `(local_rows+2, local_cols+2)`
//! haloed shape the distributed driver uses, where only the interior is
//! meaningful after a tick, and the unhaloed shape a standalone reference
//! run uses.

use super::SimulationEngine;
use crate::error::Result;
use crate::grid::PackedGrid;
use crate::image;
use rayon::prelude::*;
use std::fmt;
use std::path::Path;

pub struct LifeEngine {
    state: PackedGrid,
    scratch: PackedGrid,
}

impl LifeEngine {
    /// Allocates an all-dead engine of the given shape.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            state: PackedGrid::new(rows, cols),
            scratch: PackedGrid::new(rows, cols),
        }
    }

    /// Wraps an existing grid as the engine's initial state.
    pub fn from_grid(grid: PackedGrid) -> Self {
        let (rows, cols) = (grid.rows(), grid.cols());
        Self {
            state: grid,
            scratch: PackedGrid::new(rows, cols),
        }
    }

    /// Sets every `(row, col)` in `seeds` alive.
    pub fn init(&mut self, seeds: &[(usize, usize)]) {
        for &(r, c) in seeds {
            self.state.set(r as isize, c as isize, true);
        }
    }

    pub fn get(&self, row: isize, col: isize) -> bool {
        self.state.get(row, col)
    }

    pub fn rows(&self) -> usize {
        self.state.rows()
    }

    pub fn cols(&self) -> usize {
        self.state.cols()
    }

    fn becomes_alive(&self, row: isize, col: isize) -> bool {
        let neighbors = self.state.neighbor_count(row, col);
        neighbors == 3 || (neighbors == 2 && self.state.get(row, col))
    }

    /// Advances every cell of `state` by one Life step, in parallel across
    /// linear cell indices, then swaps `state` and `scratch`.
    pub fn tick(&mut self) {
        let rows = self.state.rows();
        let cols = self.state.cols();

        let next_cells: Vec<bool> = (0..rows * cols)
            .into_par_iter()
            .map(|idx| {
                let row = (idx / cols) as isize;
                let col = (idx % cols) as isize;
                self.becomes_alive(row, col)
            })
            .collect();

        for (idx, alive) in next_cells.into_iter().enumerate() {
            let row = (idx / cols) as isize;
            let col = (idx % cols) as isize;
            self.scratch.set(row, col, alive);
        }

        std::mem::swap(&mut self.state, &mut self.scratch);
    }

    /// Extracts the rectangle `[r0, r1) x [c0, c1)` as a fresh engine,
    /// wrapping `PackedGrid::subgrid`.
    pub fn subgame(&self, r0: isize, c0: isize, r1: isize, c1: isize) -> LifeEngine {
        LifeEngine::from_grid(self.state.subgrid(r0, c0, r1, c1))
    }

    /// Writes `grid`'s contents into `state`, origin at `(r0, c0)`.
    pub fn set_subgame(&mut self, r0: isize, c0: isize, grid: &PackedGrid) {
        self.state.set_subgrid(r0, c0, grid);
    }

    pub fn get_row(&self, row: isize) -> Vec<u8> {
        self.state.get_row(row)
    }

    pub fn get_col(&self, col: isize) -> Vec<u8> {
        self.state.get_col(col)
    }

    pub fn set_row(&mut self, row: isize, bytes: &[u8]) {
        self.state.set_row(row, bytes);
    }

    pub fn set_col(&mut self, col: isize, bytes: &[u8]) {
        self.state.set_col(col, bytes);
    }

    /// Writes the engine's state to a P5 image. A single-process
    /// convenience path, sharing the codec with the parallel I/O layer.
    pub fn to_image<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        image::write_single(path, &self.state)
    }

    /// Reads a P5 image into a freshly allocated engine.
    pub fn from_image<P: AsRef<Path>>(path: P) -> Result<LifeEngine> {
        Ok(LifeEngine::from_grid(image::read_single(path)?))
    }
}

impl SimulationEngine for LifeEngine {
    fn step(&mut self) {
        self.tick();
    }

    fn grid(&self) -> &PackedGrid {
        &self.state
    }

    fn set_grid(&mut self, grid: &PackedGrid) {
        self.state = grid.clone();
        self.scratch = PackedGrid::new(grid.rows(), grid.cols());
    }
}

impl fmt::Display for LifeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows() as isize {
            for c in 0..self.cols() as isize {
                write!(f, "{}", if self.get(r, c) { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_from_pattern(pattern: &[&str]) -> LifeEngine {
        let rows = pattern.len();
        let cols = pattern[0].len();
        let mut engine = LifeEngine::new(rows, cols);
        for (r, line) in pattern.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                if ch == '#' {
                    engine.init(&[(r, c)]);
                }
            }
        }
        engine
    }

    #[test]
    fn still_life_block_remains_stable() {
        let mut engine = LifeEngine::new(5, 5);
        engine.init(&[(1, 1), (1, 2), (2, 1), (2, 2)]);
        for _ in 0..5 {
            engine.tick();
            for r in 0..5isize {
                for c in 0..5isize {
                    let expected = matches!((r, c), (1, 1) | (1, 2) | (2, 1) | (2, 2));
                    assert_eq!(engine.get(r, c), expected, "r={r} c={c}");
                }
            }
        }
    }

    #[test]
    fn blinker_oscillates_with_period_2() {
        let mut engine = LifeEngine::new(5, 5);
        engine.init(&[(1, 0), (1, 1), (1, 2)]);

        engine.tick();
        for &(r, c) in &[(0, 1), (1, 1), (2, 1)] {
            assert!(engine.get(r, c));
        }
        assert!(!engine.get(1, 0));
        assert!(!engine.get(1, 2));

        engine.tick();
        for &(r, c) in &[(1, 0), (1, 1), (1, 2)] {
            assert!(engine.get(r, c));
        }
        assert!(!engine.get(0, 1));
        assert!(!engine.get(2, 1));
    }

    #[test]
    fn under_and_overpopulated_cells_die() {
        let mut engine = LifeEngine::new(5, 5);
        engine.init(&[(1, 1), (1, 2), (2, 1), (2, 2), (3, 1), (4, 1)]);
        engine.tick();
        assert!(engine.get(1, 1));
        assert!(engine.get(1, 2));
        assert!(!engine.get(2, 2));
        assert!(!engine.get(4, 1));
    }

    #[test]
    fn neighbor_counts_wrap_across_the_grid_edge() {
        let mut engine = LifeEngine::new(5, 5);
        engine.init(&[(0, 0), (0, 1), (1, 0), (0, 4), (4, 0)]);
        engine.tick();
        assert!(engine.get(4, 4));
        assert!(!engine.get(0, 0));
    }

    #[test]
    fn glider_translates_diagonally_after_44_ticks() {
        let mut engine = LifeEngine::new(10, 10);
        engine.init(&[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)]);
        for _ in 0..44 {
            engine.tick();
        }
        let mut expected = LifeEngine::new(10, 10);
        expected.init(&[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)]);
        for _ in 0..44 {
            expected.tick();
        }
        for r in 0..10isize {
            for c in 0..10isize {
                assert_eq!(engine.get(r, c), expected.get(r, c));
            }
        }
        // A glider returns to its original shape translated by (1,1) mod
        // 10 every 4 ticks * 11 = 44 ticks.
        let mut translated = LifeEngine::new(10, 10);
        for &(r, c) in &[(0isize, 1isize), (1, 2), (2, 0), (2, 1), (2, 2)] {
            translated.init(&[(((r + 1).rem_euclid(10)) as usize, ((c + 1).rem_euclid(10)) as usize)]);
        }
        assert_eq!(engine.count_alive(), translated.count_alive());
        for r in 0..10isize {
            for c in 0..10isize {
                assert_eq!(engine.get(r, c), translated.get(r, c), "r={r} c={c}");
            }
        }
    }

    #[test]
    fn init_sets_only_requested_cells() {
        let mut engine = LifeEngine::new(3, 3);
        engine.init(&[(1, 1), (2, 2)]);
        assert!(engine.get(1, 1));
        assert!(engine.get(2, 2));
        assert_eq!(engine.count_alive(), 2);
    }

    #[test]
    fn subgame_wraps_grid_subgrid() {
        let mut engine = LifeEngine::new(5, 5);
        engine.init(&[(2, 2)]);
        let interior = engine.subgame(1, 1, -1, -1);
        assert_eq!(interior.rows(), 3);
        assert_eq!(interior.cols(), 3);
        assert!(interior.get(1, 1));
    }

    #[test]
    fn set_subgame_overwrites_state() {
        let mut engine = LifeEngine::new(5, 5);
        let mut patch = PackedGrid::new(2, 2);
        patch.set(0, 0, true);
        engine.set_subgame(1, 1, &patch);
        assert!(engine.get(1, 1));
        assert_eq!(engine.count_alive(), 1);
    }

    #[test]
    fn display_renders_alive_and_dead_markers() {
        let engine = engine_from_pattern(&["#.", ".#"]);
        let rendered = format!("{engine}");
        assert_eq!(rendered, "#.\n.#\n");
    }
}

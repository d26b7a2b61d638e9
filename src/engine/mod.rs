//! The Life Engine: a pair of toroidal grids advanced by Conway's rule.

mod life;

pub use life::LifeEngine;

use crate::grid::PackedGrid;
use std::time::Duration;

/// Common surface for a Game-of-Life engine, independent of its storage
/// layout. `LifeEngine` is this crate's only implementation; the trait
/// exists so the benchmark harness and the distributed driver depend on
/// behavior, not on `LifeEngine`'s concrete fields.
pub trait SimulationEngine {
    /// Advances the simulation by one tick.
    fn step(&mut self);

    /// The engine's current grid.
    fn grid(&self) -> &PackedGrid;

    /// Replaces the engine's current grid wholesale.
    fn set_grid(&mut self, grid: &PackedGrid);

    fn rows(&self) -> usize {
        self.grid().rows()
    }

    fn cols(&self) -> usize {
        self.grid().cols()
    }

    fn count_alive(&self) -> usize {
        self.grid().count_alive()
    }

    fn run_steps(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }

    fn run_steps_timed(&mut self, steps: usize) -> Duration {
        let start = std::time::Instant::now();
        self.run_steps(steps);
        start.elapsed()
    }
}

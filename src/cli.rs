//! Command-line front end. Argument parsing stays out of the simulation
//! core; this module is the external collaborator the core is
//! instantiated from.

use clap::Parser;
use std::path::PathBuf;

/// Distributed Conway's Game of Life over a toroidal process mesh.
#[derive(Debug, Parser)]
#[command(name = "life_mesh", version, about)]
pub struct Cli {
    /// Number of rows in the worker process mesh.
    #[arg(long, default_value_t = 2)]
    pub proc_rows: usize,

    /// Number of columns in the worker process mesh.
    #[arg(long, default_value_t = 2)]
    pub proc_cols: usize,

    /// Rank that owns the file header and the gathered grid.
    #[arg(long, default_value_t = 0)]
    pub root: usize,

    /// Number of synchronous ticks to run.
    #[arg(long, default_value_t = 44)]
    pub ticks: usize,

    /// Input P5 image; if absent, a glider is seeded on an 11x17 torus.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output P5 image path.
    #[arg(long, default_value = "output.pgm")]
    pub output: PathBuf,
}

impl Cli {
    pub fn world_size(&self) -> usize {
        self.proc_rows * self.proc_cols
    }
}

//! The per-worker owner of a haloed local engine: sequences `exchange ->
//! tick` each round and turns a collective gather into a reassembled
//! global grid.

use crate::engine::{LifeEngine, SimulationEngine};
use crate::error::Result;
use crate::grid::PackedGrid;
use crate::halo;
use crate::topology::ProcessTopology;
use crate::transport::Communicator;
use tracing::debug;

/// A worker's owned rectangle of the global grid, as half-open ranges.
#[derive(Debug, Clone, Copy)]
pub struct Rectangle {
    pub start_row: usize,
    pub end_row: usize,
    pub start_col: usize,
    pub end_col: usize,
}

impl Rectangle {
    pub fn rows(&self) -> usize {
        self.end_row - self.start_row
    }

    pub fn cols(&self) -> usize {
        self.end_col - self.start_col
    }
}

/// Splits `global_rows` into `proc_rows` shares, the last absorbing any
/// remainder, and likewise for columns.
fn rectangle_for(
    pr: usize,
    pc: usize,
    proc_rows: usize,
    proc_cols: usize,
    global_rows: usize,
    global_cols: usize,
) -> Rectangle {
    let base_rows = global_rows / proc_rows;
    let base_cols = global_cols / proc_cols;
    let start_row = pr * base_rows;
    let end_row = if pr == proc_rows - 1 { global_rows } else { start_row + base_rows };
    let start_col = pc * base_cols;
    let end_col = if pc == proc_cols - 1 { global_cols } else { start_col + base_cols };
    Rectangle { start_row, end_row, start_col, end_col }
}

/// Flattens a grid's cells to one byte per cell (0 or 1), row-major. Used
/// only as the gather wire format, not the image format.
fn serialize_cells(grid: &PackedGrid) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(grid.rows() * grid.cols());
    for r in 0..grid.rows() as isize {
        for c in 0..grid.cols() as isize {
            bytes.push(grid.get(r, c) as u8);
        }
    }
    bytes
}

fn deserialize_cells(rows: usize, cols: usize, bytes: &[u8]) -> PackedGrid {
    let mut grid = PackedGrid::new(rows, cols);
    for r in 0..rows as isize {
        for c in 0..cols as isize {
            grid.set(r, c, bytes[r as usize * cols + c as usize] != 0);
        }
    }
    grid
}

/// Owns `(local engine, topology, rectangle, neighbors)` for one worker.
/// `local` is haloed: shape `(rectangle.rows()+2, rectangle.cols()+2)`,
/// interior at `[1, rows+1) x [1, cols+1)`.
pub struct DistributedDriver {
    local: LifeEngine,
    topology: ProcessTopology,
    rank: usize,
    global_rows: usize,
    global_cols: usize,
    rectangle: Rectangle,
}

impl DistributedDriver {
    /// Builds this worker's driver by extracting its haloed rectangle out
    /// of a seed engine available in full to every worker at construction
    /// time; no inter-worker transfer happens here.
    pub fn from_seed(global: &LifeEngine, topology: ProcessTopology, rank: usize) -> Self {
        let (pr, pc) = topology.rank_to_coords(rank);
        let rectangle = rectangle_for(
            pr,
            pc,
            topology.proc_rows(),
            topology.proc_cols(),
            global.rows(),
            global.cols(),
        );
        let local = global.subgame(
            rectangle.start_row as isize - 1,
            rectangle.start_col as isize - 1,
            rectangle.end_row as isize + 1,
            rectangle.end_col as isize + 1,
        );
        Self {
            local,
            topology,
            rank,
            global_rows: global.rows(),
            global_cols: global.cols(),
            rectangle,
        }
    }

    /// Builds this worker's driver from a distributed image read: root
    /// parses the header and broadcasts the global shape, each worker
    /// computes its own rectangle from that broadcast and its topology,
    /// then reads only its own rows. The halo is left at zero until the
    /// first exchange.
    pub fn from_distributed_read<C: Communicator>(
        path: &std::path::Path,
        topology: ProcessTopology,
        rank: usize,
        comm: &C,
        root: usize,
    ) -> Result<Self> {
        let (pr, pc) = topology.rank_to_coords(rank);
        let proc_rows = topology.proc_rows();
        let proc_cols = topology.proc_cols();

        let mut rectangle = None;
        let (interior, global_rows, global_cols) =
            crate::image::read_distributed(path, comm, root, |height, width| {
                let r = rectangle_for(pr, pc, proc_rows, proc_cols, height, width);
                rectangle = Some(r);
                (r.rows(), r.cols(), r.start_row, r.start_col)
            })?;
        let rectangle = rectangle.expect("rectangle_of callback always runs");

        let mut local = PackedGrid::new(rectangle.rows() + 2, rectangle.cols() + 2);
        local.set_subgrid(1, 1, &interior);

        Ok(Self {
            local: LifeEngine::from_grid(local),
            topology,
            rank,
            global_rows,
            global_cols,
            rectangle,
        })
    }

    pub fn rectangle(&self) -> Rectangle {
        self.rectangle
    }

    /// One round: halo exchange, then a local tick.
    pub fn step<C: Communicator>(&mut self, comm: &C) -> Result<()> {
        halo::exchange(&mut self.local, &self.topology, comm)?;
        self.local.step();
        Ok(())
    }

    /// Runs `ticks` rounds, logging each one at debug level.
    pub fn run<C: Communicator>(&mut self, ticks: usize, comm: &C) -> Result<()> {
        for tick in 0..ticks {
            self.step(comm)?;
            debug!(rank = self.rank, tick, "round complete");
        }
        Ok(())
    }

    /// Interior cells only, with the halo stripped.
    fn interior(&self) -> PackedGrid {
        self.local.grid().subgrid(1, 1, -1, -1)
    }

    /// Collective gather: every worker contributes its exact-sized
    /// interior; root reassembles the global grid by placing each
    /// contribution at its rectangle's offset. Returns `Some` only on
    /// `root`; a non-root worker's result is `None`.
    pub fn gather<C: Communicator>(&self, comm: &C, root: usize) -> Result<Option<LifeEngine>> {
        let payload = serialize_cells(&self.interior());
        let contributions = comm.gather(root, payload)?;

        let Some(contributions) = contributions else {
            return Ok(None);
        };

        let mut global = PackedGrid::new(self.global_rows, self.global_cols);
        for rank in 0..self.topology.world_size() {
            let (pr, pc) = self.topology.rank_to_coords(rank);
            let rect = rectangle_for(
                pr,
                pc,
                self.topology.proc_rows(),
                self.topology.proc_cols(),
                self.global_rows,
                self.global_cols,
            );
            let piece = deserialize_cells(rect.rows(), rect.cols(), &contributions[rank]);
            global.set_subgrid(rect.start_row as isize, rect.start_col as isize, &piece);
        }

        Ok(Some(LifeEngine::from_grid(global)))
    }

    /// Writes this worker's interior into the shared output image.
    pub fn write_output<C: Communicator>(&self, path: &std::path::Path, comm: &C, root: usize) -> Result<()> {
        crate::image::write_distributed(
            path,
            &self.interior(),
            self.global_rows,
            self.global_cols,
            self.rectangle.start_row,
            self.rectangle.start_col,
            comm,
            root,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ThreadCommunicator;

    fn glider_seed(rows: usize, cols: usize) -> LifeEngine {
        let mut engine = LifeEngine::new(rows, cols);
        engine.init(&[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)]);
        engine
    }

    #[test]
    fn rectangle_for_absorbs_remainder_on_the_last_share() {
        let r = rectangle_for(0, 0, 2, 2, 11, 17);
        assert_eq!((r.start_row, r.end_row), (0, 5));
        assert_eq!((r.start_col, r.end_col), (0, 8));

        let r = rectangle_for(1, 1, 2, 2, 11, 17);
        assert_eq!((r.start_row, r.end_row), (5, 11));
        assert_eq!((r.start_col, r.end_col), (8, 17));
    }

    #[test]
    fn gathered_grid_on_a_2x2_mesh_matches_a_single_process_run() {
        let topology = ProcessTopology::new(2, 2, 4).unwrap();
        let seed = glider_seed(11, 17);
        let comms = ThreadCommunicator::build(topology, 0);

        let seed_ref = &seed;
        let results: Vec<Option<LifeEngine>> = std::thread::scope(|scope| {
            let handles: Vec<_> = comms
                .into_iter()
                .map(|comm| {
                    scope.spawn(move || {
                        let mut driver = DistributedDriver::from_seed(seed_ref, topology, comm.rank());
                        driver.run(44, &comm).unwrap();
                        driver.gather(&comm, 0).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let gathered = results.into_iter().find_map(|r| r).expect("root must produce a gathered grid");

        let mut reference = glider_seed(11, 17);
        reference.run_steps(44);

        for r in 0..11isize {
            for c in 0..17isize {
                assert_eq!(gathered.get(r, c), reference.get(r, c), "r={r} c={c}");
            }
        }
    }
}

//! Halo exchange: fills the one-cell ghost border each worker's local grid
//! carries around its interior, so that a local tick sees correct neighbor
//! counts at the seams between workers.
//!
//! The row phase must finish completely, including its `wait_all`, before
//! the column phase starts. Corner halo cells are never exchanged directly;
//! they arrive as a side effect of the column phase reading rows that the
//! row phase already patched in, which is only correct in this order.

use crate::engine::LifeEngine;
use crate::error::Result;
use crate::topology::{Direction, ProcessTopology};
use crate::transport::{Communicator, Tag};

/// Exchanges halos for `local`, a haloed grid of shape
/// `(interior_rows + 2, interior_cols + 2)` whose row/col `0` and
/// `rows - 1` / `cols - 1` are the ghost border.
pub fn exchange<C: Communicator>(local: &mut LifeEngine, topology: &ProcessTopology, comm: &C) -> Result<()> {
    let rank = comm.rank();
    let rows = local.rows() as isize;
    let cols = local.cols() as isize;

    let north = topology.neighbor(rank, Direction::North);
    let south = topology.neighbor(rank, Direction::South);
    let east = topology.neighbor(rank, Direction::East);
    let west = topology.neighbor(rank, Direction::West);

    // Row phase: top interior row travels north (filling that neighbor's
    // south halo), bottom interior row travels south.
    let top_row = local.get_row(1);
    let bottom_row = local.get_row(rows - 2);
    let send_to_north = comm.isend(north, Tag::FillSouthHalo, top_row);
    let send_to_south = comm.isend(south, Tag::FillNorthHalo, bottom_row);

    let from_north = comm.recv(Tag::FillNorthHalo)?;
    let from_south = comm.recv(Tag::FillSouthHalo)?;
    local.set_row(0, &from_north);
    local.set_row(rows - 1, &from_south);

    comm.wait_all(vec![send_to_north, send_to_south])?;

    // Column phase reads columns including row 0 and rows-1, which the row
    // phase above has already patched in, so corners land for free.
    let left_col = local.get_col(1);
    let right_col = local.get_col(cols - 2);
    let send_to_west = comm.isend(west, Tag::FillEastHalo, left_col);
    let send_to_east = comm.isend(east, Tag::FillWestHalo, right_col);

    let from_west = comm.recv(Tag::FillWestHalo)?;
    let from_east = comm.recv(Tag::FillEastHalo)?;
    local.set_col(0, &from_west);
    local.set_col(cols - 1, &from_east);

    comm.wait_all(vec![send_to_west, send_to_east])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::PackedGrid;
    use crate::transport::ThreadCommunicator;

    #[test]
    fn exchange_fills_halo_from_neighbors_interior_edges() {
        let topology = ProcessTopology::new(1, 2, 2).unwrap();
        let comms = ThreadCommunicator::build(topology, 0);

        // Two 1x2 workers tiling a 1x4 torus. Each local grid is haloed to
        // 3x4 (1 interior row, 2 interior cols, +2 halo each dimension).
        std::thread::scope(|scope| {
            for comm in comms {
                scope.spawn(move || {
                    let mut grid = PackedGrid::new(3, 4);
                    // interior row is row 1; mark both interior cells alive
                    // so the exchanged halo rows/cols are non-trivial.
                    grid.set(1, 1, true);
                    grid.set(1, 2, true);
                    let mut engine = LifeEngine::from_grid(grid);

                    exchange(&mut engine, &topology, &comm).unwrap();

                    // North and south neighbors are this worker itself on a
                    // 1-row mesh, so its own interior row reappears as both
                    // halo rows.
                    assert!(engine.get(0, 1));
                    assert!(engine.get(0, 2));
                    assert!(engine.get(2, 1));
                    assert!(engine.get(2, 2));
                });
            }
        });
    }
}

//! Maps worker ids to coordinates in a rectangular, toroidal process mesh.

use crate::error::{AppError, Result};
use crate::grid::modulo;

/// Cardinal direction, in the order the halo exchange visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

/// An `R x C` mesh of worker ids, itself toroidal.
#[derive(Debug, Clone, Copy)]
pub struct ProcessTopology {
    proc_rows: usize,
    proc_cols: usize,
}

impl ProcessTopology {
    /// Builds a topology, failing if `world_size != proc_rows * proc_cols`.
    /// A mismatched mesh is a fatal configuration error, not something a
    /// caller can recover from.
    pub fn new(proc_rows: usize, proc_cols: usize, world_size: usize) -> Result<Self> {
        if proc_rows == 0 || proc_cols == 0 {
            return Err(AppError::Configuration(
                "process mesh dimensions must be positive".into(),
            ));
        }
        if proc_rows * proc_cols != world_size {
            return Err(AppError::Configuration(format!(
                "world size {world_size} does not match mesh {proc_rows}x{proc_cols}"
            )));
        }
        Ok(Self { proc_rows, proc_cols })
    }

    pub fn proc_rows(&self) -> usize {
        self.proc_rows
    }

    pub fn proc_cols(&self) -> usize {
        self.proc_cols
    }

    pub fn world_size(&self) -> usize {
        self.proc_rows * self.proc_cols
    }

    /// `r = (k mod N) / proc_cols`, `c = (k mod N) mod proc_cols`.
    pub fn rank_to_coords(&self, k: usize) -> (usize, usize) {
        let n = self.world_size();
        let k = k % n;
        (k / self.proc_cols, k % self.proc_cols)
    }

    /// `mod(r, proc_rows) * proc_cols + mod(c, proc_cols)`.
    pub fn coords_to_rank(&self, r: isize, c: isize) -> usize {
        modulo(r, self.proc_rows as isize) * self.proc_cols + modulo(c, self.proc_cols as isize)
    }

    /// The four cardinal neighbors of rank `k`, in `[N, S, E, W]` order.
    pub fn neighbors(&self, k: usize) -> [usize; 4] {
        let (r, c) = self.rank_to_coords(k);
        let r = r as isize;
        let c = c as isize;
        [
            self.coords_to_rank(r - 1, c),
            self.coords_to_rank(r + 1, c),
            self.coords_to_rank(r, c + 1),
            self.coords_to_rank(r, c - 1),
        ]
    }

    /// Neighbor in a single direction, for callers that don't need all four.
    pub fn neighbor(&self, k: usize, direction: Direction) -> usize {
        let (r, c) = self.rank_to_coords(k);
        let (r, c) = (r as isize, c as isize);
        match direction {
            Direction::North => self.coords_to_rank(r - 1, c),
            Direction::South => self.coords_to_rank(r + 1, c),
            Direction::East => self.coords_to_rank(r, c + 1),
            Direction::West => self.coords_to_rank(r, c - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_world_size() {
        assert!(ProcessTopology::new(2, 2, 3).is_err());
        assert!(ProcessTopology::new(2, 2, 4).is_ok());
    }

    #[test]
    fn rank_to_coords_round_trips_with_coords_to_rank() {
        let topo = ProcessTopology::new(3, 4, 12).unwrap();
        for k in 0..12 {
            let (r, c) = topo.rank_to_coords(k);
            assert_eq!(topo.coords_to_rank(r as isize, c as isize), k);
        }
    }

    #[test]
    fn neighbors_wrap_on_mesh_edges() {
        let topo = ProcessTopology::new(2, 2, 4);
        let topo = topo.unwrap();
        // rank 0 is (0,0); north neighbor wraps to (1,0) = rank 2.
        let neighbors = topo.neighbors(0);
        assert_eq!(neighbors, [2, 2, 1, 1]); // N,S both wrap to row 1; E,W both to col 1
    }

    #[test]
    fn neighbors_on_a_larger_mesh() {
        let topo = ProcessTopology::new(2, 3, 6).unwrap();
        // rank 4 -> (1, 1)
        assert_eq!(topo.rank_to_coords(4), (1, 1));
        let neighbors = topo.neighbors(4);
        // N: (0,1)=1, S: (0,1) wraps to (0,1)=1 since proc_rows=2, S of row1 -> row0
        assert_eq!(neighbors[0], topo.coords_to_rank(0, 1));
        assert_eq!(neighbors[1], topo.coords_to_rank(2, 1));
        assert_eq!(neighbors[2], topo.coords_to_rank(1, 2));
        assert_eq!(neighbors[3], topo.coords_to_rank(1, 0));
    }
}

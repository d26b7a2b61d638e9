pub mod benchmark;
pub mod cli;
pub mod driver;
pub mod engine;
pub mod error;
pub mod grid;
pub mod halo;
pub mod image;
pub mod topology;
pub mod transport;

pub mod prelude {
    pub use crate::driver::DistributedDriver;
    pub use crate::engine::{LifeEngine, SimulationEngine};
    pub use crate::error::{AppError, Result};
    pub use crate::grid::PackedGrid;
    pub use crate::topology::ProcessTopology;
    pub use crate::transport::{Communicator, ThreadCommunicator};
}

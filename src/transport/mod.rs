//! Transport layer standing in for an MPI communicator: no MPI binding
//! exists anywhere in this crate's reference corpus, so workers are OS
//! threads and messages travel over `crossbeam_channel` mailboxes instead
//! of the wire. FIFO per-pair delivery, lock-step rounds, and collective
//! synchronization points all still hold.

mod thread_comm;

pub use thread_comm::{Mesh, ThreadCommunicator};

use crate::error::Result;

/// What role a message plays for its *destination*: "this fills my north
/// halo" and so on. Tagging by the receiver's role (rather than by sender
/// identity) keeps point-to-point delivery unambiguous even on meshes small
/// enough that a worker's north and south neighbor (or east and west) are
/// the same rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    FillNorthHalo,
    FillSouthHalo,
    FillWestHalo,
    FillEastHalo,
    /// Root-to-worker broadcast delivery.
    Control,
    /// Worker-to-root gather delivery (payload is rank-prefixed; see
    /// `Communicator::gather`).
    Gather,
}

/// A handle to a send posted by [`Communicator::isend`]; pass the
/// collection returned from a round's sends to [`Communicator::wait_all`].
pub struct PendingSend {
    handle: std::thread::JoinHandle<Result<()>>,
}

/// The primitives the halo exchange (component D) and the distributed
/// driver (component E) need from a transport. `ThreadCommunicator` is this
/// crate's one implementation.
pub trait Communicator {
    fn rank(&self) -> usize;
    fn world_size(&self) -> usize;

    /// Enqueues `bytes` for delivery to `to`, tagged with the role the
    /// message plays at its destination. Returns immediately; the actual
    /// transfer may still be in flight when this returns.
    fn isend(&self, to: usize, tag: Tag, bytes: Vec<u8>) -> PendingSend;

    /// Blocks until a message tagged `tag` addressed to this worker has
    /// arrived, and returns it.
    fn recv(&self, tag: Tag) -> Result<Vec<u8>>;

    /// Blocks until every pending send has completed delivery.
    fn wait_all(&self, pending: Vec<PendingSend>) -> Result<()> {
        for p in pending {
            p.handle
                .join()
                .map_err(|_| crate::error::AppError::Transport("send thread panicked".into()))??;
        }
        Ok(())
    }

    /// Blocks until every worker has called `barrier`.
    fn barrier(&self);

    /// Root supplies `Some(payload)`; every other caller passes `None` and
    /// receives root's payload back. All callers block until root has
    /// published its value.
    fn broadcast(&self, root: usize, payload: Option<Vec<u8>>) -> Result<Vec<u8>>;

    /// Every worker contributes `payload`. On the root, returns
    /// `Some(contributions)` indexed by rank; on every other worker,
    /// returns `None`.
    fn gather(&self, root: usize, payload: Vec<u8>) -> Result<Option<Vec<Vec<u8>>>>;
}

//! `ThreadCommunicator`: one instance per worker thread, backed by
//! `crossbeam_channel` mailboxes built once, up front, from the process
//! topology.

use super::{Communicator, PendingSend, Tag};
use crate::error::{AppError, Result};
use crate::topology::ProcessTopology;
use crossbeam_channel::{Receiver, Sender};
use std::collections::HashMap;
use std::sync::{Arc, Barrier};

/// Capacity of each halo/control mailbox. One in flight at a time is all a
/// single lock-step round ever needs; a bounded channel this small makes
/// `wait_all` a real synchronization point rather than a formality.
const MAILBOX_CAPACITY: usize = 1;

/// The shared, read-only routing table: every `(destination, tag)` pair
/// maps to the one sender half allowed to feed it.
pub struct Mesh {
    senders: HashMap<(usize, Tag), Sender<Vec<u8>>>,
}

pub struct ThreadCommunicator {
    rank: usize,
    world_size: usize,
    mesh: Arc<Mesh>,
    inboxes: HashMap<Tag, Receiver<Vec<u8>>>,
    gather_inbox: Option<Receiver<Vec<u8>>>,
    barrier: Arc<Barrier>,
}

impl ThreadCommunicator {
    /// Builds one communicator per rank of `topology`, wired so that every
    /// worker's four halo mailboxes are fed by its four topological
    /// neighbors, every worker has a broadcast mailbox, and `root` has a
    /// gather mailbox fed by every worker (including itself).
    pub fn build(topology: ProcessTopology, root: usize) -> Vec<ThreadCommunicator> {
        let world_size = topology.world_size();
        let mut senders = HashMap::new();
        let mut inboxes: Vec<HashMap<Tag, Receiver<Vec<u8>>>> =
            (0..world_size).map(|_| HashMap::new()).collect();

        let halo_tags = [Tag::FillNorthHalo, Tag::FillSouthHalo, Tag::FillWestHalo, Tag::FillEastHalo];

        for owner in 0..world_size {
            for &tag in &halo_tags {
                let (tx, rx) = crossbeam_channel::bounded(MAILBOX_CAPACITY);
                senders.insert((owner, tag), tx);
                inboxes[owner].insert(tag, rx);
            }

            let (tx, rx) = crossbeam_channel::bounded(MAILBOX_CAPACITY);
            senders.insert((owner, Tag::Control), tx);
            inboxes[owner].insert(Tag::Control, rx);
        }

        let (gather_tx, gather_rx) = crossbeam_channel::bounded(world_size);
        senders.insert((root, Tag::Gather), gather_tx);

        let mesh = Arc::new(Mesh { senders });
        let barrier = Arc::new(Barrier::new(world_size));

        inboxes
            .into_iter()
            .enumerate()
            .map(|(rank, inboxes)| ThreadCommunicator {
                rank,
                world_size,
                mesh: mesh.clone(),
                inboxes,
                gather_inbox: if rank == root {
                    Some(gather_rx.clone())
                } else {
                    None
                },
                barrier: barrier.clone(),
            })
            .collect()
    }
}

impl Communicator for ThreadCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.world_size
    }

    fn isend(&self, to: usize, tag: Tag, bytes: Vec<u8>) -> PendingSend {
        let sender = self
            .mesh
            .senders
            .get(&(to, tag))
            .unwrap_or_else(|| panic!("no mailbox routed for (rank {to}, {tag:?})"))
            .clone();
        let handle = std::thread::spawn(move || {
            sender
                .send(bytes)
                .map_err(|_| AppError::Transport("peer mailbox disconnected".into()))
        });
        PendingSend { handle }
    }

    fn recv(&self, tag: Tag) -> Result<Vec<u8>> {
        self.inboxes
            .get(&tag)
            .unwrap_or_else(|| panic!("worker {} has no inbox for {tag:?}", self.rank))
            .recv()
            .map_err(|_| AppError::Transport("mailbox sender disconnected".into()))
    }

    fn barrier(&self) {
        self.barrier.wait();
    }

    fn broadcast(&self, root: usize, payload: Option<Vec<u8>>) -> Result<Vec<u8>> {
        if self.rank == root {
            let bytes = payload.ok_or_else(|| {
                AppError::Transport("root must supply a broadcast payload".into())
            })?;
            let pending: Vec<PendingSend> = (0..self.world_size)
                .map(|dest| self.isend(dest, Tag::Control, bytes.clone()))
                .collect();
            self.wait_all(pending)?;
        }
        self.recv(Tag::Control)
    }

    fn gather(&self, root: usize, payload: Vec<u8>) -> Result<Option<Vec<Vec<u8>>>> {
        let mut framed = Vec::with_capacity(8 + payload.len());
        framed.extend_from_slice(&(self.rank as u64).to_le_bytes());
        framed.extend_from_slice(&payload);
        let pending = self.isend(root, Tag::Gather, framed);
        self.wait_all(vec![pending])?;

        if self.rank != root {
            return Ok(None);
        }

        let inbox = self
            .gather_inbox
            .as_ref()
            .expect("root must own a gather inbox");
        let mut results: Vec<Option<Vec<u8>>> = vec![None; self.world_size];
        for _ in 0..self.world_size {
            let msg = inbox
                .recv()
                .map_err(|_| AppError::Transport("gather mailbox disconnected".into()))?;
            let (rank_bytes, data) = msg.split_at(8);
            let rank = u64::from_le_bytes(rank_bytes.try_into().unwrap()) as usize;
            results[rank] = Some(data.to_vec());
        }
        Ok(Some(
            results
                .into_iter()
                .map(|v| v.expect("every rank must contribute to a gather"))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Direction;

    #[test]
    fn halo_exchange_round_trip_between_neighbors() {
        let topology = ProcessTopology::new(2, 2, 4).unwrap();
        let comms = ThreadCommunicator::build(topology, 0);

        std::thread::scope(|scope| {
            for comm in &comms {
                scope.spawn(move || {
                    let north = topology.neighbor(comm.rank(), Direction::North);
                    let south = topology.neighbor(comm.rank(), Direction::South);
                    let send_north = comm.isend(north, Tag::FillSouthHalo, vec![comm.rank() as u8]);
                    let send_south = comm.isend(south, Tag::FillNorthHalo, vec![comm.rank() as u8]);
                    comm.wait_all(vec![send_north, send_south]).unwrap();

                    let from_north = comm.recv(Tag::FillNorthHalo).unwrap();
                    let from_south = comm.recv(Tag::FillSouthHalo).unwrap();
                    assert_eq!(from_north, vec![north as u8]);
                    assert_eq!(from_south, vec![south as u8]);
                });
            }
        });
    }

    #[test]
    fn broadcast_delivers_roots_payload_to_everyone() {
        let topology = ProcessTopology::new(2, 2, 4).unwrap();
        let comms = ThreadCommunicator::build(topology, 0);

        std::thread::scope(|scope| {
            for comm in comms {
                scope.spawn(move || {
                    let payload = if comm.rank() == 0 {
                        Some(vec![42u8])
                    } else {
                        None
                    };
                    let received = comm.broadcast(0, payload).unwrap();
                    assert_eq!(received, vec![42u8]);
                });
            }
        });
    }

    #[test]
    fn gather_collects_every_ranks_contribution_in_rank_order() {
        let topology = ProcessTopology::new(2, 2, 4).unwrap();
        let comms = ThreadCommunicator::build(topology, 0);

        std::thread::scope(|scope| {
            for comm in comms {
                scope.spawn(move || {
                    let result = comm.gather(0, vec![comm.rank() as u8]).unwrap();
                    if comm.rank() == 0 {
                        let result = result.unwrap();
                        assert_eq!(result, vec![vec![0u8], vec![1u8], vec![2u8], vec![3u8]]);
                    } else {
                        assert!(result.is_none());
                    }
                });
            }
        });
    }
}

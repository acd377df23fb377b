//! Group collectives
//!
//! This module implements the fixed-size group of cooperating members that
//! the rest of the program runs on. Members are created together, one handle
//! per rank, and rank 0 is the coordinator. Three collective primitives are
//! provided; every value that crosses a member boundary does so through one
//! of them:
//!
//! - **barrier**: block until every member has arrived
//! - **announce**: the coordinator's chosen command, delivered to every
//!   member (the coordinator included)
//! - **scatter**: the coordinator's dataset, partitioned into contiguous
//!   shards, one per rank
//!
//! # Round structure
//!
//! ```text
//! Coordinator                      Workers
//!     |                               |
//!     |---------- barrier ------------|   (everyone arrives)
//!     |                               |
//!     |-- announce(command) --------->|   (all observe the same command)
//!     |                               |
//!     |-- scatter(shard per rank) --->|   (bmi rounds only)
//!     |                               |
//!     |        ... handlers run on locally-owned state ...
//! ```
//!
//! Every member must execute the same sequence of collectives per round.
//! There are no timeouts: a member that stops calling collectives wedges the
//! group, which is the documented limitation of this design rather than a
//! handled error. What *is* detected is teardown - when a member's handle is
//! dropped mid-round the members blocked on it observe
//! [`GroupError::Disconnected`] - and desynchronization that happens to pair
//! two different collectives, which surfaces as
//! [`GroupError::CollectiveMismatch`].

use crate::dispatch::MenuCommand;
use crate::patient::PatientRecord;
use crossbeam::channel::{self, Receiver, Sender};
use std::sync::{Arc, Barrier};
use thiserror::Error;

/// Errors surfaced by the collective primitives
///
/// All of these are fatal to the group; none are retried.
#[derive(Debug, Error, PartialEq)]
pub enum GroupError {
    /// A member dropped its handle mid-round (thread exit or panic)
    #[error("group member disconnected mid-round")]
    Disconnected,

    /// This member is executing a different collective than the coordinator
    #[error("collective mismatch: executing {expected}, received {received}")]
    CollectiveMismatch {
        expected: &'static str,
        received: &'static str,
    },

    /// The coordinator called a collective without supplying its payload
    #[error("{collective} requires a value on the coordinator")]
    MissingCoordinatorValue { collective: &'static str },

    /// The requested shards do not fit in the dataset
    #[error("scatter of {requested} records per rank exceeds the {available}-record dataset")]
    ShardOutOfRange { requested: usize, available: usize },
}

/// Per-member role, resolved once from the rank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Rank 0: owns interactive input and the authoritative dataset
    Coordinator,
    /// Every other rank: acts only on announced commands and scattered shards
    Worker,
}

/// Values exchanged through the collectives
///
/// Members execute the same collective sequence each round, so the variant a
/// member receives must match the collective it is executing.
enum Collective {
    Command(MenuCommand),
    Shard(Vec<PatientRecord>),
}

impl Collective {
    fn name(&self) -> &'static str {
        match self {
            Collective::Command(_) => "announce",
            Collective::Shard(_) => "scatter",
        }
    }
}

/// Factory for a fixed-size member group
pub struct ProcessGroup;

impl ProcessGroup {
    /// Create a group of `size` members
    ///
    /// Returns one handle per rank, in rank order; hand each to its own
    /// thread. `size` must be at least 1 (enforced by config validation
    /// before the group is built). The group size is fixed for the handles'
    /// lifetime.
    pub fn new(size: usize) -> Vec<GroupMember> {
        debug_assert!(size >= 1, "group size must be at least 1");

        let barrier = Arc::new(Barrier::new(size));
        let (senders, receivers): (Vec<_>, Vec<_>) =
            (0..size).map(|_| channel::unbounded()).unzip();

        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| GroupMember {
                rank,
                size,
                barrier: Arc::clone(&barrier),
                // Only the coordinator sends, so only rank 0 keeps the
                // outbound side. This is also what makes disconnects
                // observable: when the coordinator drops, every worker's
                // inbox closes.
                peers: if rank == 0 { senders.clone() } else { Vec::new() },
                inbox,
            })
            .collect()
    }
}

/// One member's handle into the group
///
/// Rank and size are fixed at creation. The handle is `Send` but not
/// `Clone`: exactly one thread owns each rank, and dropping the handle is
/// what signals the rest of the group that this member is gone.
pub struct GroupMember {
    rank: usize,
    size: usize,
    barrier: Arc<Barrier>,
    /// Outbound channels to every member's inbox; empty on workers
    peers: Vec<Sender<Collective>>,
    inbox: Receiver<Collective>,
}

impl GroupMember {
    /// This member's rank (0..size)
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Fixed group size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Role, resolved once from the rank
    pub fn role(&self) -> Role {
        if self.rank == 0 {
            Role::Coordinator
        } else {
            Role::Worker
        }
    }

    /// Whether this member is the coordinator
    pub fn is_coordinator(&self) -> bool {
        self.rank == 0
    }

    /// Block until every member has arrived
    pub fn barrier(&self) {
        self.barrier.wait();
    }

    /// Make the coordinator's chosen command known to every member
    ///
    /// `choice` is read on the coordinator only; workers pass `None`. Every
    /// member receives the announced command back, the coordinator included.
    /// Workers block until the coordinator has announced. Must be called by
    /// every member each round.
    pub fn announce(&self, choice: Option<MenuCommand>) -> Result<MenuCommand, GroupError> {
        if self.is_coordinator() {
            let command = choice.ok_or(GroupError::MissingCoordinatorValue {
                collective: "announce",
            })?;
            for peer in &self.peers {
                peer.send(Collective::Command(command))
                    .map_err(|_| GroupError::Disconnected)?;
            }
        }

        match self.inbox.recv() {
            Ok(Collective::Command(command)) => Ok(command),
            Ok(other) => Err(GroupError::CollectiveMismatch {
                expected: "announce",
                received: other.name(),
            }),
            Err(_) => Err(GroupError::Disconnected),
        }
    }

    /// Distribute one contiguous shard of the coordinator's dataset to each
    /// member
    ///
    /// `dataset` is read on the coordinator only; workers pass `None`. Rank
    /// `r` receives records `[r * shard_len, (r + 1) * shard_len)` as an
    /// owned copy, the coordinator included. Records past
    /// `shard_len * size` are not sent to anyone; `shard::dropped_records`
    /// accounts for them. Must be called by every member in the same round.
    pub fn scatter(
        &self,
        dataset: Option<&[PatientRecord]>,
        shard_len: usize,
    ) -> Result<Vec<PatientRecord>, GroupError> {
        if self.is_coordinator() {
            let full = dataset.ok_or(GroupError::MissingCoordinatorValue {
                collective: "scatter",
            })?;
            if shard_len * self.size > full.len() {
                return Err(GroupError::ShardOutOfRange {
                    requested: shard_len,
                    available: full.len(),
                });
            }
            for (rank, peer) in self.peers.iter().enumerate() {
                let start = rank * shard_len;
                let shard = full[start..start + shard_len].to_vec();
                peer.send(Collective::Shard(shard))
                    .map_err(|_| GroupError::Disconnected)?;
            }
        }

        match self.inbox.recv() {
            Ok(Collective::Shard(shard)) => Ok(shard),
            Ok(other) => Err(GroupError::CollectiveMismatch {
                expected: "scatter",
                received: other.name(),
            }),
            Err(_) => Err(GroupError::Disconnected),
        }
    }
}

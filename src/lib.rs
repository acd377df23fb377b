//! VitalPulse - Distributed patient vitals processing
//!
//! VitalPulse maintains a shared in-memory dataset of synthetic patient
//! records across a fixed group of cooperating members and drives it from an
//! interactive menu on a single coordinator rank.
//!
//! # Architecture
//!
//! - **Collective primitives**: barrier, command announcement, dataset scatter
//! - **Lockstep rounds**: every member observes the announced command before
//!   any member acts on it
//! - **Sharded computation**: per-record BMI computed by the rank that owns
//!   the shard
//! - **Local aggregation**: dataset-wide average heart rate reduced on the
//!   coordinator, with a mergeable partial sum for a partitioned variant

pub mod config;
pub mod dispatch;
pub mod group;
pub mod output;
pub mod patient;
pub mod shard;
pub mod stats;

// Re-export commonly used types
pub use config::Config;
pub use group::{GroupMember, ProcessGroup};

/// Result type used throughout VitalPulse
pub type Result<T> = anyhow::Result<T>;

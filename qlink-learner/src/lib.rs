//! The qlink learner coordinator
//!
//! Ties the replay buffer, exploration schedule, and approximator to
//! the many-to-one peer channel: every inbound experience record is
//! decoded and buffered, training runs once the batch threshold is
//! crossed, and model snapshots ship back to actors on an episode
//! cadence.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod checkpoint;
pub mod coordinator;
pub mod dispatch;
pub mod driver;

#[cfg(test)]
pub(crate) mod testing;

pub use checkpoint::{CheckpointStore, SnapshotMetadata};
pub use coordinator::Coordinator;
pub use dispatch::SnapshotDispatcher;
pub use driver::{DriverState, TrainingStepDriver};

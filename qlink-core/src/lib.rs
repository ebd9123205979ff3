//! Core types for the qlink experience-exchange learner
//!
//! This crate provides the leaf components of the learner: the
//! experience record and its wire codec, the bounded replay buffer,
//! the exploration schedule, the approximator capability trait, and
//! the run configuration.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod approximator;
pub mod buffer;
pub mod config;
pub mod error;
pub mod experience;
pub mod schedule;

pub use approximator::{Approximator, LinearQ};
pub use buffer::ReplayBuffer;
pub use config::LearnerConfig;
pub use error::{LearnerError, Result};
pub use experience::{ExperienceCodec, ExperienceRecord, WIRE_VERSION};
pub use schedule::ExplorationSchedule;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Approximator, ExperienceCodec, ExperienceRecord, ExplorationSchedule, LearnerConfig,
        LearnerError, ReplayBuffer, Result,
    };
}

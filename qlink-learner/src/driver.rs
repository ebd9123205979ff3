//! Training step driver

use tracing::debug;

use qlink_core::{Approximator, ExplorationSchedule, ReplayBuffer, Result};

/// Whether enough data has accumulated to train
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Buffer still below the batch threshold
    Waiting,
    /// Threshold crossed; every further insert trains
    Ready,
}

/// Decides, per inserted record, whether to run one training step
///
/// Two-state machine: `Waiting` until an insert brings the buffer to
/// the batch threshold, `Ready` from then on (the buffer can only grow
/// toward capacity, never back below the threshold). The insert that
/// crosses the threshold arms the driver; each insert after that
/// samples a batch, trains, and advances the exploration schedule once.
#[derive(Debug)]
pub struct TrainingStepDriver {
    batch_size: usize,
    state: DriverState,
    steps_completed: usize,
}

impl TrainingStepDriver {
    /// Create a driver for the given batch size
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            state: DriverState::Waiting,
            steps_completed: 0,
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Training steps completed so far
    #[must_use]
    pub fn steps_completed(&self) -> usize {
        self.steps_completed
    }

    /// React to one freshly inserted record
    ///
    /// Returns the training loss when a step ran, `None` while waiting.
    /// Training failures propagate: a malformed batch means a schema
    /// mismatch that will recur, so there is no retry.
    pub async fn on_insert<A>(
        &mut self,
        buffer: &ReplayBuffer,
        approximator: &mut A,
        schedule: &mut ExplorationSchedule,
    ) -> Result<Option<f32>>
    where
        A: Approximator,
    {
        if self.state == DriverState::Waiting {
            if buffer.len() >= self.batch_size {
                self.state = DriverState::Ready;
                debug!(buffer_len = buffer.len(), "batch threshold crossed");
            }
            return Ok(None);
        }

        let batch = buffer.sample(self.batch_size)?;
        let loss = approximator.train(&batch).await?;
        schedule.step();
        self.steps_completed += 1;
        Ok(Some(loss))
    }
}

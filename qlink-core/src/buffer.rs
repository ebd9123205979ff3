//! Bounded FIFO replay buffer with uniform batch sampling

use rand::seq::index;
use std::collections::VecDeque;

use crate::error::{LearnerError, Result};
use crate::experience::ExperienceRecord;

/// Fixed-capacity replay buffer
///
/// Insertion beyond capacity evicts the oldest record, keeping training
/// data recency-biased without per-record metadata. Sampling never
/// removes records; they live until capacity pressure evicts them.
#[derive(Debug, Clone)]
pub struct ReplayBuffer {
    buffer: VecDeque<ExperienceRecord>,
    capacity: usize,
}

impl ReplayBuffer {
    /// Create a buffer holding at most `capacity` records
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert a record, evicting the oldest if at capacity
    pub fn insert(&mut self, record: ExperienceRecord) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(record);
    }

    /// Sample `n` distinct records uniformly at random
    ///
    /// Fails with [`LearnerError::InsufficientData`] while the buffer
    /// holds fewer than `n` records.
    pub fn sample(&self, n: usize) -> Result<Vec<ExperienceRecord>> {
        if self.buffer.len() < n {
            return Err(LearnerError::InsufficientData {
                have: self.buffer.len(),
                need: n,
            });
        }

        let mut rng = rand::thread_rng();
        let batch = index::sample(&mut rng, self.buffer.len(), n)
            .into_iter()
            .map(|i| self.buffer[i].clone())
            .collect();
        Ok(batch)
    }

    /// Number of records currently held
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Configured maximum capacity
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate records oldest-first
    pub fn iter(&self) -> impl Iterator<Item = &ExperienceRecord> {
        self.buffer.iter()
    }
}

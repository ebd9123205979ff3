//! Exploration rate schedule

/// Stateful epsilon-greedy schedule
///
/// The learner owns the decay: the rate advances exactly once per
/// completed training step, floored at `min`, so exploration tracks
/// training progress rather than raw message volume.
#[derive(Debug, Clone)]
pub struct ExplorationSchedule {
    rate: f64,
    min: f64,
    decay: f64,
}

impl ExplorationSchedule {
    /// Create a schedule starting at `initial`, decaying by `decay` per
    /// training step, never dropping below `min`
    #[must_use]
    pub fn new(initial: f64, min: f64, decay: f64) -> Self {
        Self {
            rate: initial,
            min,
            decay,
        }
    }

    /// Current exploration rate
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Advance the schedule by one completed training step
    pub fn step(&mut self) {
        if self.rate > self.min {
            self.rate = (self.rate * self.decay).max(self.min);
        }
    }
}

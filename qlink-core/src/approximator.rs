//! Value-function approximator capability
//!
//! The coordinator consumes the approximator only through this trait;
//! the numeric backend behind it is interchangeable. A pure-ndarray
//! linear Q-function ships as the default implementation.

use async_trait::async_trait;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{LearnerError, Result};
use crate::experience::ExperienceRecord;

/// Capability object wrapping the value-function approximator
#[async_trait]
pub trait Approximator: Send {
    /// Action values for one state
    async fn predict(&self, state: &[f32]) -> Result<Vec<f32>>;

    /// Train on one sampled batch, returning the loss
    async fn train(&mut self, batch: &[ExperienceRecord]) -> Result<f32>;

    /// Serialize current parameters to an opaque snapshot blob
    async fn serialize(&self) -> Result<Vec<u8>>;

    /// Replace current parameters from a snapshot blob
    async fn deserialize(&mut self, bytes: &[u8]) -> Result<()>;
}

/// Parameter snapshot version, independent of the experience wire version
const PARAMS_VERSION: u8 = 1;

#[derive(Serialize, Deserialize)]
struct LinearQParams {
    version: u8,
    state_size: usize,
    action_size: usize,
    weights: Array2<f32>,
    bias: Array1<f32>,
}

/// Linear Q-function with per-action weight rows
///
/// Training takes one SGD step per batch record on the squared TD error
/// against the target `reward + gamma * max_a' Q(next_state, a')`,
/// bootstrapping only on non-terminal records.
#[derive(Debug, Clone)]
pub struct LinearQ {
    weights: Array2<f32>,
    bias: Array1<f32>,
    state_size: usize,
    action_size: usize,
    gamma: f32,
    learning_rate: f32,
}

impl LinearQ {
    /// Create a zero-initialized approximator
    #[must_use]
    pub fn new(state_size: usize, action_size: usize, gamma: f32, learning_rate: f32) -> Self {
        Self {
            weights: Array2::zeros((action_size, state_size)),
            bias: Array1::zeros(action_size),
            state_size,
            action_size,
            gamma,
            learning_rate,
        }
    }

    fn q_values(&self, state: &[f32]) -> Result<Array1<f32>> {
        if state.len() != self.state_size {
            return Err(LearnerError::DimensionMismatch {
                expected: self.state_size,
                actual: state.len(),
            });
        }
        let s = Array1::from_vec(state.to_vec());
        Ok(self.weights.dot(&s) + &self.bias)
    }
}

#[async_trait]
impl Approximator for LinearQ {
    async fn predict(&self, state: &[f32]) -> Result<Vec<f32>> {
        Ok(self.q_values(state)?.to_vec())
    }

    async fn train(&mut self, batch: &[ExperienceRecord]) -> Result<f32> {
        let mut squared_error = 0.0f32;

        for record in batch {
            let action = record.action as usize;
            if action >= self.action_size {
                return Err(LearnerError::Approximator(format!(
                    "action {} out of range [0, {})",
                    record.action, self.action_size
                )));
            }

            let mut target = record.reward;
            if !record.done {
                let next_q = self.q_values(&record.next_state)?;
                let max_next = next_q.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                target += self.gamma * max_next;
            }

            let q = self.q_values(&record.state)?;
            let td = target - q[action];
            squared_error += td * td;

            let s = Array1::from_vec(record.state.clone());
            let step = &s * (self.learning_rate * td);
            let mut row = self.weights.row_mut(action);
            row += &step;
            self.bias[action] += self.learning_rate * td;
        }

        Ok(squared_error / batch.len().max(1) as f32)
    }

    async fn serialize(&self) -> Result<Vec<u8>> {
        let params = LinearQParams {
            version: PARAMS_VERSION,
            state_size: self.state_size,
            action_size: self.action_size,
            weights: self.weights.clone(),
            bias: self.bias.clone(),
        };
        Ok(bincode::serialize(&params)?)
    }

    async fn deserialize(&mut self, bytes: &[u8]) -> Result<()> {
        let params: LinearQParams = bincode::deserialize(bytes)?;
        if params.version != PARAMS_VERSION {
            return Err(LearnerError::Approximator(format!(
                "snapshot version {} != expected {PARAMS_VERSION}",
                params.version
            )));
        }
        if params.state_size != self.state_size || params.action_size != self.action_size {
            return Err(LearnerError::Approximator(format!(
                "snapshot dims {}x{} != configured {}x{}",
                params.action_size, params.state_size, self.action_size, self.state_size
            )));
        }
        self.weights = params.weights;
        self.bias = params.bias;
        Ok(())
    }
}

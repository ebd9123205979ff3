//! Learner run configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LearnerError, Result};

/// Full configuration for one learner run; fixed at process start
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    /// State vector dimensionality
    pub state_size: usize,
    /// Number of discrete actions
    pub action_size: usize,
    /// Replay buffer capacity
    pub replay_capacity: usize,
    /// Training batch size
    pub batch_size: usize,
    /// Discount factor
    pub gamma: f32,
    /// Initial exploration rate
    pub epsilon_start: f64,
    /// Exploration rate floor
    pub epsilon_min: f64,
    /// Per-training-step exploration decay multiplier
    pub epsilon_decay: f64,
    /// Approximator learning rate
    pub learning_rate: f32,
    /// Number of episodes to run
    pub num_episodes: usize,
    /// Maximum experience exchanges per episode
    pub max_steps_per_episode: usize,
    /// Push a snapshot every this many episodes
    pub snapshot_cadence: usize,
    /// Endpoint the peer channel binds to
    pub bind_addr: String,
    /// Directory for persisted snapshots; cleared at run start
    pub checkpoint_dir: PathBuf,
    /// Optional receive deadline; `None` blocks indefinitely
    pub recv_timeout_secs: Option<u64>,
    /// Send snapshots to every connected peer instead of only the last seen
    pub broadcast_snapshots: bool,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            state_size: 4,
            action_size: 2,
            replay_capacity: 2000,
            batch_size: 32,
            gamma: 0.95,
            epsilon_start: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            learning_rate: 0.001,
            num_episodes: 1000,
            max_steps_per_episode: 500,
            snapshot_cadence: 3,
            bind_addr: "0.0.0.0:6080".to_string(),
            checkpoint_dir: PathBuf::from("./model_weights"),
            recv_timeout_secs: None,
            broadcast_snapshots: false,
        }
    }
}

impl LearnerConfig {
    /// Load a configuration from a JSON file, applying defaults for
    /// absent fields
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| LearnerError::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the run cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.state_size == 0 || self.action_size == 0 {
            return Err(LearnerError::InvalidConfig(
                "state_size and action_size must be nonzero".to_string(),
            ));
        }
        if self.batch_size == 0 || self.batch_size > self.replay_capacity {
            return Err(LearnerError::InvalidConfig(format!(
                "batch_size {} must be in [1, replay_capacity {}]",
                self.batch_size, self.replay_capacity
            )));
        }
        if self.snapshot_cadence == 0 {
            return Err(LearnerError::InvalidConfig(
                "snapshot_cadence must be nonzero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.epsilon_min)
            || self.epsilon_start < self.epsilon_min
            || self.epsilon_start > 1.0
        {
            return Err(LearnerError::InvalidConfig(
                "epsilon rates must satisfy 0 <= epsilon_min <= epsilon_start <= 1".to_string(),
            ));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(LearnerError::InvalidConfig(format!(
                "epsilon_decay {} must be in (0, 1]",
                self.epsilon_decay
            )));
        }
        Ok(())
    }
}

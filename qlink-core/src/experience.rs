//! Experience records and the versioned wire codec

use serde::{Deserialize, Serialize};

use crate::error::{LearnerError, Result};

/// Current wire schema version; bumped on any field change
pub const WIRE_VERSION: u8 = 1;

/// One observed transition, as stored in the replay buffer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceRecord {
    /// Observation before the action
    pub state: Vec<f32>,
    /// Discrete action index taken
    pub action: u32,
    /// Reward received
    pub reward: f32,
    /// Observation after the action
    pub next_state: Vec<f32>,
    /// Whether the episode ended on this transition
    pub done: bool,
}

/// Wire form of an experience record (actor -> learner)
///
/// Field names follow the exchange schema shared with actors; `version`
/// leads the payload so a schema bump is caught up front.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireExperience {
    version: u8,
    now_state: Vec<f32>,
    action: u32,
    reward: f32,
    next_state: Vec<f32>,
    done: bool,
}

/// Decoder/encoder for experience payloads, validating against the
/// configured state and action dimensions
#[derive(Debug, Clone)]
pub struct ExperienceCodec {
    state_size: usize,
    action_size: usize,
}

impl ExperienceCodec {
    /// Create a codec for the given state/action dimensions
    #[must_use]
    pub fn new(state_size: usize, action_size: usize) -> Self {
        Self {
            state_size,
            action_size,
        }
    }

    /// Decode one inbound payload into an experience record
    ///
    /// Fails with [`LearnerError::Decode`] on schema version mismatch,
    /// wrong vector dimensionality, or an out-of-range action index.
    pub fn decode(&self, raw: &[u8]) -> Result<ExperienceRecord> {
        let wire: WireExperience = bincode::deserialize(raw)
            .map_err(|e| LearnerError::Decode(format!("malformed experience payload: {e}")))?;

        if wire.version != WIRE_VERSION {
            return Err(LearnerError::Decode(format!(
                "wire version {} != expected {}",
                wire.version, WIRE_VERSION
            )));
        }
        if wire.now_state.len() != self.state_size || wire.next_state.len() != self.state_size {
            return Err(LearnerError::Decode(format!(
                "state dims {}/{} != configured {}",
                wire.now_state.len(),
                wire.next_state.len(),
                self.state_size
            )));
        }
        if wire.action as usize >= self.action_size {
            return Err(LearnerError::Decode(format!(
                "action {} out of range [0, {})",
                wire.action, self.action_size
            )));
        }

        Ok(ExperienceRecord {
            state: wire.now_state,
            action: wire.action,
            reward: wire.reward,
            next_state: wire.next_state,
            done: wire.done,
        })
    }

    /// Encode a record into its wire form (actor side and tests)
    pub fn encode(&self, record: &ExperienceRecord) -> Result<Vec<u8>> {
        let wire = WireExperience {
            version: WIRE_VERSION,
            now_state: record.state.clone(),
            action: record.action,
            reward: record.reward,
            next_state: record.next_state.clone(),
            done: record.done,
        };
        Ok(bincode::serialize(&wire)?)
    }
}

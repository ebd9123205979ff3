//! Error types for the qlink learner

use thiserror::Error;

/// Core error type for learner operations
#[derive(Error, Debug)]
pub enum LearnerError {
    /// Malformed inbound payload; fatal, the peer will resend the same shape
    #[error("decode error: {0}")]
    Decode(String),

    /// Buffer below batch size at sampling time; internal signal, not surfaced
    #[error("insufficient data: have {have}, need {need}")]
    InsufficientData {
        /// Records currently in the buffer
        have: usize,
        /// Records required for one batch
        need: usize,
    },

    /// Reply addressed to a stale or unknown peer identity
    #[error("routing error: no connected peer {peer}")]
    Routing {
        /// The identity the reply was addressed to
        peer: String,
    },

    /// Approximator training or serialization failure
    #[error("approximator error: {0}")]
    Approximator(String),

    /// State vector dimensionality mismatch
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Configured state size
        expected: usize,
        /// Observed vector length
        actual: usize,
    },

    /// No peer message arrived within the configured receive deadline
    #[error("receive timed out after {0} seconds")]
    ReceiveTimeout(u64),

    /// The inbound channel closed with no connected peers left to serve
    #[error("peer channel closed")]
    ChannelClosed,

    /// Invalid configuration value
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Wire or parameter serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// JSON serialization error (config, checkpoint metadata)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for learner operations
pub type Result<T> = std::result::Result<T, LearnerError>;

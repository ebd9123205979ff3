//! Peer identity

use std::fmt;
use uuid::Uuid;

/// Opaque routing token identifying one connected peer
///
/// Minted by the transport when a connection is accepted; a reply is
/// only deliverable with the exact token of the request it answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(Uuid);

impl PeerId {
    /// Mint a fresh identity for a newly accepted connection
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PeerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

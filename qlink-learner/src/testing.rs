//! In-memory peer channel for unit tests

use async_trait::async_trait;
use std::collections::VecDeque;

use qlink_core::{LearnerError, Result};
use qlink_transport::{PeerChannel, PeerId};

/// Scripted in-memory channel: receives pop a prepared queue, sends are
/// recorded, and routing honors a fixed connected-peer set
pub(crate) struct ScriptedChannel {
    pub inbound: VecDeque<(PeerId, Vec<u8>)>,
    pub sent: Vec<(PeerId, Vec<u8>)>,
    pub connected: Vec<PeerId>,
    pub receives: usize,
}

impl ScriptedChannel {
    pub fn new(connected: Vec<PeerId>) -> Self {
        Self {
            inbound: VecDeque::new(),
            sent: Vec::new(),
            connected,
            receives: 0,
        }
    }
}

#[async_trait]
impl PeerChannel for ScriptedChannel {
    async fn receive(&mut self) -> Result<(PeerId, Vec<u8>)> {
        self.receives += 1;
        self.inbound.pop_front().ok_or(LearnerError::ChannelClosed)
    }

    async fn send(&mut self, peer: PeerId, payload: Vec<u8>) -> Result<()> {
        if !self.connected.contains(&peer) {
            return Err(LearnerError::Routing {
                peer: peer.to_string(),
            });
        }
        self.sent.push((peer, payload));
        Ok(())
    }

    fn peers(&self) -> Vec<PeerId> {
        self.connected.clone()
    }
}

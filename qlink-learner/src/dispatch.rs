//! Snapshot dispatcher

use tracing::{debug, info, warn};

use qlink_core::{Approximator, LearnerError, Result};
use qlink_transport::{PeerChannel, PeerId};

use crate::checkpoint::CheckpointStore;

/// Pushes model snapshots to actors on an episode cadence
///
/// Evaluated once per completed episode, regardless of whether the
/// episode ended on a terminal record or ran out of steps. Snapshots
/// ride the reply side of the request/reply protocol, so the same
/// socket serves experience ingestion and model distribution.
#[derive(Debug)]
pub struct SnapshotDispatcher {
    cadence: usize,
    broadcast: bool,
}

impl SnapshotDispatcher {
    /// Dispatch every `cadence` episodes; `broadcast` sends to every
    /// connected peer instead of only the most recently seen one
    #[must_use]
    pub fn new(cadence: usize, broadcast: bool) -> Self {
        Self { cadence, broadcast }
    }

    /// Whether the given episode index is on the cadence
    #[must_use]
    pub fn due(&self, episode: usize) -> bool {
        episode % self.cadence == 0
    }

    /// Serialize the approximator and push it, persisting a copy
    ///
    /// A stale reply target is logged and dropped (the peer just misses
    /// this snapshot); serialization and persistence failures are fatal.
    pub async fn evaluate<A, C>(
        &self,
        episode: usize,
        last_peer: Option<PeerId>,
        approximator: &A,
        channel: &mut C,
        store: &CheckpointStore,
    ) -> Result<()>
    where
        A: Approximator,
        C: PeerChannel,
    {
        if !self.due(episode) {
            return Ok(());
        }

        let targets: Vec<PeerId> = if self.broadcast {
            channel.peers()
        } else {
            last_peer.into_iter().collect()
        };
        if targets.is_empty() {
            // Nothing to reply to yet this run
            debug!(episode, "snapshot due but no peer seen");
            return Ok(());
        }

        let params = approximator.serialize().await?;
        store.save(episode, &params).await?;

        for peer in targets {
            match channel.send(peer, params.clone()).await {
                Ok(()) => info!(episode, %peer, bytes = params.len(), "snapshot sent"),
                Err(LearnerError::Routing { peer }) => {
                    warn!(episode, %peer, "snapshot reply dropped, peer gone");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

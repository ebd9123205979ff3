//! Many-to-one request/reply peer channel
//!
//! One TCP listener multiplexes any number of actor connections onto a
//! single receiving coordinator. Each connection gets a reader task
//! that feeds inbound frames, tagged with the peer's identity, into one
//! queue, and a writer task draining that peer's outbound queue.
//! Delivery to the coordinator is therefore strictly serialized.

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use qlink_core::{LearnerError, Result};

use crate::frame::{read_frame, write_frame};
use crate::peer::PeerId;

/// Request/reply transport seen by the coordinator
#[async_trait]
pub trait PeerChannel: Send {
    /// Await exactly one inbound message, tagged with its originator
    async fn receive(&mut self) -> Result<(PeerId, Vec<u8>)>;

    /// Send a reply addressed to one peer
    ///
    /// Fails with [`LearnerError::Routing`] when the identity is
    /// unknown or its connection is gone; the payload is then lost.
    async fn send(&mut self, peer: PeerId, payload: Vec<u8>) -> Result<()>;

    /// Identities of all currently connected peers
    fn peers(&self) -> Vec<PeerId>;
}

type Registry = Arc<Mutex<HashMap<PeerId, mpsc::Sender<Vec<u8>>>>>;

/// TCP implementation of [`PeerChannel`]
///
/// Binds once for the process lifetime; peers connect and stream
/// length-prefixed frames.
pub struct TcpPeerChannel {
    inbound: mpsc::Receiver<(PeerId, Vec<u8>)>,
    registry: Registry,
    local_addr: SocketAddr,
}

impl TcpPeerChannel {
    /// Bind the endpoint and start accepting peers
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "peer channel listening");

        let (inbound_tx, inbound_rx) = mpsc::channel(256);
        let registry: Registry = Arc::new(Mutex::new(HashMap::new()));

        let accept_registry = Arc::clone(&registry);
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, remote)) => {
                        let peer = PeerId::new();
                        debug!(%peer, %remote, "peer connected");
                        spawn_peer_tasks(stream, peer, inbound_tx.clone(), &accept_registry);
                    }
                    Err(e) => {
                        warn!(error = %e, "accept failed");
                    }
                }
            }
        });

        Ok(Self {
            inbound: inbound_rx,
            registry,
            local_addr,
        })
    }

    /// The address the listener actually bound (useful with port 0)
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

fn spawn_peer_tasks(
    stream: TcpStream,
    peer: PeerId,
    inbound: mpsc::Sender<(PeerId, Vec<u8>)>,
    registry: &Registry,
) {
    let (mut reader, mut writer) = stream.into_split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<Vec<u8>>(64);

    registry
        .lock()
        .expect("peer registry poisoned")
        .insert(peer, outbound_tx);

    // Writer: drain this peer's reply queue onto the socket
    tokio::spawn(async move {
        while let Some(payload) = outbound_rx.recv().await {
            if let Err(e) = write_frame(&mut writer, &payload).await {
                warn!(%peer, error = %e, "reply write failed");
                break;
            }
        }
    });

    // Reader: forward inbound frames until EOF, then unregister
    let reader_registry = Arc::clone(registry);
    tokio::spawn(async move {
        loop {
            match read_frame(&mut reader).await {
                Ok(Some(payload)) => {
                    if inbound.send((peer, payload)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    debug!(%peer, "peer disconnected");
                    break;
                }
                Err(e) => {
                    warn!(%peer, error = %e, "peer read failed");
                    break;
                }
            }
        }
        reader_registry
            .lock()
            .expect("peer registry poisoned")
            .remove(&peer);
    });
}

#[async_trait]
impl PeerChannel for TcpPeerChannel {
    async fn receive(&mut self) -> Result<(PeerId, Vec<u8>)> {
        self.inbound.recv().await.ok_or(LearnerError::ChannelClosed)
    }

    async fn send(&mut self, peer: PeerId, payload: Vec<u8>) -> Result<()> {
        let sender = {
            let registry = self.registry.lock().expect("peer registry poisoned");
            registry.get(&peer).cloned()
        };
        let Some(sender) = sender else {
            return Err(LearnerError::Routing {
                peer: peer.to_string(),
            });
        };

        if sender.send(payload).await.is_err() {
            // Connection torn down between lookup and send
            self.registry
                .lock()
                .expect("peer registry poisoned")
                .remove(&peer);
            return Err(LearnerError::Routing {
                peer: peer.to_string(),
            });
        }
        Ok(())
    }

    fn peers(&self) -> Vec<PeerId> {
        self.registry
            .lock()
            .expect("peer registry poisoned")
            .keys()
            .copied()
            .collect()
    }
}
